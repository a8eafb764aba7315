//! Admin user commands: `users` and `grant-credits`.

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use uniassist_core::repository::user::UserRepository;
use uniassist_types::user::{UserProfile, normalize_email};

use crate::state::AppState;

/// List every account, newest first.
pub async fn list_users(state: &AppState, json: bool) -> Result<()> {
    let users = state.users.list().await?;

    if json {
        let profiles: Vec<UserProfile> = users.iter().map(UserProfile::from).collect();
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    if users.is_empty() {
        println!();
        println!("  No users yet.");
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Email").fg(Color::White),
        Cell::new("Credits").fg(Color::White),
        Cell::new("Verified").fg(Color::White),
        Cell::new("Joined").fg(Color::White),
    ]);

    for user in &users {
        let verified = if user.is_verified {
            Cell::new("● yes").fg(Color::Green)
        } else {
            Cell::new("○ no").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(&user.name).fg(Color::Cyan),
            Cell::new(&user.email),
            Cell::new(user.credits),
            verified,
            Cell::new(user.created_at.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    println!("  {} user(s)", style(users.len()).bold());
    Ok(())
}

/// Add `amount` credits to the account registered under `email`.
pub async fn grant_credits(state: &AppState, email: &str, amount: i64, json: bool) -> Result<()> {
    if amount <= 0 {
        bail!("amount must be positive, got {amount}");
    }
    let email = normalize_email(email);
    let Some(user) = state.users.get_by_email(&email).await? else {
        bail!("no user registered with email '{email}'");
    };

    let balance = state.users.credit(&user.id, amount).await?;
    tracing::info!(user_id = %user.id, amount, balance, "credits granted");

    if json {
        let out = serde_json::json!({
            "email": email,
            "granted": amount,
            "credits": balance,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "  {} Granted {} credits to {} (balance: {})",
            style("✓").green(),
            style(amount).bold(),
            style(&email).cyan(),
            style(balance).bold()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use chrono::Utc;
    use uniassist_types::user::{User, UserId};

    #[tokio::test]
    async fn test_grant_credits_adds_to_balance() {
        let (state, _tmp) = test_state().await;
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: "Sara".to_string(),
            email: "sara@maju.edu.pk".to_string(),
            password_hash: "x".to_string(),
            credits: 3,
            is_verified: true,
            verification: None,
            password_reset: None,
            created_at: now,
            updated_at: now,
        };
        state.users.create(&user).await.unwrap();

        grant_credits(&state, " SARA@maju.edu.pk ", 20, true).await.unwrap();
        let reloaded = state.users.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.credits, 23);
    }

    #[tokio::test]
    async fn test_grant_credits_rejects_bad_input() {
        let (state, _tmp) = test_state().await;
        assert!(grant_credits(&state, "nobody@maju.edu.pk", 5, true).await.is_err());
        assert!(grant_credits(&state, "nobody@maju.edu.pk", 0, true).await.is_err());
    }
}
