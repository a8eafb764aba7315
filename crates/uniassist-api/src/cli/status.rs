//! System status dashboard command.

use anyhow::Result;
use console::style;

use uniassist_core::repository::user::UserRepository;

use crate::state::AppState;

fn check_mark(ok: bool) -> String {
    if ok {
        format!("{}", style("✓").green())
    } else {
        format!("{}", style("✗").red())
    }
}

/// Display system status dashboard.
///
/// Shows account counts, which external services are configured, the
/// credit plans on offer, and where data lives.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let users = state.users.count().await?;
    let database = state.db_pool.ping().await;
    let message = state.message_service.health();
    let payments = state.config.payments.clone();
    let plans = state.credit_service.plans();

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "database": database,
            "users": users,
            "services": {
                "llm": message.llm,
                "model": message.model,
                "transcription": message.transcription,
                "smtp": state.smtp_enabled,
                "knowledge_base": state.config.guest.knowledge_base_url,
            },
            "plans": plans,
            "currency": payments.currency,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("  {} UniAssist v{}", style("⚡").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Accounts ──").dim());
    println!("  Users: {}", style(users).bold());
    println!();

    println!("  {}", style("── Services ──").dim());
    println!(
        "  {} Groq ({})",
        check_mark(message.llm),
        style(&message.model).dim()
    );
    println!("  {} AssemblyAI transcription", check_mark(message.transcription));
    println!("  {} SMTP mail", check_mark(state.smtp_enabled));
    println!(
        "  Knowledge base: {}",
        style(&state.config.guest.knowledge_base_url).dim()
    );
    println!();

    println!("  {}", style("── Plans ──").dim());
    for plan in plans {
        println!(
            "  {:<10} {:>6} {}  {} credits",
            plan.name,
            plan.price,
            payments.currency.to_uppercase(),
            plan.credits
        );
    }
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!(
        "  {} Database (SQLite, WAL mode)",
        check_mark(database)
    );
    println!();

    Ok(())
}
