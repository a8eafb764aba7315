//! HTML bodies for verification and password-reset codes.

use super::OutgoingMail;

fn code_block(code: &str) -> String {
    format!(
        r#"<div style="background: #f5f5f5; padding: 20px; text-align: center; margin: 20px 0; border-radius: 5px;">
  <h1 style="margin: 0; color: #2c3e50; letter-spacing: 5px; font-size: 28px;">{code}</h1>
</div>"#
    )
}

fn wrap(heading: &str, body: &str, ttl_minutes: i64) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="color: #333;">{heading}</h2>
  {body}
  <p>This code will expire in {ttl_minutes} minutes.</p>
  <p style="font-size: 12px; color: #7f8c8d;">If you didn't request this code, please ignore this email or contact support.</p>
</div>"#
    )
}

/// Escape the handful of characters that matter inside HTML text.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn verification(to: &str, name: &str, code: &str, ttl_minutes: i64) -> OutgoingMail {
    let body = format!(
        "<p>Hello {},</p>\n  <p>Your OTP verification code is:</p>\n  {}",
        escape(name),
        code_block(code)
    );
    OutgoingMail {
        to: to.to_string(),
        subject: "Your OTP Verification Code".to_string(),
        html: wrap("Welcome to UniAssist!", &body, ttl_minutes),
    }
}

pub fn resend(to: &str, name: &str, code: &str, ttl_minutes: i64) -> OutgoingMail {
    let body = format!(
        "<p>Hello {},</p>\n  <p>Your new OTP verification code is:</p>\n  {}",
        escape(name),
        code_block(code)
    );
    OutgoingMail {
        to: to.to_string(),
        subject: "Your New OTP Verification Code".to_string(),
        html: wrap("New Verification Code", &body, ttl_minutes),
    }
}

pub fn password_reset(to: &str, name: &str, code: &str, ttl_minutes: i64) -> OutgoingMail {
    let body = format!(
        "<p>Hello {},</p>\n  <p>Use this code to reset your password:</p>\n  {}",
        escape(name),
        code_block(code)
    );
    OutgoingMail {
        to: to.to_string(),
        subject: "Password Reset OTP".to_string(),
        html: wrap("Password Reset", &body, ttl_minutes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_contains_code_and_expiry() {
        let mail = verification("a@b.com", "Ayesha", "482913", 5);
        assert_eq!(mail.to, "a@b.com");
        assert!(mail.html.contains("482913"));
        assert!(mail.html.contains("Hello Ayesha"));
        assert!(mail.html.contains("expire in 5 minutes"));
    }

    #[test]
    fn test_name_is_escaped() {
        let mail = password_reset("a@b.com", "<script>", "111111", 5);
        assert!(!mail.html.contains("<script>"));
        assert!(mail.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_subjects_differ() {
        let a = verification("a@b.com", "n", "1", 5);
        let b = resend("a@b.com", "n", "1", 5);
        let c = password_reset("a@b.com", "n", "1", 5);
        assert_ne!(a.subject, b.subject);
        assert_ne!(b.subject, c.subject);
    }
}
