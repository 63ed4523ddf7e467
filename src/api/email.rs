//! Email delivery seam for magic-link issuance.
//!
//! Issuance calls [`EmailSender::send`] synchronously: a delivery failure is
//! reported back to the requester as a retryable error instead of being
//! swallowed. A failed send can leave a written-but-undelivered token row;
//! that is acceptable because the next request overwrites it.
//!
//! The default sender for local dev is [`LogEmailSender`], which logs the
//! message and returns `Ok(())`. Real transports (SMTP, provider API)
//! implement the trait at deployment time.

use anyhow::Result;
use tracing::info;

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Email delivery abstraction used by the magic-link issuer.
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error so issuance reports a failure.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "email send stub"
        );
        Ok(())
    }
}

/// Build the login email around the magic link.
#[must_use]
pub fn login_email(from: &str, to: &str, name: &str, login_url: &str) -> EmailMessage {
    let body = format!(
        "Hello {name},\n\n\
         Use the link below to sign in. It is valid for 10 minutes and can be\n\
         used only once. Open it in the same browser you requested it from so\n\
         your original tab picks up the login automatically.\n\n\
         {login_url}\n\n\
         If you did not request this link you can safely ignore this email.\n"
    );
    EmailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Your dashboard login link".to_string(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_email_embeds_link_and_name() {
        let message = login_email(
            "login@sezamo.dev",
            "demo@example.com",
            "Demo",
            "https://dashboard.example.com/magic_login?token=abc",
        );
        assert_eq!(message.from, "login@sezamo.dev");
        assert_eq!(message.to, "demo@example.com");
        assert!(message.body.contains("Hello Demo"));
        assert!(
            message
                .body
                .contains("https://dashboard.example.com/magic_login?token=abc")
        );
    }

    #[test]
    fn log_sender_always_succeeds() {
        let message = login_email("a@b.co", "c@d.co", "N", "https://x/magic_login?token=t");
        assert!(LogEmailSender.send(&message).is_ok());
    }
}
