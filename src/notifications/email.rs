use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, warn};

use cohort_config::EmailConfig;

use super::{Notification, Notifier};
use crate::metrics::track_notification_failed;

/// Sends notifications over SMTP from a blocking task.
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, notification: &Notification) -> anyhow::Result<Message> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid from email: {}", e))?;
        let to: Mailbox = if notification.to_name.is_empty() {
            notification.to_email.parse()
        } else {
            format!("{} <{}>", notification.to_name, notification.to_email).parse()
        }
        .map_err(|e| anyhow::anyhow!("Invalid to email: {}", e))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&notification.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| anyhow::anyhow!("Failed to build email: {}", e))
    }

    fn transport(config: &EmailConfig) -> anyhow::Result<SmtpTransport> {
        if config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .build());
        }

        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
        Ok(SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| anyhow::anyhow!("Failed to create SMTP relay: {}", e))?
            .port(config.smtp_port)
            .credentials(creds)
            .build())
    }
}

impl Notifier for EmailNotifier {
    fn notify(&self, notification: Notification) {
        let kind = notification.kind.as_str();

        if !self.config.can_send() || notification.to_email.trim().is_empty() {
            debug!(
                kind,
                course = %notification.course_code,
                "SMTP disabled or no recipient, skipping notification"
            );
            return;
        }

        let message = match self.build_message(&notification) {
            Ok(message) => message,
            Err(e) => {
                warn!(kind, error = %e, "Failed to build notification");
                track_notification_failed(kind);
                return;
            }
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(kind, "No async runtime, dropping notification");
            track_notification_failed(kind);
            return;
        };

        let config = self.config.clone();
        runtime.spawn_blocking(move || {
            let sent = Self::transport(&config)
                .and_then(|mailer| mailer.send(&message).map_err(anyhow::Error::from));
            if let Err(e) = sent {
                warn!(kind, to = %notification.to_email, error = %e, "Failed to send notification");
                track_notification_failed(kind);
            }
        });
    }
}
