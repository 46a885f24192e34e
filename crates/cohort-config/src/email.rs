use std::env;

use crate::parse_flag;

/// SMTP settings used by the enrollment notifier.
#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: env::var("SMTP_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1025),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: env::var("FROM_EMAIL")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| "noreply@cohort.local".to_string()),
            from_name: env::var("FROM_NAME").unwrap_or_else(|_| "Cohort".to_string()),
        }
    }

    /// Mail can only go out when SMTP is enabled and a sender address is set.
    pub fn can_send(&self) -> bool {
        self.enabled && !self.from_email.is_empty()
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@cohort.local".to_string(),
            from_name: "Cohort".to_string(),
        }
    }
}
