use std::sync::Arc;

use sqlx::PgPool;

use cohort_config::{CorsConfig, EmailConfig, EnrollmentConfig};
use cohort_db::init_db_pool;

use crate::notifications::{EmailNotifier, Notifier};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub enrollment_config: EnrollmentConfig,
    pub notifier: Arc<dyn Notifier>,
}

pub async fn init_app_state() -> AppState {
    let email_config = EmailConfig::from_env();

    AppState {
        db: init_db_pool().await,
        notifier: Arc::new(EmailNotifier::new(email_config.clone())),
        email_config,
        cors_config: CorsConfig::from_env(),
        enrollment_config: EnrollmentConfig::from_env(),
    }
}
