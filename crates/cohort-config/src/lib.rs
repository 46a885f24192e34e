//! # Cohort Config
//!
//! Configuration types for the Cohort API, loaded from environment variables:
//!
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`email`]: SMTP configuration for enrollment notifications
//! - [`enrollment`]: Enrollment policy switches
//! - [`server`]: Listen address
//!
//! # Example
//!
//! ```ignore
//! use cohort_config::{CorsConfig, EmailConfig, EnrollmentConfig, ServerConfig};
//!
//! let cors_config = CorsConfig::from_env();
//! let email_config = EmailConfig::from_env();
//! let enrollment_config = EnrollmentConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod email;
pub mod enrollment;
pub mod server;

pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use enrollment::EnrollmentConfig;
pub use server::ServerConfig;

/// Parses the usual truthy spellings of a boolean env var.
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
