use std::env;

use crate::parse_flag;

/// Policy switches for enrollment management.
///
/// Enrollments are normally derived from group membership. Direct
/// enroll/unenroll requests are only accepted when
/// `MANUAL_ENROLLMENTS_ENABLED` is set.
#[derive(Clone, Debug, Default)]
pub struct EnrollmentConfig {
    pub manual_enrollments_enabled: bool,
}

impl EnrollmentConfig {
    pub fn from_env() -> Self {
        Self {
            manual_enrollments_enabled: env::var("MANUAL_ENROLLMENTS_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}
