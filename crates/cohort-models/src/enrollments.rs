//! Enrollment models, filters and the reconciliation summary.

use chrono::{DateTime, Utc};
use cohort_core::serde::deserialize_optional_parsed;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{EnrollmentId, StudentId};
use crate::value_types::CourseCode;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub course_code: CourseCode,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct EnrollmentFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    #[param(value_type = Option<String>)]
    pub student_id: Option<StudentId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    #[param(value_type = Option<String>)]
    pub course_code: Option<CourseCode>,
}

/// Direct single-pair enrollment.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEnrollmentDto {
    pub student_id: StudentId,
    pub course_code: CourseCode,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReconcileRequestDto {
    #[validate(length(min = 1, message = "student_ids must not be empty"))]
    pub student_ids: Vec<StudentId>,
}

/// What a reconciliation run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReconcileSummary {
    /// Students whose enrollments were reconciled.
    pub students: usize,
    /// Enrollments created.
    pub granted: usize,
    /// Enrollments removed.
    pub revoked: usize,
}

impl ReconcileSummary {
    pub fn is_noop(&self) -> bool {
        self.granted == 0 && self.revoked == 0
    }

    pub fn absorb(&mut self, other: ReconcileSummary) {
        self.students += other.students;
        self.granted += other.granted;
        self.revoked += other.revoked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_params_blank_values() {
        let params: EnrollmentFilterParams =
            serde_json::from_str(r#"{"student_id": "", "course_code": " "}"#).unwrap();
        assert!(params.student_id.is_none());
        assert!(params.course_code.is_none());
    }

    #[test]
    fn test_filter_params_parse_values() {
        let params: EnrollmentFilterParams = serde_json::from_str(
            r#"{"student_id": "00000000-0000-0000-0000-000000000001", "course_code": "C1"}"#,
        )
        .unwrap();
        assert_eq!(params.student_id, Some(StudentId::from_u128(1)));
        assert_eq!(params.course_code.unwrap().as_str(), "C1");
    }

    #[test]
    fn test_reconcile_request_requires_students() {
        let dto = ReconcileRequestDto {
            student_ids: vec![],
        };
        assert!(dto.validate().is_err());

        let dto = ReconcileRequestDto {
            student_ids: vec![StudentId::new()],
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_summary_absorb() {
        let mut total = ReconcileSummary::default();
        assert!(total.is_noop());

        total.absorb(ReconcileSummary {
            students: 1,
            granted: 2,
            revoked: 0,
        });
        total.absorb(ReconcileSummary {
            students: 1,
            granted: 0,
            revoked: 1,
        });

        assert_eq!(
            total,
            ReconcileSummary {
                students: 2,
                granted: 2,
                revoked: 1,
            }
        );
        assert!(!total.is_noop());
    }
}
