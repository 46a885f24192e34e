//! Grade record models.
//!
//! Grade records are created and deleted together with their enrollment;
//! only the scores are editable.

use chrono::{DateTime, Utc};
use cohort_core::serde::deserialize_optional_parsed;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{GradeRecordId, StudentId};
use crate::value_types::CourseCode;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct GradeRecord {
    pub id: GradeRecordId,
    pub student_id: StudentId,
    pub course_code: CourseCode,
    pub exam_score: f64,
    pub continuous_score: f64,
    pub oral_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GradeRecord {
    /// Unweighted mean of the three component scores.
    pub fn average(&self) -> f64 {
        (self.exam_score + self.continuous_score + self.oral_score) / 3.0
    }
}

/// A grade record as returned by the API, with its derived average.
#[derive(Debug, Serialize, ToSchema)]
pub struct GradeView {
    #[serde(flatten)]
    pub record: GradeRecord,
    pub average: f64,
}

impl From<GradeRecord> for GradeView {
    fn from(record: GradeRecord) -> Self {
        let average = record.average();
        Self { record, average }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct GradeFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    #[param(value_type = Option<String>)]
    pub student_id: Option<StudentId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    #[param(value_type = Option<String>)]
    pub course_code: Option<CourseCode>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGradeDto {
    #[validate(range(min = 0.0, message = "exam_score must not be negative"))]
    pub exam_score: f64,
    #[validate(range(min = 0.0, message = "continuous_score must not be negative"))]
    pub continuous_score: f64,
    #[validate(range(min = 0.0, message = "oral_score must not be negative"))]
    pub oral_score: f64,
}
