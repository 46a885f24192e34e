//! Aggregate statistics over enrollments and grade records.

use cohort_core::serde::deserialize_optional_parsed;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::ids::StudentId;
use crate::value_types::CourseCode;

/// A grade record passes when its average reaches this mark.
pub const PASSING_AVERAGE: f64 = 10.0;

pub const DEFAULT_TOP_COURSES: i64 = 5;

/// Percentage of `passing` among `graded`, `0.0` when nothing is graded.
pub fn success_rate(passing: i64, graded: i64) -> f64 {
    if graded <= 0 {
        return 0.0;
    }
    passing as f64 * 100.0 / graded as f64
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StudentAverageReport {
    pub student_id: StudentId,
    /// Mean of the per-record averages; `0.0` without records.
    pub average: f64,
    pub graded_courses: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CourseSuccessReport {
    pub course_code: CourseCode,
    /// Percentage of grade records with an average of at least 10.
    pub success_rate: f64,
    pub passing: i64,
    pub graded: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct TopCourse {
    pub code: CourseCode,
    pub title: String,
    pub enrollments: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TopCoursesParams {
    /// Number of courses to return (default 5, at least 1).
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    #[param(value_type = Option<i64>)]
    pub limit: Option<i64>,
}

impl TopCoursesParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_TOP_COURSES).max(1)
    }
}
