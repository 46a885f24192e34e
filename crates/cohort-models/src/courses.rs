//! Course catalogue models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::InstructorId;
use crate::value_types::CourseCode;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Course {
    pub code: CourseCode,
    pub title: String,
    pub description: Option<String>,
    pub instructor_id: Option<InstructorId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A course joined with its instructor's contact details.
///
/// Loaded when building enrollment notifications.
#[derive(Debug, Clone, FromRow)]
pub struct CourseContact {
    pub code: CourseCode,
    pub title: String,
    pub instructor_id: Option<InstructorId>,
    pub instructor_name: Option<String>,
    pub instructor_email: Option<String>,
}

impl CourseContact {
    /// `CODE - Title`, as shown in notification bodies.
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.title)
    }
}
