use chrono::NaiveTime;
use serde::Serialize;
use sqlx::FromRow;

use cohort_models::{CourseCode, GroupId, InstructorId, SessionId};

/// A same-day session with the instructor of its course.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionSlot {
    pub id: SessionId,
    pub course_code: CourseCode,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub group_id: Option<GroupId>,
    pub instructor_id: Option<InstructorId>,
}
