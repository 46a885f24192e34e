//! Scheduled session models and conflict-check DTOs.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use cohort_core::serde::deserialize_optional_parsed;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{GroupId, SessionId};
use crate::time_format;
use crate::value_types::CourseCode;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ScheduledSession {
    pub id: SessionId,
    pub course_code: CourseCode,
    pub session_date: NaiveDate,
    #[serde(with = "time_format")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: NaiveTime,
    #[serde(with = "time_format")]
    #[schema(value_type = String, example = "10:30")]
    pub end_time: NaiveTime,
    pub room: String,
    pub group_id: Option<GroupId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for creating or replacing a session.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SessionDto {
    pub course_code: CourseCode,
    pub session_date: NaiveDate,
    #[serde(with = "time_format")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: NaiveTime,
    #[serde(with = "time_format")]
    #[schema(value_type = String, example = "10:30")]
    pub end_time: NaiveTime,
    #[validate(length(min = 1, max = 50))]
    pub room: String,
    pub group_id: Option<GroupId>,
}

/// Dry-run conflict check. `exclude_session_id` skips a session being edited.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SessionCheckDto {
    #[serde(flatten)]
    #[validate(nested)]
    pub session: SessionDto,
    pub exclude_session_id: Option<SessionId>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SessionFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    #[param(value_type = Option<String>, example = "2024-05-01")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    #[param(value_type = Option<String>)]
    pub course_code: Option<CourseCode>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    #[param(value_type = Option<String>)]
    pub group_id: Option<GroupId>,
}

/// Why a candidate session was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    /// The instructor already teaches an overlapping session.
    InstructorConflict,
    /// A student would have to attend two overlapping sessions.
    StudentConflict,
}

impl ConflictReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InstructorConflict => "instructor_conflict",
            Self::StudentConflict => "student_conflict",
        }
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{"ok": true}` or `{"ok": false, "reason": ..., "conflicting_session_id": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConflictCheckResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ConflictReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicting_session_id: Option<SessionId>,
}

impl ConflictCheckResponse {
    pub fn clear() -> Self {
        Self {
            ok: true,
            reason: None,
            conflicting_session_id: None,
        }
    }

    pub fn rejected(reason: ConflictReason, session_id: SessionId) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
            conflicting_session_id: Some(session_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_dto_parses_hh_mm() {
        let dto: SessionDto = serde_json::from_str(
            r#"{
                "course_code": "C1",
                "session_date": "2024-05-01",
                "start_time": "09:00",
                "end_time": "10:30",
                "room": "A101"
            }"#,
        )
        .unwrap();
        assert_eq!(dto.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(dto.end_time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert!(dto.group_id.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_session_dto_room_required() {
        let dto: SessionDto = serde_json::from_str(
            r#"{
                "course_code": "C1",
                "session_date": "2024-05-01",
                "start_time": "09:00",
                "end_time": "10:00",
                "room": ""
            }"#,
        )
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_check_dto_flattens_session() {
        let dto: SessionCheckDto = serde_json::from_str(
            r#"{
                "course_code": "C2",
                "session_date": "2024-05-01",
                "start_time": "09:30",
                "end_time": "10:30",
                "room": "B2",
                "exclude_session_id": "00000000-0000-0000-0000-000000000007"
            }"#,
        )
        .unwrap();
        assert_eq!(dto.session.course_code.as_str(), "C2");
        assert_eq!(dto.exclude_session_id, Some(SessionId::from_u128(7)));
    }

    #[test]
    fn test_filter_params_parse_date() {
        let params: SessionFilterParams =
            serde_json::from_str(r#"{"date": "2024-05-01", "group_id": ""}"#).unwrap();
        assert_eq!(params.date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(params.group_id.is_none());
    }

    #[test]
    fn test_conflict_response_shapes() {
        let ok = serde_json::to_value(ConflictCheckResponse::clear()).unwrap();
        assert_eq!(ok, serde_json::json!({"ok": true}));

        let rejected = serde_json::to_value(ConflictCheckResponse::rejected(
            ConflictReason::StudentConflict,
            SessionId::from_u128(1),
        ))
        .unwrap();
        assert_eq!(rejected["ok"], false);
        assert_eq!(rejected["reason"], "student_conflict");
        assert_eq!(
            rejected["conflicting_session_id"],
            "00000000-0000-0000-0000-000000000001"
        );
    }
}
