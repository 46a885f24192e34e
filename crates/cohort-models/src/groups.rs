//! Group models and DTOs.
//!
//! A group grants every one of its students access to every one of its
//! courses. Rosters and course sets are replaced wholesale on update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::enrollments::ReconcileSummary;
use crate::ids::{GroupId, SpecialtyId, StudentId, TermId};
use crate::value_types::CourseCode;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub term_id: Option<TermId>,
    pub specialty_id: Option<SpecialtyId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A group together with its roster and course set.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupDetails {
    #[serde(flatten)]
    pub group: Group,
    pub student_ids: Vec<StudentId>,
    pub course_codes: Vec<CourseCode>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGroupDto {
    #[validate(length(min = 2, max = 50))]
    pub name: String,
    pub term_id: Option<TermId>,
    pub specialty_id: Option<SpecialtyId>,
    #[serde(default)]
    pub course_codes: Vec<CourseCode>,
    #[serde(default)]
    pub student_ids: Vec<StudentId>,
}

/// Replaces a group's attributes and course set.
///
/// `student_ids` left out keeps the current roster; present (even empty)
/// replaces it.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGroupDto {
    #[validate(length(min = 2, max = 50))]
    pub name: String,
    pub term_id: Option<TermId>,
    pub specialty_id: Option<SpecialtyId>,
    #[serde(default)]
    pub course_codes: Vec<CourseCode>,
    #[serde(default)]
    pub student_ids: Option<Vec<StudentId>>,
}

/// Response for group create/update: the saved group and what the
/// reconciliation it triggered changed.
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupMutationResponse {
    pub group: GroupDetails,
    pub reconciliation: ReconcileSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupDeletedResponse {
    pub id: GroupId,
    pub reconciliation: ReconcileSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_group_dto_defaults_collections() {
        let dto: CreateGroupDto = serde_json::from_str(r#"{"name": "G1"}"#).unwrap();
        assert!(dto.course_codes.is_empty());
        assert!(dto.student_ids.is_empty());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_group_dto_name_length() {
        let dto: CreateGroupDto = serde_json::from_str(r#"{"name": "G"}"#).unwrap();
        assert!(dto.validate().is_err());

        let long = format!(r#"{{"name": "{}"}}"#, "x".repeat(51));
        let dto: CreateGroupDto = serde_json::from_str(&long).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_group_dto_rejects_bad_course_code() {
        let result: Result<CreateGroupDto, _> =
            serde_json::from_str(r#"{"name": "G1", "course_codes": ["WAY TOO LONG CODE"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_group_dto_distinguishes_missing_roster() {
        let keep: UpdateGroupDto =
            serde_json::from_str(r#"{"name": "G1", "course_codes": ["C1"]}"#).unwrap();
        assert!(keep.student_ids.is_none());

        let clear: UpdateGroupDto =
            serde_json::from_str(r#"{"name": "G1", "student_ids": []}"#).unwrap();
        assert_eq!(clear.student_ids, Some(vec![]));
    }

    #[test]
    fn test_group_details_flattens_group() {
        let now = Utc::now();
        let details = GroupDetails {
            group: Group {
                id: GroupId::from_u128(1),
                name: "G1".to_string(),
                term_id: None,
                specialty_id: None,
                created_at: now,
                updated_at: now,
            },
            student_ids: vec![],
            course_codes: vec![CourseCode::new("C1").unwrap()],
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["name"], "G1");
        assert_eq!(json["course_codes"][0], "C1");
    }
}
