use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use cohort_models::{
    ConflictCheckResponse, ConflictReason, CourseSuccessReport, CreateEnrollmentDto,
    CreateGroupDto, Enrollment, GradeRecord, GradeView, Group, GroupDeletedResponse, GroupDetails,
    GroupMutationResponse, ReconcileRequestDto, ReconcileSummary, ScheduledSession,
    SessionCheckDto, SessionDto, StudentAverageReport, TopCourse, UpdateGradeDto, UpdateGroupDto,
};

/// Body of every non-2xx response except a scheduling conflict.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::groups::controller::create_group,
        crate::modules::groups::controller::get_groups,
        crate::modules::groups::controller::get_group,
        crate::modules::groups::controller::update_group,
        crate::modules::groups::controller::delete_group,
        crate::modules::enrollments::controller::get_enrollments,
        crate::modules::enrollments::controller::create_enrollment,
        crate::modules::enrollments::controller::delete_enrollment,
        crate::modules::enrollments::controller::reconcile_enrollments,
        crate::modules::grades::controller::get_grades,
        crate::modules::grades::controller::get_grade,
        crate::modules::grades::controller::update_grade,
        crate::modules::sessions::controller::get_sessions,
        crate::modules::sessions::controller::get_session,
        crate::modules::sessions::controller::create_session,
        crate::modules::sessions::controller::update_session,
        crate::modules::sessions::controller::delete_session,
        crate::modules::sessions::controller::check_session,
        crate::modules::sessions::controller::get_student_schedule,
        crate::modules::reports::controller::get_student_average,
        crate::modules::reports::controller::get_course_success_rate,
        crate::modules::reports::controller::get_top_courses,
    ),
    components(
        schemas(
            ErrorResponse,
            Group,
            GroupDetails,
            CreateGroupDto,
            UpdateGroupDto,
            GroupMutationResponse,
            GroupDeletedResponse,
            Enrollment,
            CreateEnrollmentDto,
            ReconcileRequestDto,
            ReconcileSummary,
            GradeRecord,
            GradeView,
            UpdateGradeDto,
            ScheduledSession,
            SessionDto,
            SessionCheckDto,
            ConflictReason,
            ConflictCheckResponse,
            StudentAverageReport,
            CourseSuccessReport,
            TopCourse,
        )
    ),
    tags(
        (name = "Groups", description = "Student groups and the courses they grant"),
        (name = "Enrollments", description = "Derived enrollments and reconciliation"),
        (name = "Grades", description = "Grade records owned by reconciliation"),
        (name = "Sessions", description = "Session scheduling with conflict detection"),
        (name = "Reports", description = "Grade and enrollment statistics")
    ),
    info(
        title = "Cohort API",
        version = "0.1.0",
        description = "Enrollment reconciliation and session scheduling for a school backend.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/groups",
            "/api/groups/{id}",
            "/api/enrollments",
            "/api/enrollments/{id}",
            "/api/enrollments/reconcile",
            "/api/grades",
            "/api/grades/{id}",
            "/api/sessions",
            "/api/sessions/{id}",
            "/api/sessions/check",
            "/api/students/{id}/schedule",
            "/api/reports/students/{id}/average",
            "/api/reports/courses/{code}/success-rate",
            "/api/reports/courses/top",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }
}
