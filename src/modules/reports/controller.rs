use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use cohort_core::AppError;
use cohort_models::{
    CourseCode, CourseSuccessReport, StudentAverageReport, StudentId, TopCourse, TopCoursesParams,
};

use crate::modules::reports::service::ReportService;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/reports/students/{id}/average",
    params(
        ("id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Mean of the student's grade averages", body = StudentAverageReport),
        (status = 404, description = "Student not found")
    ),
    tag = "Reports"
)]
#[instrument(skip(state))]
pub async fn get_student_average(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<Json<StudentAverageReport>, AppError> {
    let report = ReportService::student_average(&state.db, id).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/reports/courses/{code}/success-rate",
    params(
        ("code" = String, Path, description = "Course code")
    ),
    responses(
        (status = 200, description = "Share of grade records averaging at least 10", body = CourseSuccessReport),
        (status = 400, description = "Invalid course code"),
        (status = 404, description = "Course not found")
    ),
    tag = "Reports"
)]
#[instrument(skip(state))]
pub async fn get_course_success_rate(
    State(state): State<AppState>,
    Path(code): Path<CourseCode>,
) -> Result<Json<CourseSuccessReport>, AppError> {
    let report = ReportService::course_success_rate(&state.db, code).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/reports/courses/top",
    params(TopCoursesParams),
    responses(
        (status = 200, description = "Most enrolled courses first", body = Vec<TopCourse>),
        (status = 400, description = "Invalid limit")
    ),
    tag = "Reports"
)]
#[instrument(skip(state))]
pub async fn get_top_courses(
    State(state): State<AppState>,
    Query(params): Query<TopCoursesParams>,
) -> Result<Json<Vec<TopCourse>>, AppError> {
    let courses = ReportService::top_courses(&state.db, params.limit()).await?;
    Ok(Json(courses))
}
