use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use cohort_core::AppError;
use cohort_models::{
    CreateEnrollmentDto, Enrollment, EnrollmentFilterParams, EnrollmentId, ReconcileRequestDto,
    ReconcileSummary,
};

use crate::modules::enrollments::service::EnrollmentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

fn ensure_manual_enrollments(state: &AppState) -> Result<(), AppError> {
    if state.enrollment_config.manual_enrollments_enabled {
        Ok(())
    } else {
        Err(AppError::forbidden(anyhow!(
            "Enrollments are managed via groups"
        )))
    }
}

#[utoipa::path(
    get,
    path = "/api/enrollments",
    params(EnrollmentFilterParams),
    responses(
        (status = 200, description = "Enrollments matching the filters", body = Vec<Enrollment>),
        (status = 400, description = "Invalid filter value")
    ),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn get_enrollments(
    State(state): State<AppState>,
    Query(filters): Query<EnrollmentFilterParams>,
) -> Result<Json<Vec<Enrollment>>, AppError> {
    let enrollments = EnrollmentService::list_enrollments(&state.db, filters).await?;
    Ok(Json(enrollments))
}

#[utoipa::path(
    post,
    path = "/api/enrollments",
    request_body = CreateEnrollmentDto,
    responses(
        (status = 201, description = "Student enrolled", body = Enrollment),
        (status = 403, description = "Direct enrollment is disabled"),
        (status = 404, description = "Student or course not found"),
        (status = 409, description = "Student is already enrolled in this course")
    ),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn create_enrollment(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateEnrollmentDto>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    ensure_manual_enrollments(&state)?;

    let enrollment = EnrollmentService::grant_course(
        &state.db,
        state.notifier.as_ref(),
        dto.student_id,
        &dto.course_code,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

#[utoipa::path(
    delete,
    path = "/api/enrollments/{id}",
    params(
        ("id" = Uuid, Path, description = "Enrollment ID")
    ),
    responses(
        (status = 204, description = "Student unenrolled"),
        (status = 403, description = "Direct enrollment is disabled"),
        (status = 404, description = "Enrollment not found")
    ),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn delete_enrollment(
    State(state): State<AppState>,
    Path(id): Path<EnrollmentId>,
) -> Result<StatusCode, AppError> {
    ensure_manual_enrollments(&state)?;

    EnrollmentService::revoke_enrollment(&state.db, state.notifier.as_ref(), id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/enrollments/reconcile",
    request_body = ReconcileRequestDto,
    responses(
        (status = 200, description = "Reconciliation summary", body = ReconcileSummary),
        (status = 404, description = "A student was not found"),
        (status = 422, description = "No students given")
    ),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn reconcile_enrollments(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ReconcileRequestDto>,
) -> Result<Json<ReconcileSummary>, AppError> {
    let summary =
        EnrollmentService::reconcile(&state.db, state.notifier.as_ref(), &dto.student_ids).await?;
    Ok(Json(summary))
}
