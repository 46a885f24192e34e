use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use cohort_core::AppError;
use cohort_models::{
    ConflictCheckResponse, ScheduledSession, SessionCheckDto, SessionDto, SessionFilterParams,
    SessionId, StudentId,
};

use crate::modules::sessions::service::{SessionCommit, SessionService};
use crate::state::AppState;
use crate::validator::ValidatedJson;

fn commit_response(commit: SessionCommit, saved_status: StatusCode) -> Response {
    match commit {
        SessionCommit::Saved(session) => (saved_status, Json(session)).into_response(),
        SessionCommit::Rejected(body) => (StatusCode::CONFLICT, Json(body)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/sessions",
    params(SessionFilterParams),
    responses(
        (status = 200, description = "Sessions matching the filters", body = Vec<ScheduledSession>),
        (status = 400, description = "Invalid filter value")
    ),
    tag = "Sessions"
)]
#[instrument(skip(state))]
pub async fn get_sessions(
    State(state): State<AppState>,
    Query(filters): Query<SessionFilterParams>,
) -> Result<Json<Vec<ScheduledSession>>, AppError> {
    let sessions = SessionService::list_sessions(&state.db, filters).await?;
    Ok(Json(sessions))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session", body = ScheduledSession),
        (status = 404, description = "Session not found")
    ),
    tag = "Sessions"
)]
#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<ScheduledSession>, AppError> {
    let session = SessionService::get_session(&state.db, id).await?;
    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = SessionDto,
    responses(
        (status = 201, description = "Session scheduled", body = ScheduledSession),
        (status = 400, description = "Start time is not before end time"),
        (status = 404, description = "Course or group not found"),
        (status = 409, description = "Instructor or student conflict", body = ConflictCheckResponse),
        (status = 422, description = "Validation error")
    ),
    tag = "Sessions"
)]
#[instrument(skip(state))]
pub async fn create_session(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SessionDto>,
) -> Result<Response, AppError> {
    let commit = SessionService::create_session(&state.db, dto).await?;
    Ok(commit_response(commit, StatusCode::CREATED))
}

#[utoipa::path(
    put,
    path = "/api/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    request_body = SessionDto,
    responses(
        (status = 200, description = "Session updated", body = ScheduledSession),
        (status = 400, description = "Start time is not before end time"),
        (status = 404, description = "Session, course or group not found"),
        (status = 409, description = "Instructor or student conflict", body = ConflictCheckResponse),
        (status = 422, description = "Validation error")
    ),
    tag = "Sessions"
)]
#[instrument(skip(state))]
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    ValidatedJson(dto): ValidatedJson<SessionDto>,
) -> Result<Response, AppError> {
    let commit = SessionService::update_session(&state.db, id, dto).await?;
    Ok(commit_response(commit, StatusCode::OK))
}

#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found")
    ),
    tag = "Sessions"
)]
#[instrument(skip(state))]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<StatusCode, AppError> {
    SessionService::delete_session(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/sessions/check",
    request_body = SessionCheckDto,
    responses(
        (status = 200, description = "Conflict check result", body = ConflictCheckResponse),
        (status = 400, description = "Start time is not before end time"),
        (status = 404, description = "Course or group not found")
    ),
    tag = "Sessions"
)]
#[instrument(skip(state))]
pub async fn check_session(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SessionCheckDto>,
) -> Result<Json<ConflictCheckResponse>, AppError> {
    let response = SessionService::check_session(&state.db, dto).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}/schedule",
    params(
        ("id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Sessions the student attends, by date and start time", body = Vec<ScheduledSession>),
        (status = 404, description = "Student not found")
    ),
    tag = "Sessions"
)]
#[instrument(skip(state))]
pub async fn get_student_schedule(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<Json<Vec<ScheduledSession>>, AppError> {
    let sessions = SessionService::student_schedule(&state.db, id).await?;
    Ok(Json(sessions))
}
