use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use cohort_core::AppError;
use cohort_models::{GradeFilterParams, GradeRecordId, GradeView, UpdateGradeDto};

use crate::modules::grades::service::GradeService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/grades",
    params(GradeFilterParams),
    responses(
        (status = 200, description = "Grade records matching the filters", body = Vec<GradeView>),
        (status = 400, description = "Invalid filter value")
    ),
    tag = "Grades"
)]
#[instrument(skip(state))]
pub async fn get_grades(
    State(state): State<AppState>,
    Query(filters): Query<GradeFilterParams>,
) -> Result<Json<Vec<GradeView>>, AppError> {
    let grades = GradeService::list_grades(&state.db, filters).await?;
    Ok(Json(grades))
}

#[utoipa::path(
    get,
    path = "/api/grades/{id}",
    params(
        ("id" = Uuid, Path, description = "Grade record ID")
    ),
    responses(
        (status = 200, description = "Grade record", body = GradeView),
        (status = 404, description = "Grade record not found")
    ),
    tag = "Grades"
)]
#[instrument(skip(state))]
pub async fn get_grade(
    State(state): State<AppState>,
    Path(id): Path<GradeRecordId>,
) -> Result<Json<GradeView>, AppError> {
    let grade = GradeService::get_grade(&state.db, id).await?;
    Ok(Json(grade))
}

#[utoipa::path(
    put,
    path = "/api/grades/{id}",
    params(
        ("id" = Uuid, Path, description = "Grade record ID")
    ),
    request_body = UpdateGradeDto,
    responses(
        (status = 200, description = "Scores updated", body = GradeView),
        (status = 404, description = "Grade record not found"),
        (status = 422, description = "A score is negative")
    ),
    tag = "Grades"
)]
#[instrument(skip(state))]
pub async fn update_grade(
    State(state): State<AppState>,
    Path(id): Path<GradeRecordId>,
    ValidatedJson(dto): ValidatedJson<UpdateGradeDto>,
) -> Result<Json<GradeView>, AppError> {
    let grade = GradeService::update_grade(&state.db, id, dto).await?;
    Ok(Json(grade))
}
