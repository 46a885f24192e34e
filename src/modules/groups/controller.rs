use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use cohort_core::AppError;
use cohort_models::{
    CreateGroupDto, GroupDeletedResponse, GroupDetails, GroupId, GroupMutationResponse,
    UpdateGroupDto,
};

use crate::modules::groups::service::GroupService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupDto,
    responses(
        (status = 201, description = "Group created and its roster reconciled", body = GroupMutationResponse),
        (status = 400, description = "Malformed request body"),
        (status = 404, description = "Referenced term, specialty, course or student not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Groups"
)]
#[instrument(skip(state))]
pub async fn create_group(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateGroupDto>,
) -> Result<(StatusCode, Json<GroupMutationResponse>), AppError> {
    let response = GroupService::create_group(&state.db, state.notifier.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/groups",
    responses(
        (status = 200, description = "All groups with rosters and courses", body = Vec<GroupDetails>)
    ),
    tag = "Groups"
)]
#[instrument(skip(state))]
pub async fn get_groups(State(state): State<AppState>) -> Result<Json<Vec<GroupDetails>>, AppError> {
    let groups = GroupService::list_groups(&state.db).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    get,
    path = "/api/groups/{id}",
    params(
        ("id" = Uuid, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Group details", body = GroupDetails),
        (status = 404, description = "Group not found")
    ),
    tag = "Groups"
)]
#[instrument(skip(state))]
pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<GroupId>,
) -> Result<Json<GroupDetails>, AppError> {
    let group = GroupService::get_group(&state.db, id).await?;
    Ok(Json(group))
}

#[utoipa::path(
    put,
    path = "/api/groups/{id}",
    params(
        ("id" = Uuid, Path, description = "Group ID")
    ),
    request_body = UpdateGroupDto,
    responses(
        (status = 200, description = "Group updated and affected students reconciled", body = GroupMutationResponse),
        (status = 404, description = "Group or a referenced entity not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Groups"
)]
#[instrument(skip(state))]
pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<GroupId>,
    ValidatedJson(dto): ValidatedJson<UpdateGroupDto>,
) -> Result<Json<GroupMutationResponse>, AppError> {
    let response =
        GroupService::update_group(&state.db, state.notifier.as_ref(), id, dto).await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{id}",
    params(
        ("id" = Uuid, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Group deleted and its former roster reconciled", body = GroupDeletedResponse),
        (status = 404, description = "Group not found")
    ),
    tag = "Groups"
)]
#[instrument(skip(state))]
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<GroupId>,
) -> Result<Json<GroupDeletedResponse>, AppError> {
    let response = GroupService::delete_group(&state.db, state.notifier.as_ref(), id).await?;
    Ok(Json(response))
}
