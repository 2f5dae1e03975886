use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use flashqudo_api::service;
use flashqudo_api::{CreateGroupRequest, Group, GroupPatch, OkResponse};

use crate::auth::gate::GroupAdmin;
use crate::auth::{Authorized, Caller};
use crate::error::ApiErr;
use crate::storage::Db;

/// POST /api/groups — create a group. The caller becomes its first admin.
pub async fn create_group(
    State(db): State<Db>,
    caller: Caller,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiErr> {
    let name = service::prepare_group(req)?;
    let group = db.create_group(&name, &caller.user_id)?;
    tracing::info!(group_id = %group.id, user_id = %caller.user_id, "group created");
    Ok((StatusCode::CREATED, Json(group)))
}

/// GET /api/groups/{group_id}
pub async fn get_group(
    State(db): State<Db>,
    _caller: Caller,
    Path(group_id): Path<String>,
) -> Result<Json<Group>, ApiErr> {
    Ok(Json(db.get_group(&group_id)?))
}

/// PATCH /api/groups/{group_id}
pub async fn update_group(
    State(db): State<Db>,
    auth: Authorized<GroupAdmin>,
    Json(patch): Json<GroupPatch>,
) -> Result<Json<Group>, ApiErr> {
    let patch = patch.validate()?;
    Ok(Json(db.update_group(&auth.resource_id, &patch)?))
}

/// DELETE /api/groups/{group_id} — refused while anyone besides the caller
/// is still a member.
pub async fn delete_group(
    State(db): State<Db>,
    auth: Authorized<GroupAdmin>,
) -> Result<Json<OkResponse>, ApiErr> {
    db.delete_group(&auth.resource_id)?;
    tracing::info!(group_id = %auth.resource_id, user_id = %auth.user_id(), "group deleted");
    Ok(Json(OkResponse { ok: true }))
}
