use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use flashqudo_api::service::{self, Paging};
use flashqudo_api::{
    AddMemberRequest, ListMembersResponse, Member, MemberPatch, OkResponse, PagingQuery,
};

use crate::auth::gate::{GroupAdmin, GroupMember};
use crate::auth::Authorized;
use crate::error::ApiErr;
use crate::storage::Db;

/// Admins may act on themselves and on non-admins, never on another admin.
fn ensure_not_other_admin(caller_id: &str, target: &Member, action: &str) -> Result<(), ApiErr> {
    if target.is_admin && target.user_id != caller_id {
        return Err(ApiErr::forbidden(format!("cannot {action} another admin")));
    }
    Ok(())
}

/// GET /api/groups/{group_id}/users
pub async fn list_members(
    State(db): State<Db>,
    auth: Authorized<GroupMember>,
    Query(query): Query<PagingQuery>,
) -> Result<Json<ListMembersResponse>, ApiErr> {
    let members = db.list_members(&auth.resource_id, Paging::from_query(&query))?;
    Ok(Json(ListMembersResponse { members }))
}

/// POST /api/groups/{group_id}/users — add an existing user by username.
pub async fn add_member(
    State(db): State<Db>,
    auth: Authorized<GroupAdmin>,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<Member>), ApiErr> {
    let (username, is_admin) = service::prepare_member(req)?;
    let user_id = db.user_id_by_username(&username)?;
    let member = db.add_member(&auth.resource_id, &user_id, is_admin)?;
    tracing::info!(group_id = %auth.resource_id, user_id = %user_id, is_admin, "member added");
    Ok((StatusCode::CREATED, Json(member)))
}

/// PATCH /api/groups/{group_id}/users/{user_id}
pub async fn update_member(
    State(db): State<Db>,
    auth: Authorized<GroupAdmin>,
    Path((group_id, user_id)): Path<(String, String)>,
    Json(patch): Json<MemberPatch>,
) -> Result<Json<Member>, ApiErr> {
    let patch = patch.validate()?;
    let target = db.get_member(&group_id, &user_id)?;
    ensure_not_other_admin(auth.user_id(), &target, "change")?;
    Ok(Json(db.update_member(&group_id, &user_id, &patch)?))
}

/// DELETE /api/groups/{group_id}/users/{user_id}
pub async fn remove_member(
    State(db): State<Db>,
    auth: Authorized<GroupAdmin>,
    Path((group_id, user_id)): Path<(String, String)>,
) -> Result<Json<OkResponse>, ApiErr> {
    let target = db.get_member(&group_id, &user_id)?;
    ensure_not_other_admin(auth.user_id(), &target, "remove")?;
    db.remove_member(&group_id, &user_id)?;
    tracing::info!(group_id = %group_id, user_id = %user_id, "member removed");
    Ok(Json(OkResponse { ok: true }))
}
