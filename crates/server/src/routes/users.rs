use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use flashqudo_api::service::{self, Paging};
use flashqudo_api::{CreateUserRequest, ListUserGroupsResponse, PagingQuery, User, UserPatch};

use crate::auth::gate::SelfUser;
use crate::auth::{Authorized, Caller};
use crate::error::ApiErr;
use crate::storage::Db;

/// GET /api/users/{username} — any authenticated caller may look up a profile.
pub async fn get_user(
    State(db): State<Db>,
    _caller: Caller,
    Path(username): Path<String>,
) -> Result<Json<User>, ApiErr> {
    Ok(Json(db.get_user_by_username(&username)?))
}

/// POST /api/users — create the caller's own profile. The id is the
/// verified identity's user id.
pub async fn create_user(
    State(db): State<Db>,
    caller: Caller,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiErr> {
    let new_user = service::prepare_user(req)?;
    let user = db.insert_user(&caller.user_id, &new_user)?;
    tracing::info!(user_id = %user.id, username = %user.username, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /api/users/{username}
pub async fn update_user(
    State(db): State<Db>,
    auth: Authorized<SelfUser>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>, ApiErr> {
    let patch = patch.validate()?;
    Ok(Json(db.update_user(auth.user_id(), &patch)?))
}

/// GET /api/users/{username}/groups — the caller's own groups.
pub async fn list_user_groups(
    State(db): State<Db>,
    auth: Authorized<SelfUser>,
    Query(query): Query<PagingQuery>,
) -> Result<Json<ListUserGroupsResponse>, ApiErr> {
    let groups = db.list_user_groups(auth.user_id(), Paging::from_query(&query))?;
    Ok(Json(ListUserGroupsResponse { groups }))
}
