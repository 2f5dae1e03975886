use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use flashqudo_api::service::{self, Paging};
use flashqudo_api::{
    Bundle, BundlePatch, CreateBundleRequest, GroupBundleResponse, ListBundlesResponse,
    OkResponse, PagingQuery,
};

use crate::auth::gate::{BundleAdmin, BundleViewer, GroupAdmin, GroupMember};
use crate::auth::Authorized;
use crate::error::ApiErr;
use crate::storage::Db;

/// GET /api/groups/{group_id}/bundles — bundles with card counts.
pub async fn list_group_bundles(
    State(db): State<Db>,
    auth: Authorized<GroupMember>,
    Query(query): Query<PagingQuery>,
) -> Result<Json<ListBundlesResponse>, ApiErr> {
    let bundles = db.list_group_bundles(&auth.resource_id, Paging::from_query(&query))?;
    Ok(Json(ListBundlesResponse { bundles }))
}

/// POST /api/groups/{group_id}/bundles
pub async fn create_bundle(
    State(db): State<Db>,
    auth: Authorized<GroupAdmin>,
    Json(req): Json<CreateBundleRequest>,
) -> Result<(StatusCode, Json<Bundle>), ApiErr> {
    let new_bundle = service::prepare_bundle(req)?;
    let bundle = db.insert_bundle(&auth.resource_id, &new_bundle)?;
    tracing::info!(bundle_id = %bundle.id, group_id = %bundle.group_id, "bundle created");
    Ok((StatusCode::CREATED, Json(bundle)))
}

/// GET /api/bundles/{bundle_id}
pub async fn get_bundle(
    State(db): State<Db>,
    auth: Authorized<BundleViewer>,
) -> Result<Json<GroupBundleResponse>, ApiErr> {
    Ok(Json(db.bundle_summary(&auth.resource_id)?))
}

/// PATCH /api/bundles/{bundle_id}
pub async fn update_bundle(
    State(db): State<Db>,
    auth: Authorized<BundleAdmin>,
    Json(patch): Json<BundlePatch>,
) -> Result<Json<Bundle>, ApiErr> {
    let patch = patch.validate()?;
    Ok(Json(db.update_bundle(&auth.resource_id, &patch)?))
}

/// DELETE /api/bundles/{bundle_id} — the bundle and all of its cards.
pub async fn delete_bundle(
    State(db): State<Db>,
    auth: Authorized<BundleAdmin>,
) -> Result<Json<OkResponse>, ApiErr> {
    let group_id = db.owning_group_of_bundle(&auth.resource_id)?;
    db.delete_bundle(&auth.resource_id)?;
    tracing::info!(bundle_id = %auth.resource_id, group_id = ?group_id, "bundle deleted");
    Ok(Json(OkResponse { ok: true }))
}
