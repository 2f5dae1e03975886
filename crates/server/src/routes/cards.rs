use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use flashqudo_api::service::{self, Paging};
use flashqudo_api::{Card, CardPatch, CreateCardRequest, ListCardsResponse, OkResponse, PagingQuery};

use crate::auth::gate::{BundleAdmin, BundleViewer, CardAdmin};
use crate::auth::Authorized;
use crate::error::ApiErr;
use crate::storage::Db;

/// GET /api/bundles/{bundle_id}/cards
pub async fn list_cards(
    State(db): State<Db>,
    auth: Authorized<BundleViewer>,
    Query(query): Query<PagingQuery>,
) -> Result<Json<ListCardsResponse>, ApiErr> {
    let cards = db.list_bundle_cards(&auth.resource_id, Paging::from_query(&query))?;
    Ok(Json(ListCardsResponse { cards }))
}

/// POST /api/bundles/{bundle_id}/cards — questions are unique per bundle.
pub async fn create_card(
    State(db): State<Db>,
    auth: Authorized<BundleAdmin>,
    Json(req): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<Card>), ApiErr> {
    let new_card = service::prepare_card(req)?;
    Ok((StatusCode::CREATED, Json(db.insert_card(&auth.resource_id, &new_card)?)))
}

/// DELETE /api/bundles/{bundle_id}/cards — remove every card, keep the bundle.
pub async fn clear_cards(
    State(db): State<Db>,
    auth: Authorized<BundleAdmin>,
) -> Result<Json<OkResponse>, ApiErr> {
    let removed = db.clear_bundle_cards(&auth.resource_id)?;
    tracing::info!(bundle_id = %auth.resource_id, removed, "bundle cards cleared");
    Ok(Json(OkResponse { ok: true }))
}

/// PATCH /api/cards/{card_id}
pub async fn update_card(
    State(db): State<Db>,
    auth: Authorized<CardAdmin>,
    Json(patch): Json<CardPatch>,
) -> Result<Json<Card>, ApiErr> {
    let patch = patch.validate()?;
    Ok(Json(db.update_card(&auth.resource_id, &patch)?))
}

/// DELETE /api/cards/{card_id}
pub async fn delete_card(
    State(db): State<Db>,
    auth: Authorized<CardAdmin>,
) -> Result<Json<OkResponse>, ApiErr> {
    let group_id = db.owning_group_of_card(&auth.resource_id)?;
    db.delete_card(&auth.resource_id)?;
    tracing::debug!(card_id = %auth.resource_id, group_id = ?group_id, "card deleted");
    Ok(Json(OkResponse { ok: true }))
}
