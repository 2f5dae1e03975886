use axum::{
    extract::FromRef,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::identity::IdentityVerifier;
use crate::auth::permissions::PermissionEvaluator;
use crate::auth::session::Authenticator;
use crate::auth::Gate;
use crate::routes;
use crate::storage::Db;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub gate: Gate,
}

impl AppState {
    pub fn new(db: Db, verifier: Arc<dyn IdentityVerifier>) -> Self {
        let gate = Gate {
            authenticator: Authenticator::new(
                db.clone(),
                verifier,
                tracing::info_span!("authenticator"),
            ),
            permissions: PermissionEvaluator::new(db.clone(), tracing::info_span!("permissions")),
            db: db.clone(),
        };
        Self { db, gate }
    }
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Gate {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Health
        .route("/health", get(routes::health::health))
        // Users
        .route("/users", post(routes::users::create_user))
        .route(
            "/users/{username}",
            get(routes::users::get_user).patch(routes::users::update_user),
        )
        .route("/users/{username}/groups", get(routes::users::list_user_groups))
        // Groups
        .route("/groups", post(routes::groups::create_group))
        .route(
            "/groups/{group_id}",
            get(routes::groups::get_group)
                .patch(routes::groups::update_group)
                .delete(routes::groups::delete_group),
        )
        // Members
        .route(
            "/groups/{group_id}/users",
            get(routes::members::list_members).post(routes::members::add_member),
        )
        .route(
            "/groups/{group_id}/users/{user_id}",
            patch(routes::members::update_member).delete(routes::members::remove_member),
        )
        // Bundles
        .route(
            "/groups/{group_id}/bundles",
            get(routes::bundles::list_group_bundles).post(routes::bundles::create_bundle),
        )
        .route(
            "/bundles/{bundle_id}",
            get(routes::bundles::get_bundle)
                .patch(routes::bundles::update_bundle)
                .delete(routes::bundles::delete_bundle),
        )
        // Cards
        .route(
            "/bundles/{bundle_id}/cards",
            get(routes::cards::list_cards)
                .post(routes::cards::create_card)
                .delete(routes::cards::clear_cards),
        )
        .route(
            "/cards/{card_id}",
            patch(routes::cards::update_card).delete(routes::cards::delete_card),
        );

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_support::{in_an_hour, test_db, StubVerifier};

    struct Harness {
        app: Router,
        verifier: Arc<StubVerifier>,
    }

    impl Harness {
        fn new() -> Self {
            let verifier = StubVerifier::new();
            let identities = [("t-alice", "u-alice"), ("t-bob", "u-bob"), ("t-carol", "u-carol")];
            for (token, user_id) in identities {
                verifier.accept(token, user_id, in_an_hour());
            }
            let state = AppState::new(test_db(), verifier.clone());
            Self {
                app: router(state),
                verifier,
            }
        }

        async fn call(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut req = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                req = req.header("authorization", format!("Bearer {token}"));
            }
            let body = match body {
                Some(body) => {
                    req = req.header("content-type", "application/json");
                    Body::from(body.to_string())
                }
                None => Body::empty(),
            };
            let resp = self.app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
            let status = resp.status();
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        async fn register(&self, token: &str, username: &str) {
            let (status, _) = self
                .call(
                    Method::POST,
                    "/api/users",
                    Some(token),
                    Some(json!({"username": username, "imageUrl": "Default"})),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }
    }

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let h = Harness::new();
        let (status, body) = h.call(Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_and_invalid_tokens() {
        let h = Harness::new();
        let (status, body) = h
            .call(Method::POST, "/api/groups", None, Some(json!({"name": "x"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing token");

        let (status, _) = h
            .call(Method::POST, "/api/groups", Some("forged"), Some(json!({"name": "x"})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_group_bundle_card_flow() {
        let h = Harness::new();
        h.register("t-alice", "alice").await;
        h.register("t-bob", "bob").await;
        h.register("t-carol", "carol").await;

        let (status, group) = h
            .call(Method::POST, "/api/groups", Some("t-alice"), Some(json!({"name": "Spanish"})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let group_id = group["id"].as_str().unwrap().to_string();

        let (status, _) = h
            .call(
                Method::POST,
                &format!("/api/groups/{group_id}/users"),
                Some("t-alice"),
                Some(json!({"username": "bob", "isAdmin": false})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        // Bob is a member but not an admin.
        let (status, _) = h
            .call(
                Method::POST,
                &format!("/api/groups/{group_id}/bundles"),
                Some("t-bob"),
                Some(json!({"title": "Verbs"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, bundle) = h
            .call(
                Method::POST,
                &format!("/api/groups/{group_id}/bundles"),
                Some("t-alice"),
                Some(json!({"title": "Verbs", "description": "common"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let bundle_id = bundle["id"].as_str().unwrap().to_string();

        let card_body = json!({"question": "ser", "answer": "to be"});
        let (status, card) = h
            .call(
                Method::POST,
                &format!("/api/bundles/{bundle_id}/cards"),
                Some("t-alice"),
                Some(card_body.clone()),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let card_id = card["id"].as_str().unwrap().to_string();

        let (status, _) = h
            .call(
                Method::POST,
                &format!("/api/bundles/{bundle_id}/cards"),
                Some("t-alice"),
                Some(card_body),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, summary) = h
            .call(Method::GET, &format!("/api/bundles/{bundle_id}"), Some("t-bob"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["cardCount"], 1);

        let (status, _) = h
            .call(Method::GET, &format!("/api/bundles/{bundle_id}"), Some("t-carol"), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = h
            .call(
                Method::PATCH,
                &format!("/api/cards/{card_id}"),
                Some("t-bob"),
                Some(json!({"answer": "to exist"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, updated) = h
            .call(
                Method::PATCH,
                &format!("/api/cards/{card_id}"),
                Some("t-alice"),
                Some(json!({"answer": "to exist"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["answer"], "to exist");

        let (status, _) = h
            .call(
                Method::PATCH,
                &format!("/api/cards/{card_id}"),
                Some("t-alice"),
                Some(json!({})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, list) = h
            .call(
                Method::GET,
                &format!("/api/groups/{group_id}/bundles?_limit=abc&_page=1"),
                Some("t-bob"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["bundles"].as_array().unwrap().len(), 1);

        // Deleting the group is refused while Bob is still in it.
        let (status, body) = h
            .call(Method::DELETE, &format!("/api/groups/{group_id}"), Some("t-alice"), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "cannot delete group with members");

        let (status, _) = h
            .call(
                Method::DELETE,
                &format!("/api/groups/{group_id}/users/u-bob"),
                Some("t-alice"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = h
            .call(Method::GET, &format!("/api/bundles/{bundle_id}/cards"), Some("t-bob"), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = h
            .call(Method::DELETE, &format!("/api/groups/{group_id}"), Some("t-alice"), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        // One verification per distinct token, cache hits afterwards.
        assert_eq!(h.verifier.calls(), 3);
    }

    #[tokio::test]
    async fn test_admin_cannot_demote_another_admin() {
        let h = Harness::new();
        h.register("t-alice", "alice").await;
        h.register("t-bob", "bob").await;

        let (_, group) = h
            .call(Method::POST, "/api/groups", Some("t-alice"), Some(json!({"name": "French"})))
            .await;
        let group_id = group["id"].as_str().unwrap().to_string();
        h.call(
            Method::POST,
            &format!("/api/groups/{group_id}/users"),
            Some("t-alice"),
            Some(json!({"username": "bob", "isAdmin": true})),
        )
        .await;

        let (status, _) = h
            .call(
                Method::PATCH,
                &format!("/api/groups/{group_id}/users/u-alice"),
                Some("t-bob"),
                Some(json!({"isAdmin": false})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, member) = h
            .call(
                Method::PATCH,
                &format!("/api/groups/{group_id}/users/u-bob"),
                Some("t-bob"),
                Some(json!({"isAdmin": false})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(member["isAdmin"], false);
    }

    #[tokio::test]
    async fn test_self_service_user_routes() {
        let h = Harness::new();
        h.register("t-alice", "alice").await;
        h.register("t-bob", "bob").await;

        let (status, user) = h.call(Method::GET, "/api/users/bob", Some("t-alice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["id"], "u-bob");

        let (status, _) = h
            .call(
                Method::PATCH,
                "/api/users/bob",
                Some("t-alice"),
                Some(json!({"imageUrl": "x.png"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = h
            .call(Method::GET, "/api/users/nobody/groups", Some("t-alice"), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, user) = h
            .call(
                Method::PATCH,
                "/api/users/alice",
                Some("t-alice"),
                Some(json!({"imageUrl": "x.png"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["imageUrl"], "x.png");

        let (status, _) = h
            .call(
                Method::POST,
                "/api/users",
                Some("t-bob"),
                Some(json!({"username": "alice", "imageUrl": "Default"})),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
