//! Request-level authorization.
//!
//! Extractors run in a fixed order and stop at the first failure: read the
//! token, authenticate it, read the resource id from the path, then check
//! the endpoint's policy. Handlers receive a typed [`Caller`] or
//! [`Authorized`] and never see an unauthenticated request.

use axum::{
    extract::{FromRef, FromRequestParts, Path},
    http::{request::Parts, HeaderMap},
};
use std::collections::HashMap;
use std::marker::PhantomData;

use super::permissions::PermissionEvaluator;
use super::session::{AuthError, Authenticator};
use crate::storage::{Db, StoreError};

/// Why a request was turned away before reaching its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    BadRequest(&'static str),
    Forbidden,
    NotFound(&'static str),
}

impl From<AuthError> for Denial {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::EmptyToken => Self::BadRequest("missing token"),
            AuthError::Storage(ref inner) => {
                tracing::error!("authentication storage failure: {inner}");
                Self::Forbidden
            }
            AuthError::TokenExpired | AuthError::TokenInvalid(_) => {
                tracing::info!("authentication failed: {e}");
                Self::Forbidden
            }
        }
    }
}

/// Everything the gate needs per request.
#[derive(Clone)]
pub struct Gate {
    pub authenticator: Authenticator,
    pub permissions: PermissionEvaluator,
    pub db: Db,
}

/// Read the bearer token: `Authorization: Bearer <t>`, else `X-Auth-Token`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    bearer.or_else(|| headers.get("x-auth-token").and_then(|v| v.to_str().ok()))
}

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
    Gate: FromRef<S>,
{
    type Rejection = Denial;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Gate::from_ref(state);
        let token = bearer_token(&parts.headers).ok_or(Denial::BadRequest("missing token"))?;
        let user_id = gate.authenticator.authenticate(token.trim()).await?;
        Ok(Caller { user_id })
    }
}

/// An endpoint's sensitivity class.
pub trait Policy: Send + Sync + 'static {
    /// Path parameter holding the resource id.
    const PARAM: &'static str;

    fn allows(permissions: &PermissionEvaluator, user_id: &str, resource_id: &str) -> bool;

    fn on_deny(_db: &Db, _resource_id: &str) -> Denial {
        Denial::Forbidden
    }
}

pub struct GroupMember;
pub struct GroupAdmin;
pub struct BundleViewer;
pub struct BundleAdmin;
pub struct CardAdmin;
/// The path names the caller's own username.
pub struct SelfUser;

impl Policy for GroupMember {
    const PARAM: &'static str = "group_id";

    fn allows(permissions: &PermissionEvaluator, user_id: &str, group_id: &str) -> bool {
        permissions.is_group_member(group_id, user_id)
    }
}

impl Policy for GroupAdmin {
    const PARAM: &'static str = "group_id";

    fn allows(permissions: &PermissionEvaluator, user_id: &str, group_id: &str) -> bool {
        permissions.is_group_admin(group_id, user_id)
    }
}

impl Policy for BundleViewer {
    const PARAM: &'static str = "bundle_id";

    fn allows(permissions: &PermissionEvaluator, user_id: &str, bundle_id: &str) -> bool {
        permissions.can_see_bundle(bundle_id, user_id)
    }
}

impl Policy for BundleAdmin {
    const PARAM: &'static str = "bundle_id";

    fn allows(permissions: &PermissionEvaluator, user_id: &str, bundle_id: &str) -> bool {
        permissions.can_edit_bundle(bundle_id, user_id)
    }
}

impl Policy for CardAdmin {
    const PARAM: &'static str = "card_id";

    fn allows(permissions: &PermissionEvaluator, user_id: &str, card_id: &str) -> bool {
        permissions.can_edit_card(card_id, user_id)
    }
}

impl Policy for SelfUser {
    const PARAM: &'static str = "username";

    fn allows(permissions: &PermissionEvaluator, user_id: &str, username: &str) -> bool {
        permissions.is_same_user(user_id, username)
    }

    fn on_deny(db: &Db, username: &str) -> Denial {
        match db.user_id_by_username(username) {
            Err(StoreError::NotFound(_)) => Denial::NotFound("user"),
            _ => Denial::Forbidden,
        }
    }
}

/// A caller that passed policy `P` for the resource named in the path.
pub struct Authorized<P> {
    pub caller: Caller,
    pub resource_id: String,
    _policy: PhantomData<fn() -> P>,
}

impl<P> Authorized<P> {
    pub fn user_id(&self) -> &str {
        &self.caller.user_id
    }
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    Gate: FromRef<S>,
    P: Policy,
{
    type Rejection = Denial;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| Denial::BadRequest("missing resource id"))?;
        let resource_id = params
            .get(P::PARAM)
            .filter(|id| !id.is_empty())
            .cloned()
            .ok_or(Denial::BadRequest("missing resource id"))?;

        let gate = Gate::from_ref(state);
        if !P::allows(&gate.permissions, &caller.user_id, &resource_id) {
            return Err(P::on_deny(&gate.db, &resource_id));
        }

        Ok(Authorized {
            caller,
            resource_id,
            _policy: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
    use std::sync::Arc;
    use tower::ServiceExt;
    use tracing::Span;

    use crate::test_support::{
        in_an_hour, seed_group, seed_member, seed_user, test_db, StubVerifier,
    };

    fn gate(db: &Db, verifier: Arc<StubVerifier>) -> Gate {
        Gate {
            authenticator: Authenticator::new(db.clone(), verifier, Span::none()),
            permissions: PermissionEvaluator::new(db.clone(), Span::none()),
            db: db.clone(),
        }
    }

    async fn admin_only(auth: Authorized<GroupAdmin>) -> String {
        auth.resource_id
    }

    async fn self_only(auth: Authorized<SelfUser>) -> String {
        auth.caller.user_id
    }

    async fn status(app: Router, uri: &str, token: Option<(&str, &str)>) -> StatusCode {
        let mut req = Request::builder().uri(uri);
        if let Some((name, value)) = token {
            req = req.header(name, value);
        }
        app.oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_bearer_token_prefers_authorization() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert("x-auth-token", "legacy".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("legacy"));
        headers.insert("authorization", "Bearer modern".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("modern"));
    }

    #[test]
    fn test_auth_errors_map_to_denials() {
        assert_eq!(Denial::from(AuthError::EmptyToken), Denial::BadRequest("missing token"));
        assert_eq!(Denial::from(AuthError::TokenExpired), Denial::Forbidden);
    }

    #[tokio::test]
    async fn test_gate_short_circuits_in_order() {
        let db = test_db();
        seed_user(&db, "u1", "alice");
        seed_user(&db, "u2", "bob");
        let group = seed_group(&db, "u1", "Spanish");
        seed_member(&db, &group.id, "u2", false);

        let verifier = StubVerifier::new();
        verifier.accept("alice-token", "u1", in_an_hour());
        verifier.accept("bob-token", "u2", in_an_hour());
        let app = Router::new()
            .route("/groups/{group_id}", get(admin_only))
            .with_state(gate(&db, verifier.clone()));
        let uri = format!("/groups/{}", group.id);

        assert_eq!(status(app.clone(), &uri, None).await, StatusCode::BAD_REQUEST);
        assert_eq!(
            status(app.clone(), &uri, Some(("authorization", "Bearer nope"))).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(app.clone(), &uri, Some(("authorization", "Bearer bob-token"))).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(app.clone(), &uri, Some(("x-auth-token", "alice-token"))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_self_gate_distinguishes_missing_user() {
        let db = test_db();
        seed_user(&db, "u1", "alice");
        seed_user(&db, "u2", "bob");
        let verifier = StubVerifier::new();
        verifier.accept("alice-token", "u1", in_an_hour());
        let app = Router::new()
            .route("/users/{username}", get(self_only))
            .with_state(gate(&db, verifier));
        let auth = Some(("authorization", "Bearer alice-token"));

        assert_eq!(status(app.clone(), "/users/alice", auth).await, StatusCode::OK);
        assert_eq!(status(app.clone(), "/users/bob", auth).await, StatusCode::FORBIDDEN);
        assert_eq!(status(app.clone(), "/users/ghost", auth).await, StatusCode::NOT_FOUND);
    }
}
