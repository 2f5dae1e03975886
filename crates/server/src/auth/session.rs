//! Session bootstrap: resolve a bearer token to a user id, consulting the
//! local token cache before the external identity verifier.

use std::sync::Arc;
use tracing::Span;

use flashqudo_api::Token;

use super::identity::{IdentityVerifier, VerifyError};
use crate::storage::{Db, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("empty token")]
    EmptyToken,

    #[error("token expired")]
    TokenExpired,

    #[error("token invalid: {0}")]
    TokenInvalid(#[source] VerifyError),

    #[error("token storage failed: {0}")]
    Storage(#[from] StoreError),
}

#[derive(Clone)]
pub struct Authenticator {
    db: Db,
    verifier: Arc<dyn IdentityVerifier>,
    log: Span,
}

impl Authenticator {
    pub fn new(db: Db, verifier: Arc<dyn IdentityVerifier>, log: Span) -> Self {
        Self { db, verifier, log }
    }

    /// Resolve `token` to the user id it was issued for.
    ///
    /// A live cached token never reaches the verifier. An expired one is
    /// evicted first and then re-verified like an unseen token.
    pub async fn authenticate(&self, token: &str) -> Result<String, AuthError> {
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        let now = chrono::Utc::now().timestamp();

        let mut evicted = false;
        if let Some(cached) = self.db.get_token(token)? {
            if cached.is_live_at(now) {
                tracing::debug!(parent: &self.log, user_id = %cached.user_id, "token cache hit");
                return Ok(cached.user_id);
            }
            tracing::debug!(
                parent: &self.log,
                user_id = %cached.user_id,
                "evicting expired token"
            );
            if !self.db.evict_expired_token(token, now)? {
                // Refreshed by a concurrent verification since we read it.
                if let Some(fresh) = self.db.get_token(token)?.filter(|t| t.is_live_at(now)) {
                    return Ok(fresh.user_id);
                }
            }
            evicted = true;
        }

        let identity = match self.verifier.verify(token).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::info!(parent: &self.log, "token verification failed: {e}");
                return Err(if evicted {
                    AuthError::TokenExpired
                } else {
                    AuthError::TokenInvalid(e)
                });
            }
        };

        if identity.expires_at <= now {
            tracing::info!(
                parent: &self.log,
                user_id = %identity.user_id,
                "verifier returned an expired token"
            );
            return Err(AuthError::TokenExpired);
        }

        self.db.upsert_token(&Token {
            token: token.to_string(),
            user_id: identity.user_id.clone(),
            expires: identity.expires_at,
        })?;
        tracing::debug!(
            parent: &self.log,
            user_id = %identity.user_id,
            "token verified and cached"
        );
        Ok(identity.user_id)
    }
}
