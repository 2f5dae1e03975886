//! External identity verification.
//!
//! The verifier turns a raw bearer token into a user id and an expiry. The
//! production implementation POSTs the token to a configured HTTP endpoint
//! and picks both values out of the JSON reply through a field map.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::config::IdentityConfig;

const VERIFY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: String,
    /// Unix seconds.
    pub expires_at: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("token rejected: {0}")]
    Rejected(String),

    #[error("identity provider unreachable: {0}")]
    Transport(String),

    #[error("malformed identity response: {0}")]
    Malformed(String),

    #[error("identity verification is not configured")]
    NotConfigured,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, raw_token: &str) -> Result<VerifiedIdentity, VerifyError>;
}

/// Verifier used when no endpoint is configured: every unseen token fails.
pub struct DisabledVerifier;

#[async_trait]
impl IdentityVerifier for DisabledVerifier {
    async fn verify(&self, _raw_token: &str) -> Result<VerifiedIdentity, VerifyError> {
        Err(VerifyError::NotConfigured)
    }
}

pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    verify_url: String,
    user_id_field: String,
    expiry_field: String,
}

impl HttpIdentityVerifier {
    pub fn new(config: &IdentityConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(VERIFY_TIMEOUT_SECS))
            .danger_accept_invalid_certs(config.tls_skip_verify)
            .build()?;
        Ok(Self {
            client,
            verify_url: config.verify_url.clone(),
            user_id_field: config.user_id_field.clone(),
            expiry_field: config.expiry_field.clone(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, raw_token: &str) -> Result<VerifiedIdentity, VerifyError> {
        let response = self
            .client
            .post(&self.verify_url)
            .header("Accept", "application/json")
            .json(&serde_json::json!({ "token": raw_token }))
            .send()
            .await
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(VerifyError::Rejected(format!("status {}", status.as_u16())));
        }
        if !status.is_success() {
            return Err(VerifyError::Transport(format!("status {}", status.as_u16())));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| VerifyError::Malformed(e.to_string()))?;
        parse_identity(&body, &self.user_id_field, &self.expiry_field)
    }
}

/// Resolve `field` inside `body`. Dotted names walk nested objects.
fn lookup<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    if field.contains('.') {
        body.pointer(&format!("/{}", field.replace('.', "/")))
    } else {
        body.get(field)
    }
}

fn expiry_from(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok().or_else(|| {
            chrono::DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.timestamp())
        }),
        _ => None,
    }
}

/// Extract the user id and expiry from a verifier reply.
pub fn parse_identity(
    body: &Value,
    user_id_field: &str,
    expiry_field: &str,
) -> Result<VerifiedIdentity, VerifyError> {
    let user_id = lookup(body, user_id_field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| VerifyError::Malformed(format!("missing '{user_id_field}'")))?;
    let expires_at = lookup(body, expiry_field)
        .and_then(expiry_from)
        .ok_or_else(|| VerifyError::Malformed(format!("missing or invalid '{expiry_field}'")))?;

    Ok(VerifiedIdentity {
        user_id: user_id.to_string(),
        expires_at,
    })
}
