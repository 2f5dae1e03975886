//! Server configuration, read once from the environment at startup.

use anyhow::Context;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;

/// Where and how to verify unseen bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub verify_url: String,
    /// JSON field holding the user id. Dots address nested fields.
    pub user_id_field: String,
    /// JSON field holding the expiry (unix seconds or RFC 3339).
    pub expiry_field: String,
    /// Accept invalid TLS certificates. Development only.
    pub tls_skip_verify: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub port: u16,
    pub identity: Option<IdentityConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_dir = var("FLASHQUDO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid PORT value '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        let identity = var("IDENTITY_VERIFY_URL").map(|verify_url| IdentityConfig {
            verify_url,
            user_id_field: var("IDENTITY_USER_ID_FIELD").unwrap_or_else(|| "uid".into()),
            expiry_field: var("IDENTITY_EXPIRY_FIELD").unwrap_or_else(|| "exp".into()),
            tls_skip_verify: var("IDENTITY_TLS_SKIP_VERIFY")
                .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
        });

        Ok(Self {
            data_dir,
            port,
            identity,
        })
    }
}
