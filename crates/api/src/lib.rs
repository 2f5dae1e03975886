//! Shared API types, validation, and SQL builders for FlashQudo.
//!
//! This crate is the single source of truth for request/response types and
//! the typed patch objects used for partial updates. The `backend` feature
//! adds the sea-query builders used by the server's storage layer.

use serde::{Deserialize, Serialize};

#[cfg(feature = "backend")]
pub mod db;
pub mod patch;
pub mod service;

pub use patch::{BundlePatch, CardPatch, GroupPatch, MemberPatch, UserPatch};

// ─── Entities ───────────────────────────────────────────────────────────────

/// A registered user. `id` is the identity provider's stable user id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub image_url: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

/// Membership of a user in a group. At most one row per `(group_id, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub group_id: String,
    pub user_id: String,
    pub is_admin: bool,
    pub member_since: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub group_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub bundle_id: String,
    pub question: String,
    pub answer: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A locally cached, already verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token: String,
    pub user_id: String,
    /// Unix seconds.
    pub expires: i64,
}

impl Token {
    pub fn is_live_at(&self, now_unix: i64) -> bool {
        self.expires > now_unix
    }
}

// ─── Requests ───────────────────────────────────────────────────────────────

/// Request body for `POST /api/users` — create the caller's profile.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub image_url: Option<String>,
}

/// Request body for `POST /api/groups` — the caller becomes the first admin.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: Option<String>,
}

/// Request body for `POST /api/groups/{group_id}/bundles`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateBundleRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Request body for `POST /api/bundles/{bundle_id}/cards`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateCardRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
}

/// Request body for `POST /api/groups/{group_id}/users` — add a member by username.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub username: Option<String>,
    pub is_admin: Option<bool>,
}

/// Query parameters shared by all list endpoints (`?_limit=&_page=`).
///
/// Values are kept as raw strings so a malformed number falls back to the
/// default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PagingQuery {
    #[serde(rename = "_limit")]
    pub limit: Option<String>,
    #[serde(rename = "_page")]
    pub page: Option<String>,
}

// ─── Responses ──────────────────────────────────────────────────────────────

/// A group member joined with their user profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberResponse {
    pub id: String,
    pub username: String,
    pub image_url: String,
    pub is_admin: bool,
    pub member_since: String,
}

/// A group as seen from one of its members.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupResponse {
    pub id: String,
    pub name: String,
    pub is_admin: bool,
    pub member_since: String,
}

/// A bundle summary with the number of cards it holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupBundleResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub group_id: String,
    pub card_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMembersResponse {
    pub members: Vec<GroupMemberResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListUserGroupsResponse {
    pub groups: Vec<UserGroupResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListBundlesResponse {
    pub bundles: Vec<GroupBundleResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListCardsResponse {
    pub cards: Vec<Card>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ─── Service Error ──────────────────────────────────────────────────────────

/// Framework-agnostic service error. Each variant maps to an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ServiceError {
    /// HTTP status code as a `u16`.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Internal(m) => m,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ServiceError {}

/// JSON error shape `{ "error": "..." }` returned by all error responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl From<&ServiceError> for ApiError {
    fn from(e: &ServiceError) -> Self {
        Self {
            error: e.message().to_string(),
        }
    }
}
