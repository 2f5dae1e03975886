//! Shared business logic — framework-agnostic pure functions.
//!
//! Route handlers stay thin adapters: they decode a request, run it through
//! one of these functions, and hand the normalized value to storage.

use crate::{
    AddMemberRequest, CreateBundleRequest, CreateCardRequest, CreateGroupRequest,
    CreateUserRequest, PagingQuery, ServiceError,
};

// ─── Validation ─────────────────────────────────────────────────────────────

fn bounded(value: &str, field: &str, min: usize, max: usize) -> Result<String, ServiceError> {
    let trimmed = value.trim().to_string();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(ServiceError::BadRequest(format!(
            "{field} must be {min}-{max} characters"
        )));
    }
    Ok(trimmed)
}

/// Validate and normalize a username. Letters, digits, `_`, `-` and `.` only.
pub fn validate_username(username: &str) -> Result<String, ServiceError> {
    let username = bounded(username, "username", 1, 64)?;
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(ServiceError::BadRequest(
            "username may only contain letters, digits, '_', '-' and '.'".into(),
        ));
    }
    Ok(username)
}

pub fn validate_image_url(image_url: &str) -> Result<String, ServiceError> {
    bounded(image_url, "image url", 1, 2048)
}

pub fn validate_group_name(name: &str) -> Result<String, ServiceError> {
    bounded(name, "name", 1, 128)
}

pub fn validate_title(title: &str) -> Result<String, ServiceError> {
    bounded(title, "title", 1, 128)
}

/// Descriptions may be empty.
pub fn validate_description(description: &str) -> Result<String, ServiceError> {
    bounded(description, "description", 0, 1024)
}

pub fn validate_question(question: &str) -> Result<String, ServiceError> {
    bounded(question, "question", 1, 1024)
}

pub fn validate_answer(answer: &str) -> Result<String, ServiceError> {
    bounded(answer, "answer", 1, 4096)
}

fn required<T>(value: Option<T>) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::BadRequest("missing field".into()))
}

// ─── Create requests ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub image_url: String,
}

pub fn prepare_user(req: CreateUserRequest) -> Result<NewUser, ServiceError> {
    Ok(NewUser {
        username: validate_username(&required(req.username)?)?,
        image_url: validate_image_url(&required(req.image_url)?)?,
    })
}

pub fn prepare_group(req: CreateGroupRequest) -> Result<String, ServiceError> {
    validate_group_name(&required(req.name)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBundle {
    pub title: String,
    pub description: String,
}

pub fn prepare_bundle(req: CreateBundleRequest) -> Result<NewBundle, ServiceError> {
    Ok(NewBundle {
        title: validate_title(&required(req.title)?)?,
        description: validate_description(req.description.as_deref().unwrap_or_default())?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub question: String,
    pub answer: String,
}

pub fn prepare_card(req: CreateCardRequest) -> Result<NewCard, ServiceError> {
    Ok(NewCard {
        question: validate_question(&required(req.question)?)?,
        answer: validate_answer(&required(req.answer)?)?,
    })
}

/// Returns the normalized username and the requested admin flag.
pub fn prepare_member(req: AddMemberRequest) -> Result<(String, bool), ServiceError> {
    let username = validate_username(&required(req.username)?)?;
    let is_admin = required(req.is_admin)?;
    Ok((username, is_admin))
}

// ─── Ids ────────────────────────────────────────────────────────────────────

/// Generate a new primary key: a dash-less UUIDv4 (32 hex chars).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// ─── Paging ─────────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Normalized paging window. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub limit: u32,
    pub page: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            page: 1,
        }
    }
}

impl Paging {
    /// Unparsable or non-positive values fall back to the defaults.
    pub fn from_query(query: &PagingQuery) -> Self {
        let parse = |raw: &Option<String>| {
            raw.as_deref()
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|v| *v > 0)
        };
        let defaults = Self::default();
        Self {
            limit: parse(&query.limit)
                .unwrap_or(defaults.limit)
                .min(MAX_PAGE_LIMIT),
            page: parse(&query.page).unwrap_or(defaults.page),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.limit) * u64::from(self.page - 1)
    }
}
