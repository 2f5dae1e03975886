use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

use flashqudo_api::{ApiError, ServiceError};

use crate::auth::Denial;
use crate::storage::StoreError;

/// Unified API error type. Renders as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiErr {
    status: StatusCode,
    message: String,
}

impl ApiErr {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }

    /// Build a closure that logs a storage error and returns `500 Internal Server Error`.
    pub fn from_db<E: fmt::Display>(context: &str) -> impl FnOnce(E) -> Self + '_ {
        move |e| {
            tracing::error!("{context}: {e}");
            Self::internal("internal server error")
        }
    }
}

impl From<ServiceError> for ApiErr {
    fn from(e: ServiceError) -> Self {
        Self {
            status: StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: ApiError::from(&e).error,
        }
    }
}

impl From<StoreError> for ApiErr {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MissingParameter(name) => Self::bad_request(format!("missing {name}")),
            StoreError::NotFound(what) => Self::not_found(format!("{what} not found")),
            StoreError::Conflict(what) => Self {
                status: StatusCode::CONFLICT,
                message: format!("{what} already exists"),
            },
            StoreError::DanglingReference => {
                Self::bad_request("referenced resource does not exist")
            }
            StoreError::MembersExist => Self::bad_request("cannot delete group with members"),
            StoreError::Sqlite(e) => Self::from_db("storage")(e),
        }
    }
}

impl From<Denial> for ApiErr {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::BadRequest(msg) => Self::bad_request(msg),
            Denial::Forbidden => Self::forbidden("forbidden"),
            Denial::NotFound(what) => Self::not_found(format!("{what} not found")),
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        (self.status, Json(ApiError { error: self.message })).into_response()
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        ApiErr::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: impl Into<ApiErr>) -> StatusCode {
        Into::<ApiErr>::into(err).into_response().status()
    }

    #[test]
    fn test_store_errors_map_to_statuses() {
        assert_eq!(status(StoreError::NotFound("card")), StatusCode::NOT_FOUND);
        assert_eq!(status(StoreError::Conflict("card")), StatusCode::CONFLICT);
        assert_eq!(status(StoreError::MembersExist), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(StoreError::Sqlite(rusqlite::Error::InvalidQuery)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_denials_map_to_statuses() {
        assert_eq!(status(Denial::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status(Denial::NotFound("user")), StatusCode::NOT_FOUND);
        assert_eq!(
            status(ServiceError::BadRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
