use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Error body returned to clients. Internal causes are logged, not echoed.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(rename = "errorCode")]
    pub error_code: String,
    pub details: Option<serde_json::Value>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str, String),
    Unauthorized(&'static str, String),
    Forbidden(&'static str, String),
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::BadRequest("VALIDATION_ERROR", msg.into())
    }

    pub fn token_missing() -> Self {
        ApiError::Unauthorized("TOKEN_MISSING", "Unauthorized request: token missing".into())
    }

    pub fn token_expired() -> Self {
        ApiError::Unauthorized("TOKEN_EXPIRED", "Token expired".into())
    }

    pub fn token_invalid() -> Self {
        ApiError::Unauthorized("TOKEN_INVALID", "Invalid token".into())
    }

    pub fn stale_refresh_token() -> Self {
        ApiError::Forbidden(
            "STALE_REFRESH_TOKEN",
            "Refresh token has been rotated or revoked".into(),
        )
    }

    /// Map a sqlx failure onto the API taxonomy. Unique violations become a
    /// 409 with the caller-supplied message; everything else is logged and
    /// collapsed to a generic store error.
    pub fn from_db(e: sqlx::Error, conflict_msg: &'static str) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return ApiError::Conflict("CONFLICT", conflict_msg.into());
            }
        }
        tracing::error!("db error: {e}");
        ApiError::Internal("Database error".into())
    }

    pub fn db(e: sqlx::Error) -> Self {
        tracing::error!("db error: {e}");
        ApiError::Internal("Database error".into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(code, msg) => (StatusCode::BAD_REQUEST, code, msg),
            ApiError::Unauthorized(code, msg) => (StatusCode::UNAUTHORIZED, code, msg),
            ApiError::Forbidden(code, msg) => (StatusCode::FORBIDDEN, code, msg),
            ApiError::NotFound(code, msg) => (StatusCode::NOT_FOUND, code, msg),
            ApiError::Conflict(code, msg) => (StatusCode::CONFLICT, code, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", msg),
        };

        let body = ErrorBody {
            message,
            status_code: status.as_u16(),
            error_code: code.to_string(),
            details: None,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_conflict() {
        // RowNotFound is not a unique violation, so it must collapse to Internal.
        let err = ApiError::from_db(sqlx::Error::RowNotFound, "already exists");
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn error_body_uses_camel_case_keys() {
        let body = ErrorBody {
            message: "nope".into(),
            status_code: 400,
            error_code: "VALIDATION_ERROR".into(),
            details: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["statusCode"], 400);
        assert_eq!(json["errorCode"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "nope");
    }
}
