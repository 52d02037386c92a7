use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::AppState;

/// Authenticated identity for the current request, decoded from the bearer
/// access token. Verification is a pure signature check; no store round-trip.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub phone: String,
    pub email: Option<String>,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            // Extract Authorization: Bearer <token>
            let TypedHeader(authz): TypedHeader<Authorization<Bearer>> =
                TypedHeader::from_request_parts(parts, state)
                    .await
                    .map_err(|_| ApiError::token_missing())?;

            let claims = state.tokens.decode_access_token(authz.token())?;

            Ok(AuthContext {
                user_id: claims.sub,
                phone: claims.phone,
                email: claims.email,
            })
        }
    }
}
