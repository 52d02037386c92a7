use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;

/// Identity minted into access tokens. Never persisted as a struct; it only
/// lives inside signed tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: usize,
    pub exp: usize,
}

/// Refresh tokens carry the user id and nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
    #[error("token signing failed")]
    Sign,
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => ApiError::token_expired(),
            TokenError::Invalid => ApiError::token_invalid(),
            TokenError::Sign => ApiError::Internal("Token generation failed".into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signing/verification material, built once from config at startup and
/// carried in AppState. Access and refresh tokens use distinct secrets.
#[derive(Clone)]
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenKeys {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl_seconds: i64,
        refresh_ttl_seconds: i64,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    pub fn issue_access_token(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: identity.user_id,
            phone: identity.phone.clone(),
            email: identity.email.clone(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::seconds(self.access_ttl_seconds)).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.access_encoding).map_err(|_| TokenError::Sign)
    }

    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id,
            iat: now.timestamp() as usize,
            exp: (now + Duration::seconds(self.refresh_ttl_seconds)).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.refresh_encoding).map_err(|_| TokenError::Sign)
    }

    /// Issue both tokens. If either signing step fails the whole pair fails;
    /// nothing is persisted here.
    pub fn issue_token_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        let access_token = self.issue_access_token(identity)?;
        let refresh_token = self.issue_refresh_token(identity.user_id)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub fn decode_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.access_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(map_decode_err)
    }

    pub fn decode_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(map_decode_err)
    }
}

fn map_decode_err(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::new("access-secret", "refresh-secret", 3600, 7 * 24 * 3600)
    }

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            phone: "9999999999".into(),
            email: Some("a@b.com".into()),
        }
    }

    #[test]
    fn access_token_round_trips_identity() {
        let keys = keys();
        let id = identity();
        let token = keys.issue_access_token(&id).unwrap();
        let claims = keys.decode_access_token(&token).unwrap();
        assert_eq!(claims.sub, id.user_id);
        assert_eq!(claims.phone, id.phone);
        assert_eq!(claims.email, id.email);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_carries_only_user_id() {
        let keys = keys();
        let id = identity();
        let pair = keys.issue_token_pair(&id).unwrap();
        let claims = keys.decode_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(claims.sub, id.user_id);

        let value = serde_json::to_value(&claims).unwrap();
        let mut field_names: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        field_names.sort();
        assert_eq!(field_names, vec!["exp", "iat", "sub"]);
    }

    #[test]
    fn expired_access_token_is_rejected_as_expired() {
        // Negative TTL well past the default 60s decode leeway.
        let keys = TokenKeys::new("access-secret", "refresh-secret", -300, -300);
        let token = keys.issue_access_token(&identity()).unwrap();
        assert!(matches!(
            keys.decode_access_token(&token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn tokens_do_not_cross_secrets() {
        let keys = keys();
        let id = identity();
        let pair = keys.issue_token_pair(&id).unwrap();
        // A refresh token presented as an access token must fail verification.
        assert!(matches!(
            keys.decode_access_token(&pair.refresh_token),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(
            keys.decode_refresh_token(&pair.access_token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn identity_without_email_omits_the_claim() {
        let keys = keys();
        let id = Identity {
            user_id: Uuid::new_v4(),
            phone: "8888888888".into(),
            email: None,
        };
        let token = keys.issue_access_token(&id).unwrap();
        let claims = keys.decode_access_token(&token).unwrap();
        assert_eq!(claims.email, None);
    }
}
