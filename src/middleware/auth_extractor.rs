// src/middleware/auth_extractor.rs
use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use actix_web::error::ErrorUnauthorized;
use base64::Engine;
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use log::{debug, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::models::user::JwtClaims;
use crate::AppState;

/// Authenticated caller, taken from the `Authorization: Bearer <jwt>` header
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid JWT format")]
    Format,
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("jwt rejected: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid subject uuid: {0}")]
    Subject(#[from] uuid::Error),
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<AuthenticatedUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_header = match req.headers().get("Authorization") {
            Some(header) => match header.to_str() {
                Ok(h) => h,
                Err(_) => return ready(Err(ErrorUnauthorized("Invalid header format"))),
            },
            None => return ready(Err(ErrorUnauthorized("Missing Authorization header"))),
        };

        let Some(token) = auth_header.strip_prefix("Bearer ").map(str::trim) else {
            return ready(Err(ErrorUnauthorized("Invalid auth header format")));
        };

        let secret = req
            .app_data::<web::Data<AppState>>()
            .and_then(|state| state.config.supabase_jwt_secret.as_deref());

        let result = match secret {
            Some(secret) => verify_user_id(token, secret),
            None => {
                debug!("no SUPABASE_JWT_SECRET configured, token signature not checked");
                extract_user_id_unverified(token)
            }
        };

        match result {
            Ok(user_id) => ready(Ok(AuthenticatedUser { user_id })),
            Err(e) => {
                warn!("auth failed: {}", e);
                ready(Err(ErrorUnauthorized("Invalid token")))
            }
        }
    }
}

/// Verifies an HS256 Supabase access token and returns its `sub`.
pub fn verify_user_id(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<JwtClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
    Ok(Uuid::parse_str(&data.claims.sub)?)
}

/// Reads `sub` from the payload without checking the signature.
/// Only used when no JWT secret is configured (local development).
pub fn extract_user_id_unverified(token: &str) -> Result<Uuid, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Format);
    }

    // JWT uses base64url without padding; some clients pad anyway
    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .or_else(|_| base64::engine::general_purpose::URL_SAFE.decode(parts[1]))?;

    let claims: JwtClaims = serde_json::from_slice(&decoded)?;
    Ok(Uuid::parse_str(&claims.sub)?)
}
