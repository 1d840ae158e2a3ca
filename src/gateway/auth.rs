//! Bearer token verification and role middleware
//!
//! Tokens are HS256 JWTs issued by the campus identity service; `sub` carries
//! the user id. The middleware loads the user and injects `AuthenticatedUser`.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use super::types::ApiError;
use crate::account::User;
use crate::core_types::UserId;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id as string
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Clone)]
pub struct JwtVerifier {
    secret: String,
}

impl JwtVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issue a token; used by tooling and tests
    pub fn issue(
        &self,
        user_id: UserId,
        ttl: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

/// Caller identity injected by [`require_user`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(ApiError::missing_auth)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Invalid token format"))?;

    let claims = state.jwt.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        ApiError::unauthorized("Invalid or expired token")
    })?;

    let user_id = claims
        .sub
        .parse::<UserId>()
        .map_err(|_| ApiError::unauthorized("Invalid user ID in token"))?;

    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Must run inside [`require_user`]
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let is_admin = request
        .extensions()
        .get::<AuthenticatedUser>()
        .is_some_and(|AuthenticatedUser(user)| user.is_admin());
    if !is_admin {
        return Err(ApiError::forbidden("Administrator role required"));
    }
    Ok(next.run(request).await)
}
