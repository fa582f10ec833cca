use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    error::ApiError,
};

/// Name of the cookie in which the identity provider stores the session token.
pub const SESSION_COOKIE: &str = "__session";

/// Header accepted as the user id in `Env::Local` only.
pub const DEV_USER_HEADER: &str = "x-user-id";

/// Claims
///
/// Payload of the session token issued by the hosted identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the provider's opaque user identifier.
    pub sub: String,
    /// Expiration Time (exp): always validated.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// AuthContext
///
/// Authentication state of a single request. It is resolved once, before the access policy
/// runs, and handed to the policy as an explicit argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    /// `None` means the caller is unauthenticated.
    pub user_id: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// AuthUser
///
/// Resolved identity of a request that must be authenticated. Extraction fails with
/// `401 Unauthorized` when no valid session is present.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

/// resolve_auth_context
///
/// Derives the caller's identity from the request headers:
/// 1. Local bypass: in `Env::Local` a non-empty `x-user-id` header is trusted as-is.
/// 2. Session token: `Authorization: Bearer <jwt>`, falling back to the `__session` cookie.
/// 3. Verification: RS256 against the provider's public key when configured, HS256 otherwise.
///
/// Every failure collapses to an anonymous context, so callers fail closed.
pub fn resolve_auth_context(headers: &HeaderMap, config: &AppConfig) -> AuthContext {
    if config.dev_identity_bypass() {
        let dev_user = headers
            .get(DEV_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        if let Some(user_id) = dev_user {
            return AuthContext::authenticated(user_id);
        }
    }

    let Some(token) = bearer_token(headers).or_else(|| session_cookie(headers)) else {
        return AuthContext::anonymous();
    };

    match verify_session_token(token, config) {
        Ok(claims) => AuthContext::authenticated(claims.sub),
        Err(e) => {
            tracing::debug!(error = %e, "session token rejected");
            AuthContext::anonymous()
        }
    }
}

/// Decodes and validates a session token against the configured verification key.
pub fn verify_session_token(
    token: &str,
    config: &AppConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let (decoding_key, algorithm) = match &config.jwt_public_key {
        Some(pem) => (DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256),
        None => (
            DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            Algorithm::HS256,
        ),
    };

    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;

    decode::<Claims>(token, &decoding_key, &validation).map(|data| data.claims)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
        })
}

/// AuthContext Extractor
///
/// Never rejects. Reuses the context the access policy middleware stored in the request
/// extensions when available, and resolves it from the headers otherwise.
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<AuthContext>() {
            return Ok(context.clone());
        }

        let config = AppConfig::from_ref(state);
        Ok(resolve_auth_context(&parts.headers, &config))
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(context) = AuthContext::from_request_parts(parts, state).await;

        context
            .user_id
            .map(|id| AuthUser { id })
            .ok_or(ApiError::Unauthorized)
    }
}
