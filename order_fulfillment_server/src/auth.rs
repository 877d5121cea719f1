//! Bearer-token authentication for the seller surface.
//!
//! ID tokens are minted by the external auth provider; this server only verifies them. A single [`TokenVerifier`] is
//! built from configuration at startup and injected into handlers as app data, never constructed per request.
//!
//! Handlers opt into authentication by taking an [`AuthenticatedUser`] parameter: extraction fails the request with
//! a 401 before the handler body runs. The payment-confirmation path instead calls [`TokenVerifier::verify`]
//! directly, because there an unusable token degrades to guest checkout rather than an error.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use log::debug;
use order_fulfillment_engine::db_types::UserId;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// The claims carried by an externally-minted ID token. `sub` is the stable user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl IdTokenClaims {
    pub fn user_id(&self) -> UserId {
        UserId::from(self.sub.clone())
    }
}

pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    configured: bool,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let key = config.verification_key.reveal();
        let decoding_key = DecodingKey::from_secret(key.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self { decoding_key, validation, configured: !config.verification_key.is_empty() }
    }

    /// Validates the token signature and expiry and returns its claims. An unset verification key rejects every
    /// token (fail closed).
    pub fn verify(&self, token: &str) -> Result<IdTokenClaims, AuthError> {
        if !self.configured {
            return Err(AuthError::NotConfigured);
        }
        jsonwebtoken::decode::<IdTokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::ValidationError(e.to_string()))
    }
}

/// The authenticated caller of a seller endpoint, extracted from the `Authorization: Bearer` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ServerError> {
    let verifier = req
        .app_data::<web::Data<TokenVerifier>>()
        .ok_or_else(|| ServerError::InitializeError("TokenVerifier is not registered as app data".to_string()))?;
    let token = bearer_token(req).ok_or(AuthError::MissingBearerToken)?;
    let claims = verifier.verify(token).map_err(|e| {
        debug!("🔑️ Bearer token rejected. {e}");
        e
    })?;
    Ok(AuthenticatedUser { user_id: claims.user_id() })
}

/// Pulls the token out of an `Authorization: Bearer <token>` header, if present and well-formed.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
