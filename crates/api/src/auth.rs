//! Bearer token authentication
//!
//! Access tokens are HS256 JWTs whose `sub` claim is the owner identity that
//! scopes every collection row.

use crate::error::{ApiError, Result};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use cinehub_core::AuthConfig;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

const DEFAULT_TOKEN_TTL: i64 = 3600; // 1 hour

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Owner identity
    pub iat: i64,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Signs and verifies access tokens with a shared secret
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
}

impl JwtVerifier {
    pub fn new(secret: &[u8], issuer: Option<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes(), config.issuer.clone())
    }

    /// Issue an access token for `owner`
    pub fn issue(&self, owner: &str) -> Result<String> {
        self.issue_with_ttl(owner, DEFAULT_TOKEN_TTL)
    }

    pub fn issue_with_ttl(&self, owner: &str, ttl_secs: i64) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: owner.to_string(),
            iat: now,
            exp: now + ttl_secs,
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to encode JWT: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| ApiError::InvalidToken(e.to_string()))?;

        if data.claims.sub.is_empty() {
            return Err(ApiError::InvalidToken("empty subject".to_string()));
        }

        Ok(data.claims)
    }

    /// Extract token from Authorization header
    pub fn extract_bearer_token(auth_header: &str) -> Result<&str> {
        auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidToken("Missing Bearer prefix".to_string()))
    }
}

/// Owner identity of an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub owner_id: String,
}

impl AuthenticatedUser {
    fn from_request_sync(req: &HttpRequest) -> Result<Self> {
        let verifier = req
            .app_data::<web::Data<JwtVerifier>>()
            .ok_or_else(|| ApiError::Internal("JWT verifier not configured".to_string()))?;

        let header = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = JwtVerifier::extract_bearer_token(header)?;
        let claims = verifier.verify(token)?;

        Ok(Self {
            owner_id: claims.sub,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_request_sync(req))
    }
}
