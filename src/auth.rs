//! Bearer token verification for the hosted identity provider.
//!
//! Tokens are HS256 JWTs signed with a secret shared with the provider. The
//! `sub` claim is the external identity; optional `email` and `name` claims
//! seed the profile created on first access.

use hyper::http::HeaderMap;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::{Auth as AuthConfig, MIN_SECRET_LENGTH};
use crate::error::{Error, Result};

fn validate_secret(config: &AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_SECRET_LENGTH {
        return Err(Error::Config(format!(
            "JWT secret must be at least {MIN_SECRET_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// External identity id.
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The signed-in identity, as asserted by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Identity {
    /// Identity with no profile hints.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}

/// Mint a token for an identity.
///
/// Production tokens come from the identity provider; this is used by the
/// `flyboard token` command and by tests.
pub fn create_token(config: &AuthConfig, identity: &Identity) -> Result<String> {
    validate_secret(config)?;
    let now = jiff::Timestamp::now();
    let exp = jiff::Span::new()
        .try_hours(i64::from(config.token_expiry_hours))
        .and_then(|span| now.checked_add(span))
        .map_err(|e| Error::Config(format!("Invalid token_expiry_hours: {e}")))?;

    let claims = Claims {
        sub: identity.id.clone(),
        exp: exp.as_second(),
        iat: now.as_second(),
        email: identity.email.clone(),
        name: identity.name.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token creation failed: {e}")))
}

/// Verify and decode a JWT token.
///
/// # Returns
/// - `Ok(Claims)` if the token is valid
/// - `Err(Error::TokenExpired)` if the token has expired
/// - `Err(Error::Unauthorized)` for any other validation failure
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims> {
    validate_secret(config)?;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::TokenExpired,
        _ => Error::Unauthorized,
    })?;

    Ok(token_data.claims)
}

/// Extract the signed-in identity from the Authorization header.
///
/// Expects `Authorization: Bearer <token>`; the scheme is case-insensitive.
pub fn extract_identity(headers: &HeaderMap, config: &AuthConfig) -> Result<Identity> {
    let auth_header = headers
        .get(hyper::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(Error::Unauthorized)?;

    let token = auth_header
        .get(..7)
        .filter(|p| p.eq_ignore_ascii_case("bearer "))
        .map(|_| &auth_header[7..])
        .ok_or(Error::Unauthorized)?;

    Ok(verify_token(config, token)?.into())
}
