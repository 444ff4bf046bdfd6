//! JWT and authentication security tests.
//!
//! Verifies token signing, algorithm handling, secret strength,
//! and RFC 7235 compliance for Bearer token extraction.

use flyboard::auth::{self, Identity};
use flyboard::config::Auth as AuthConfig;
use flyboard::Error;

fn config(secret: &str) -> AuthConfig {
    AuthConfig {
        jwt_secret: secret.to_string(),
        token_expiry_hours: 24,
    }
}

/// The JWT layer rejects secrets shorter than 32 bytes.
#[test]
fn rejects_short_secret() {
    let config = config("x");
    assert!(
        auth::create_token(&config, &Identity::new("user-1")).is_err(),
        "Short secret should be rejected"
    );
}

#[test]
fn rejects_empty_secret() {
    let config = config("");
    assert!(auth::create_token(&config, &Identity::new("admin")).is_err());
}

/// `Validation::default()` restricts to HS256, so a token forged with
/// `"alg":"none"` must be rejected.
#[test]
fn rejects_none_algorithm_token() {
    use base64::Engine;
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = engine.encode(
        serde_json::json!({"sub":"admin","exp":9999999999i64,"iat":1700000000}).to_string(),
    );
    let forged = format!("{header}.{payload}.");

    let config = config("real_secret_that_is_at_least_32b!");
    assert!(matches!(
        auth::verify_token(&config, &forged),
        Err(Error::Unauthorized)
    ));
}

/// Rotating the signing key invalidates all outstanding tokens.
#[test]
fn key_rotation_invalidates_old_tokens() {
    let old = config("old_secret_key_production_32byte!");
    let new = config("new_secret_key_production_32byte!");
    let token = auth::create_token(&old, &Identity::new("user-1")).unwrap();
    assert!(auth::verify_token(&new, &token).is_err());
}

#[test]
fn expired_token_is_reported_as_expired() {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let config = config("test_secret_that_is_at_least_32b!");
    let claims = auth::Claims {
        sub: "user-1".into(),
        exp: 1_000_000,
        iat: 999_000,
        email: None,
        name: None,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .unwrap();

    assert!(matches!(
        auth::verify_token(&config, &token),
        Err(Error::TokenExpired)
    ));
}

/// RFC 7235: the auth-scheme is case-insensitive.
#[test]
fn bearer_prefix_is_case_insensitive() {
    let config = config("test_secret_that_is_at_least_32b!");
    let identity = Identity::new("user-1").with_email("ana@example.com");
    let token = auth::create_token(&config, &identity).unwrap();

    let mut headers = hyper::http::HeaderMap::new();
    headers.insert("Authorization", format!("bearer {token}").parse().unwrap());
    let extracted = auth::extract_identity(&headers, &config).unwrap();
    assert_eq!(extracted, identity);
}

#[test]
fn other_schemes_are_rejected() {
    let config = config("test_secret_that_is_at_least_32b!");
    let token = auth::create_token(&config, &Identity::new("user-1")).unwrap();

    let mut headers = hyper::http::HeaderMap::new();
    headers.insert("Authorization", format!("Basic {token}").parse().unwrap());
    assert!(matches!(
        auth::extract_identity(&headers, &config),
        Err(Error::Unauthorized)
    ));
}
