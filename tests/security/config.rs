//! Configuration security tests.
//!
//! Verifies secret handling across config layers and checks for
//! accidental secret exposure through `Debug` and serialization.

use flyboard::config::{Auth, Loader, Overrides};

const CLI_SECRET: &str = "cli_override_secret_of_32_bytes!!";

/// The loader drops `jwt_secret` from TOML files before applying
/// environment and CLI overrides.
#[test]
fn jwt_secret_stripped_from_config_file() {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[auth]
jwt_secret = "should_be_stripped_even_if_long_enough"
token_expiry_hours = 7
"#
    )
    .unwrap();

    let loader = Loader::new("CFGSTRIP");
    let err = loader
        .load(Some(file.path()), Overrides::default())
        .unwrap_err();
    assert!(err.to_string().contains("CFGSTRIP_JWT_SECRET must be set"));

    let config = loader
        .load(
            Some(file.path()),
            Overrides {
                jwt_secret: Some(CLI_SECRET),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(config.auth.jwt_secret, CLI_SECRET);
    assert_eq!(config.auth.token_expiry_hours, 7);
}

#[test]
fn env_secret_is_used_when_no_flag() {
    // SAFETY: the variable name is unique to this test.
    unsafe { std::env::set_var("CFGENV_JWT_SECRET", "env_secret_that_is_long_enough_32b") };
    let config = Loader::new("CFGENV")
        .load(None, Overrides::default())
        .unwrap();
    assert_eq!(config.auth.jwt_secret, "env_secret_that_is_long_enough_32b");
}

#[test]
fn debug_output_redacts_jwt_secret() {
    let auth = Auth {
        jwt_secret: "SUPER_SECRET_VALUE".to_string(),
        token_expiry_hours: 24,
    };
    let debug_output = format!("{auth:?}");
    assert!(
        !debug_output.contains("SUPER_SECRET_VALUE"),
        "Debug output leaks the JWT secret: {debug_output}"
    );
}

#[test]
fn serialized_config_omits_jwt_secret() {
    let config = flyboard::Config {
        auth: Auth {
            jwt_secret: "SERIALIZED_SECRET_VALUE".to_string(),
            token_expiry_hours: 24,
        },
        ..Default::default()
    };
    let rendered = toml::to_string(&config).unwrap();
    assert!(!rendered.contains("SERIALIZED_SECRET_VALUE"));
}
