use serde_json::{json, Map, Value};
use std::path::PathBuf;

use crate::controller::AccessControllerConfig;
use crate::error::Error;
use crate::token::SigningAlgorithm;

fn options(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn base() -> Value {
    json!({
        "realm": "https://auth.example.com/token",
        "issuer": "auth.example.com",
        "service": "registry.example.com",
        "rootcertbundle": "/etc/registry/root.pem",
    })
}

fn config_error(value: Value) -> String {
    match AccessControllerConfig::from_options(&options(value)) {
        Err(Error::Config(message)) => message,
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn reads_registry_options() {
    let mut value = base();
    value["jwks"] = json!("https://auth.example.com/jwks.json");
    value["signingalgorithms"] = json!(["ES256", "EdDSA"]);
    value["autoredirect"] = json!(true);
    value["autoredirectforcetlsdisabled"] = json!(true);

    let config = AccessControllerConfig::from_options(&options(value)).expect("config");
    assert_eq!(config.realm, "https://auth.example.com/token");
    assert_eq!(config.issuer, "auth.example.com");
    assert_eq!(config.service, "registry.example.com");
    assert_eq!(
        config.root_cert_bundle,
        Some(PathBuf::from("/etc/registry/root.pem"))
    );
    assert_eq!(config.jwks.as_deref(), Some("https://auth.example.com/jwks.json"));
    assert_eq!(
        config.signing_algorithms,
        vec![SigningAlgorithm::ES256, SigningAlgorithm::EdDSA]
    );
    assert!(config.auto_redirect);
    assert_eq!(config.auto_redirect_path, "/auth/token");
    assert!(config.auto_redirect_force_tls_disabled);
}

#[test]
fn defaults_apply_when_options_are_absent() {
    let config = AccessControllerConfig::from_options(&options(base())).expect("config");
    assert_eq!(config.signing_algorithms.len(), 10);
    assert!(!config.auto_redirect);
    assert_eq!(config.auto_redirect_path, "/auth/token");
    assert!(config.jwks.is_none());
}

#[test]
fn custom_redirect_path_is_kept() {
    let mut value = base();
    value["autoredirect"] = json!(true);
    value["autoredirectpath"] = json!("/v2/token");
    let config = AccessControllerConfig::from_options(&options(value)).expect("config");
    assert_eq!(config.auto_redirect_path, "/v2/token");
}

#[test]
fn required_strings_are_enforced() {
    for key in ["realm", "issuer", "service"] {
        let mut value = base();
        value.as_object_mut().expect("object").remove(key);
        assert!(config_error(value).contains(key), "missing {key}");
    }
}

#[test]
fn a_trust_source_is_required() {
    let mut value = base();
    value.as_object_mut().expect("object").remove("rootcertbundle");
    assert!(config_error(value).contains("rootcertbundle"));
}

#[test]
fn unknown_signing_algorithm_is_rejected() {
    let mut value = base();
    value["signingalgorithms"] = json!(["RS256", "HS256"]);
    assert!(config_error(value).contains("HS256"));
}

#[test]
fn wrongly_typed_option_is_rejected() {
    let mut value = base();
    value["autoredirect"] = json!("yes");
    assert!(config_error(value).contains("invalid token auth options"));
}

#[test]
fn builder_produces_valid_config() {
    let config = AccessControllerConfig::new("realm", "issuer", "service")
        .with_jwks("/etc/registry/jwks.json")
        .with_signing_algorithms(vec![SigningAlgorithm::RS256])
        .with_auto_redirect("/token")
        .with_force_tls_disabled(true);
    config.validate().expect("valid");
    assert_eq!(config.auto_redirect_path, "/token");

    let relative = AccessControllerConfig::new("realm", "issuer", "service")
        .with_jwks("/etc/registry/jwks.json")
        .with_auto_redirect("token");
    assert!(relative.validate().is_err());
}
