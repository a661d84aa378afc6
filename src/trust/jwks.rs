use jsonwebtoken::jwk::JwkSet;
use log::warn;
use reqwest::blocking::Client as HttpClient;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use url::Url;

#[cfg(feature = "async-fetch")]
use crate::error::read_body_with_limit_async;
use crate::error::{read_body_with_limit, Error, MAX_ERROR_BODY_BYTES};
use crate::token::SUPPORTED_JWK_ALGS;

/// A parsed key-set document, with the `alg` members dropped while parsing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct KeySetDocument {
    pub keys: JwkSet,
    pub removed_algs: Vec<RemovedAlg>,
}

impl KeySetDocument {
    /// Parses a key-set document. Keys whose `alg` is not a string or not a
    /// supported JWA name keep their other members; the `alg` is dropped and
    /// recorded in `removed_algs`.
    pub fn parse(body: &[u8]) -> Result<Self, Error> {
        let mut value: Value = serde_json::from_slice(body)?;
        let removed_algs = match value.get_mut("keys").and_then(Value::as_array_mut) {
            Some(keys) => keys.iter_mut().filter_map(sanitize_jwk_alg).collect(),
            None => Vec::new(),
        };
        Ok(Self {
            keys: serde_json::from_value(value)?,
            removed_algs,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RemovedAlg {
    pub kid: Option<String>,
    pub alg: Option<String>,
    pub reason: RemovedAlgReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RemovedAlgReason {
    NotString,
    Unsupported,
}

/// Loads a key-set document from a file path or an `http(s)://` URL.
pub fn load_jwks(source: &str, timeout: Duration) -> Result<JwkSet, Error> {
    if is_url(source) {
        return fetch_jwks(&Url::parse(source)?, timeout);
    }
    let body = std::fs::read(Path::new(source))?;
    Ok(KeySetDocument::parse(&body)?.keys)
}

pub fn fetch_jwks(uri: &Url, timeout: Duration) -> Result<JwkSet, Error> {
    let http = HttpClient::builder().timeout(timeout).build()?;
    let mut resp = http.get(uri.clone()).send()?;
    let status = resp.status();
    if !status.is_success() {
        let body = read_body_with_limit(&mut resp, MAX_ERROR_BODY_BYTES)?;
        return Err(fetch_failed(uri, status, &body));
    }
    let body = resp.bytes()?;
    Ok(KeySetDocument::parse(&body)?.keys)
}

#[cfg(feature = "async-fetch")]
pub async fn fetch_jwks_async(uri: &Url, timeout: Duration) -> Result<JwkSet, Error> {
    let http = reqwest::Client::builder().timeout(timeout).build()?;
    let mut resp = http.get(uri.clone()).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = read_body_with_limit_async(&mut resp, MAX_ERROR_BODY_BYTES).await?;
        return Err(fetch_failed(uri, status, &body));
    }
    let body = resp.bytes().await?;
    Ok(KeySetDocument::parse(&body)?.keys)
}

pub(crate) fn is_url(source: &str) -> bool {
    source.starts_with("https://") || source.starts_with("http://")
}

fn fetch_failed(uri: &Url, status: reqwest::StatusCode, body: &[u8]) -> Error {
    let mut message = format!(
        "jwks fetch from {} returned {status} ({} body bytes read)",
        display_source(uri),
        body.len()
    );
    let preview = sanitize_error_body(body);
    if !preview.is_empty() {
        message.push_str(": ");
        message.push_str(&preview);
    }
    Error::Crypto(message)
}

pub(super) fn sanitize_error_body(body: &[u8]) -> String {
    let mut sanitized = String::new();
    for &byte in body.iter().take(128) {
        match byte {
            b'\n' => sanitized.push_str("\\n"),
            b'\r' => sanitized.push_str("\\r"),
            b'\t' => sanitized.push_str("\\t"),
            _ if byte.is_ascii_graphic() || byte == b' ' => sanitized.push(byte as char),
            _ => sanitized.push('.'),
        }
    }
    if body.len() > 128 {
        sanitized.push_str("...");
    }
    sanitized
}

/// Origin and path of a key-set URL; credentials, query and fragment are left
/// out of error messages.
pub(super) fn display_source(uri: &Url) -> String {
    format!("{}{}", uri.origin().ascii_serialization(), uri.path())
}

/// Drops an `alg` member that is not a string or not a known JWA name, so the
/// rest of the key can still be parsed.
pub(crate) fn sanitize_jwk_alg(key: &mut Value) -> Option<RemovedAlg> {
    let object = key.as_object_mut()?;
    let alg_value = object.get("alg").cloned()?;
    let kid = object
        .get("kid")
        .and_then(Value::as_str)
        .map(|s| s.to_string());
    let Some(alg) = alg_value.as_str() else {
        warn!(
            "jwk alg is not a string; kid={}",
            kid.as_deref().unwrap_or("<none>")
        );
        object.remove("alg");
        return Some(RemovedAlg {
            kid,
            alg: None,
            reason: RemovedAlgReason::NotString,
        });
    };
    if SUPPORTED_JWK_ALGS.contains(&alg) {
        return None;
    }
    warn!(
        "jwk alg unsupported; kid={}, alg={}",
        kid.as_deref().unwrap_or("<none>"),
        alg
    );
    let alg = alg.to_string();
    object.remove("alg");
    Some(RemovedAlg {
        kid,
        alg: Some(alg),
        reason: RemovedAlgReason::Unsupported,
    })
}
