use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use jsonwebtoken::jwk::Jwk;
use log::debug;
use serde_json::Value;

use super::errors::VerificationError;
use crate::error::Error;
use crate::trust::sanitize_jwk_alg;

pub(crate) struct TokenParts<'a> {
    pub(crate) header: &'a str,
    pub(crate) payload: &'a str,
    pub(crate) signature: &'a str,
}

impl TokenParts<'_> {
    pub(crate) fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }
}

/// Protected header of a compact token.
#[derive(Debug, Clone)]
pub(crate) struct TokenHeader {
    pub(crate) alg: String,
    pub(crate) kid: Option<String>,
    pub(crate) typ: Option<String>,
    /// DER certificates from `x5c`, leaf first.
    pub(crate) x5c: Vec<Vec<u8>>,
    pub(crate) jwk: Option<Jwk>,
}

pub(crate) fn split_token(token: &str) -> Result<TokenParts<'_>, VerificationError> {
    let mut iter = token.split('.');
    let header = iter.next().ok_or(VerificationError::MalformedToken)?;
    let payload = iter.next().ok_or(VerificationError::MalformedToken)?;
    let signature = iter.next().ok_or(VerificationError::MalformedToken)?;
    if iter.next().is_some() {
        return Err(VerificationError::MalformedToken);
    }
    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(VerificationError::MalformedToken);
    }
    Ok(TokenParts {
        header,
        payload,
        signature,
    })
}

pub(crate) fn decode_header(encoded: &str) -> Result<TokenHeader, VerificationError> {
    let header_bytes = base64_url_decode(encoded).map_err(malformed)?;
    let raw: Value = serde_json::from_slice(&header_bytes).map_err(malformed)?;
    let Value::Object(mut raw) = raw else {
        debug!("token header is not a json object");
        return Err(VerificationError::MalformedToken);
    };

    // No critical header extensions are understood, so none may be required.
    if raw.contains_key("crit") {
        debug!("token header carries crit extensions");
        return Err(VerificationError::MalformedToken);
    }

    let alg = raw
        .get("alg")
        .and_then(Value::as_str)
        .ok_or(VerificationError::MalformedToken)?
        .to_string();
    let kid = optional_string(raw.get("kid"))?;
    let typ = optional_string(raw.get("typ"))?;

    let x5c = match raw.get("x5c") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| {
                let encoded = entry.as_str().ok_or(VerificationError::MalformedToken)?;
                STANDARD.decode(encoded).map_err(malformed)
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(VerificationError::MalformedToken),
    };

    let jwk = match raw.remove("jwk") {
        None | Some(Value::Null) => None,
        Some(mut value @ Value::Object(_)) => {
            sanitize_jwk_alg(&mut value);
            Some(serde_json::from_value::<Jwk>(value).map_err(malformed)?)
        }
        Some(_) => return Err(VerificationError::MalformedToken),
    };

    Ok(TokenHeader {
        alg,
        kid,
        typ,
        x5c,
        jwk,
    })
}

pub(crate) fn base64_url_decode(data: &str) -> Result<Vec<u8>, Error> {
    URL_SAFE_NO_PAD
        .decode(data)
        .map_err(|err| Error::Crypto(format!("base64url decode error: {err}")))
}

fn optional_string(value: Option<&Value>) -> Result<Option<String>, VerificationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.to_string())),
        Some(_) => Err(VerificationError::MalformedToken),
    }
}

fn malformed(err: impl std::fmt::Display) -> VerificationError {
    debug!("malformed token: {err}");
    VerificationError::MalformedToken
}
