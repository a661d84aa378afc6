use log::{debug, warn};
use std::str::FromStr;

use super::algorithm::SigningAlgorithm;
use super::constants::LEEWAY_SECS;
use super::errors::VerificationError;
use super::parts::{base64_url_decode, decode_header, split_token};
use super::policy::VerifyPolicy;
use super::resolver::resolve_signing_key;
use super::types::ClaimSet;

/// Verifies a compact token against `policy` at the current time.
pub fn verify(raw_token: &str, policy: &VerifyPolicy) -> Result<ClaimSet, VerificationError> {
    verify_at(raw_token, policy, unix_time_now())
}

/// Verifies a compact token against `policy` as of `now` (seconds since the
/// Unix epoch).
///
/// Structural problems yield `MalformedToken`. Every trust, signature, issuer,
/// audience or time failure yields `InvalidToken`; the precise cause is only
/// logged.
pub fn verify_at(
    raw_token: &str,
    policy: &VerifyPolicy,
    now: u64,
) -> Result<ClaimSet, VerificationError> {
    let parts = split_token(raw_token)?;
    let header = decode_header(parts.header)?;
    debug!("verifying {} token; typ={:?}", header.alg, header.typ);
    let payload = base64_url_decode(parts.payload).map_err(|_| VerificationError::MalformedToken)?;
    let signature =
        base64_url_decode(parts.signature).map_err(|_| VerificationError::MalformedToken)?;
    let alg = SigningAlgorithm::from_str(&header.alg)
        .ok()
        .filter(|alg| policy.allows(*alg))
        .ok_or_else(|| {
            warn!("token signed with disallowed algorithm {:?}", header.alg);
            VerificationError::MalformedToken
        })?;

    let key = resolve_signing_key(&header, policy, now).map_err(|err| {
        warn!("token signing key not trusted: {err}");
        VerificationError::InvalidToken
    })?;

    key.verify_jws(alg, parts.signing_input().as_bytes(), &signature)
        .map_err(|err| {
            warn!("token signature rejected: {err}");
            VerificationError::InvalidToken
        })?;

    let claims: ClaimSet = serde_json::from_slice(&payload).map_err(|err| {
        warn!("token claims unreadable: {err}");
        VerificationError::InvalidToken
    })?;
    validate_claims(&claims, policy, now)?;
    Ok(claims)
}

fn validate_claims(
    claims: &ClaimSet,
    policy: &VerifyPolicy,
    now: u64,
) -> Result<(), VerificationError> {
    if !policy.trusted_issuers.contains(&claims.issuer) {
        return Err(invalid(format!("untrusted issuer {:?}", claims.issuer)));
    }
    if !claims.audience.intersects(&policy.accepted_audiences) {
        return Err(invalid(format!(
            "no accepted audience in {:?}",
            claims.audience.0
        )));
    }

    let Some(expiration) = claims.expiration else {
        return Err(invalid("missing exp claim".to_string()));
    };
    if now >= expiration.saturating_add(LEEWAY_SECS) {
        return Err(invalid(format!("expired at {expiration} (now {now})")));
    }
    if let Some(not_before) = claims.not_before {
        if not_before > now.saturating_add(LEEWAY_SECS) {
            return Err(invalid(format!("not valid before {not_before} (now {now})")));
        }
    }
    if let Some(issued_at) = claims.issued_at {
        if issued_at > now.saturating_add(LEEWAY_SECS) {
            return Err(invalid(format!("issued in the future at {issued_at} (now {now})")));
        }
    }
    Ok(())
}

fn invalid(reason: String) -> VerificationError {
    warn!("token claims rejected: {reason}");
    VerificationError::InvalidToken
}

pub(crate) fn unix_time_now() -> u64 {
    u64::try_from(time::OffsetDateTime::now_utc().unix_timestamp()).unwrap_or(0)
}
