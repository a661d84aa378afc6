use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{debug, warn};

use super::errors::VerificationError;
use super::keys::{key_id, public_key_from_jwk, PublicKey};
use super::parts::TokenHeader;
use super::policy::VerifyPolicy;
use crate::trust::ParsedCertificate;

/// Determines the key a token's signature must be checked with.
///
/// The first applicable header shape decides: an `x5c` chain, then an embedded
/// `jwk` carrying its own chain, then a bare embedded `jwk`, then `kid`. A chain
/// that is present but does not verify is final; no other header field is
/// consulted after it.
pub(crate) fn resolve_signing_key(
    header: &TokenHeader,
    policy: &VerifyPolicy,
    now: u64,
) -> Result<PublicKey, VerificationError> {
    if !header.x5c.is_empty() {
        debug!("resolving signing key from x5c chain");
        return verify_chain(&header.x5c, policy, now);
    }

    if let Some(jwk) = &header.jwk {
        let embedded = public_key_from_jwk(jwk).map_err(|err| {
            warn!("embedded jwk rejected: {err}");
            VerificationError::InvalidToken
        })?;

        if let Some(chain) = jwk.common.x509_chain.as_ref().filter(|c| !c.is_empty()) {
            debug!("resolving signing key from embedded jwk chain");
            let ders = chain
                .iter()
                .map(|cert| STANDARD.decode(cert))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| {
                    warn!("embedded jwk x5c is not base64: {err}");
                    VerificationError::InvalidToken
                })?;
            let leaf_key = verify_chain(&ders, policy, now)?;
            if leaf_key != embedded {
                warn!("embedded jwk does not match its certificate chain");
                return Err(VerificationError::InvalidToken);
            }
            return Ok(leaf_key);
        }

        let id = key_id(&embedded);
        return match policy.trusted_keys.get(&id) {
            Some(trusted) if !id.is_empty() => Ok(trusted.clone()),
            _ => {
                warn!("untrusted jwk with no certificate chain; thumbprint={id}");
                Err(VerificationError::UntrustedSigningKey)
            }
        };
    }

    if let Some(kid) = &header.kid {
        return policy.trusted_keys.get(kid).cloned().ok_or_else(|| {
            warn!("token signed by untrusted key with id {kid:?}");
            VerificationError::UntrustedSigningKey
        });
    }

    warn!("token header names no signing key");
    Err(VerificationError::InvalidToken)
}

fn verify_chain(
    ders: &[Vec<u8>],
    policy: &VerifyPolicy,
    now: u64,
) -> Result<PublicKey, VerificationError> {
    let certs = ders
        .iter()
        .map(|der| ParsedCertificate::from_der(der))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| {
            warn!("token certificate chain unreadable: {err}");
            VerificationError::InvalidToken
        })?;
    let Some((leaf, intermediates)) = certs.split_first() else {
        return Err(VerificationError::InvalidToken);
    };
    policy
        .trust_roots
        .verify_chain(leaf, intermediates, now)
        .map_err(|err| {
            warn!("token certificate chain untrusted: {err}");
            VerificationError::UntrustedSigningKey
        })?;
    leaf.public_key().cloned().ok_or(VerificationError::UntrustedSigningKey)
}
