use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rand::thread_rng;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{json, Value};
use sha2::Sha256;
use signature::{RandomizedSigner, SignatureEncoding, Signer};
use std::sync::OnceLock;

use crate::token::{PublicKey, VerifyPolicy};
use crate::trust::TrustMaterial;

pub(super) const ISSUER: &str = "auth.example.com";
pub(super) const SERVICE: &str = "registry.example.com";
pub(super) const NOW: u64 = 1_700_000_000;
pub(super) const RSA_KID: &str = "rsa-signing-key";

pub(super) fn rsa_private_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut thread_rng(), 2048).expect("private key"))
}

fn rsa_private_key_pem() -> &'static str {
    static PEM: OnceLock<String> = OnceLock::new();
    PEM.get_or_init(|| {
        rsa_private_key()
            .to_pkcs1_pem(LineEnding::LF)
            .expect("private key pem")
            .to_string()
    })
    .as_str()
}

pub(super) fn rsa_public_key() -> PublicKey {
    PublicKey::Rsa(RsaPublicKey::from(rsa_private_key()))
}

pub(super) fn rsa_jwk() -> Value {
    let public = RsaPublicKey::from(rsa_private_key());
    json!({
        "kty": "RSA",
        "n": URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
        "e": URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
    })
}

pub(super) fn p256_jwk(key: &p256::ecdsa::VerifyingKey) -> Value {
    let point = key.to_encoded_point(false);
    json!({
        "kty": "EC",
        "crv": "P-256",
        "x": URL_SAFE_NO_PAD.encode(point.x().expect("x coord")),
        "y": URL_SAFE_NO_PAD.encode(point.y().expect("y coord")),
    })
}

pub(super) fn ed25519_jwk(key: &ed25519_dalek::VerifyingKey) -> Value {
    json!({
        "kty": "OKP",
        "crv": "Ed25519",
        "x": URL_SAFE_NO_PAD.encode(key.as_bytes()),
    })
}

/// Claims accepted by [`rsa_policy`] at `now`.
pub(super) fn claims_at(now: u64) -> Value {
    json!({
        "iss": ISSUER,
        "sub": "alice",
        "aud": SERVICE,
        "exp": now + 300,
        "nbf": now,
        "iat": now,
        "jti": "token-1",
        "access": [{
            "type": "repository",
            "name": "foo/bar",
            "actions": ["pull"],
        }],
    })
}

pub(super) fn rs256_token(kid: Option<&str>, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    encode(
        &header,
        claims,
        &EncodingKey::from_rsa_pem(rsa_private_key_pem().as_bytes()).expect("encoding key"),
    )
    .expect("token")
}

/// Builds a compact token from an arbitrary header, signing it with `sign`.
pub(super) fn sign_token(
    header: &Value,
    claims: &Value,
    sign: impl FnOnce(&[u8]) -> Vec<u8>,
) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).expect("header json"));
    let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).expect("payload json"));
    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature = sign(signing_input.as_bytes());
    format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
}

pub(super) fn rs256_sign(message: &[u8]) -> Vec<u8> {
    let key = rsa::pkcs1v15::SigningKey::<Sha256>::new(rsa_private_key().clone());
    key.sign(message).to_vec()
}

pub(super) fn ps256_sign(message: &[u8]) -> Vec<u8> {
    let key = rsa::pss::BlindedSigningKey::<Sha256>::new(rsa_private_key().clone());
    key.sign_with_rng(&mut thread_rng(), message).to_vec()
}

pub(super) fn es256_sign(key: &p256::ecdsa::SigningKey, message: &[u8]) -> Vec<u8> {
    let signature: p256::ecdsa::Signature = key.sign(message);
    signature.to_bytes().to_vec()
}

pub(super) fn ed25519_sign(key: &ed25519_dalek::SigningKey, message: &[u8]) -> Vec<u8> {
    key.sign(message).to_bytes().to_vec()
}

pub(super) fn policy_with(trust: TrustMaterial) -> VerifyPolicy {
    VerifyPolicy::new(trust)
        .with_issuer(ISSUER)
        .with_audience(SERVICE)
}

/// Policy trusting the shared RSA key under [`RSA_KID`].
pub(super) fn rsa_policy() -> VerifyPolicy {
    let mut trust = TrustMaterial::new();
    trust.add_key(RSA_KID, rsa_public_key());
    policy_with(trust)
}
