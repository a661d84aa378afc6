use p256::elliptic_curve::sec1::ToEncodedPoint;
use pkcs8::DecodePublicKey;
use rsa::pkcs1v15::{Signature as RsaSignature, VerifyingKey as RsaVerifyingKey};
use rsa::pss::{Signature as PssSignature, VerifyingKey as PssVerifyingKey};
use rsa::RsaPublicKey;
use sha2::{Sha256, Sha384, Sha512};
use signature::Verifier as SignatureVerifier;
use std::fmt;

use crate::error::Error;
use crate::token::algorithm::SigningAlgorithm;

/// A public key able to verify token or certificate signatures.
#[derive(Clone)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    P521(p521::ecdsa::VerifyingKey),
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicKey::Rsa(key) => f.debug_tuple("Rsa").field(key).finish(),
            PublicKey::P256(key) => f.debug_tuple("P256").field(key).finish(),
            PublicKey::P384(key) => f.debug_tuple("P384").field(key).finish(),
            PublicKey::P521(key) => f
                .debug_tuple("P521")
                .field(&key.to_encoded_point(false))
                .finish(),
            PublicKey::Ed25519(key) => f.debug_tuple("Ed25519").field(key).finish(),
        }
    }
}

// p521 verifying keys have no PartialEq; compare their SEC1 points.
impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PublicKey::Rsa(a), PublicKey::Rsa(b)) => a == b,
            (PublicKey::P256(a), PublicKey::P256(b)) => a == b,
            (PublicKey::P384(a), PublicKey::P384(b)) => a == b,
            (PublicKey::P521(a), PublicKey::P521(b)) => {
                a.to_encoded_point(false) == b.to_encoded_point(false)
            }
            (PublicKey::Ed25519(a), PublicKey::Ed25519(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PublicKey {}

// id-Ed25519, RFC 8410.
const ED25519_OID: &str = "1.3.101.112";

impl PublicKey {
    /// Parses a DER `SubjectPublicKeyInfo`.
    pub fn from_public_key_der(der: &[u8]) -> Result<Self, Error> {
        if let Ok(key) = RsaPublicKey::from_public_key_der(der) {
            return Ok(PublicKey::Rsa(key));
        }
        if let Ok(key) = p256::PublicKey::from_public_key_der(der) {
            let encoded = key.to_encoded_point(false);
            let key = p256::ecdsa::VerifyingKey::from_encoded_point(&encoded)
                .map_err(|e| Error::Crypto(format!("p256 public key error: {e}")))?;
            return Ok(PublicKey::P256(key));
        }
        if let Ok(key) = p384::PublicKey::from_public_key_der(der) {
            let encoded = key.to_encoded_point(false);
            let key = p384::ecdsa::VerifyingKey::from_encoded_point(&encoded)
                .map_err(|e| Error::Crypto(format!("p384 public key error: {e}")))?;
            return Ok(PublicKey::P384(key));
        }
        if let Ok(key) = p521::PublicKey::from_public_key_der(der) {
            let encoded = key.to_encoded_point(false);
            let key = p521::ecdsa::VerifyingKey::from_encoded_point(&encoded)
                .map_err(|e| Error::Crypto(format!("p521 public key error: {e}")))?;
            return Ok(PublicKey::P521(key));
        }
        Err(Error::Crypto("unsupported public key format".to_string()))
    }

    /// Builds a key from the algorithm OID and raw key bits of a
    /// `SubjectPublicKeyInfo`, as found in certificates.
    pub(crate) fn from_spki_parts(
        algorithm_oid: &str,
        key_bits: &[u8],
        spki_der: &[u8],
    ) -> Result<Self, Error> {
        if algorithm_oid == ED25519_OID {
            return Self::ed25519_from_bytes(key_bits);
        }
        Self::from_public_key_der(spki_der)
    }

    pub(crate) fn ed25519_from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::Crypto("ed25519 public key must be 32 bytes".to_string()))?;
        ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map(PublicKey::Ed25519)
            .map_err(|e| Error::Crypto(format!("ed25519 public key error: {e}")))
    }

    pub fn key_type(&self) -> &'static str {
        match self {
            PublicKey::Rsa(_) => "RSA",
            PublicKey::P256(_) => "EC P-256",
            PublicKey::P384(_) => "EC P-384",
            PublicKey::P521(_) => "EC P-521",
            PublicKey::Ed25519(_) => "Ed25519",
        }
    }

    /// Verifies a JWS signature over `message`.
    ///
    /// ECDSA signatures are expected in the fixed-size `r || s` form JWS uses.
    pub fn verify_jws(
        &self,
        alg: SigningAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), Error> {
        match (alg, self) {
            (SigningAlgorithm::RS256, PublicKey::Rsa(key)) => {
                verify_pkcs1v15::<Sha256>(key, message, signature)
            }
            (SigningAlgorithm::RS384, PublicKey::Rsa(key)) => {
                verify_pkcs1v15::<Sha384>(key, message, signature)
            }
            (SigningAlgorithm::RS512, PublicKey::Rsa(key)) => {
                verify_pkcs1v15::<Sha512>(key, message, signature)
            }
            (SigningAlgorithm::PS256, PublicKey::Rsa(key)) => {
                verify_pss::<Sha256>(key, message, signature)
            }
            (SigningAlgorithm::PS384, PublicKey::Rsa(key)) => {
                verify_pss::<Sha384>(key, message, signature)
            }
            (SigningAlgorithm::PS512, PublicKey::Rsa(key)) => {
                verify_pss::<Sha512>(key, message, signature)
            }
            (SigningAlgorithm::ES256, PublicKey::P256(key)) => {
                let sig = p256::ecdsa::Signature::from_slice(signature)
                    .map_err(|e| Error::Crypto(format!("p256 signature error: {e}")))?;
                key.verify(message, &sig)
                    .map_err(|e| Error::Crypto(format!("p256 verify error: {e}")))
            }
            (SigningAlgorithm::ES384, PublicKey::P384(key)) => {
                let sig = p384::ecdsa::Signature::from_slice(signature)
                    .map_err(|e| Error::Crypto(format!("p384 signature error: {e}")))?;
                key.verify(message, &sig)
                    .map_err(|e| Error::Crypto(format!("p384 verify error: {e}")))
            }
            (SigningAlgorithm::ES512, PublicKey::P521(key)) => {
                let sig = p521::ecdsa::Signature::from_slice(signature)
                    .map_err(|e| Error::Crypto(format!("p521 signature error: {e}")))?;
                key.verify(message, &sig)
                    .map_err(|e| Error::Crypto(format!("p521 verify error: {e}")))
            }
            (SigningAlgorithm::EdDSA, PublicKey::Ed25519(key)) => {
                let sig = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|e| Error::Crypto(format!("ed25519 signature error: {e}")))?;
                key.verify(message, &sig)
                    .map_err(|e| Error::Crypto(format!("ed25519 verify error: {e}")))
            }
            (alg, key) => Err(Error::Crypto(format!(
                "algorithm {alg} cannot be used with {} key",
                key.key_type()
            ))),
        }
    }

    /// Verifies an X.509 signature over `message` for the given signature
    /// scheme. ECDSA signatures are DER encoded here.
    pub(crate) fn verify_certificate_signature(
        &self,
        scheme: CertificateSignatureScheme,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), Error> {
        match (scheme, self) {
            (CertificateSignatureScheme::RsaSha256, PublicKey::Rsa(key)) => {
                verify_pkcs1v15::<Sha256>(key, message, signature)
            }
            (CertificateSignatureScheme::RsaSha384, PublicKey::Rsa(key)) => {
                verify_pkcs1v15::<Sha384>(key, message, signature)
            }
            (CertificateSignatureScheme::RsaSha512, PublicKey::Rsa(key)) => {
                verify_pkcs1v15::<Sha512>(key, message, signature)
            }
            (CertificateSignatureScheme::EcdsaSha256, PublicKey::P256(key)) => {
                let sig = p256::ecdsa::Signature::from_der(signature)
                    .map_err(|e| Error::Crypto(format!("p256 signature parse error: {e}")))?;
                key.verify(message, &sig)
                    .map_err(|e| Error::Crypto(format!("p256 signature verify error: {e}")))
            }
            (CertificateSignatureScheme::EcdsaSha384, PublicKey::P384(key)) => {
                let sig = p384::ecdsa::Signature::from_der(signature)
                    .map_err(|e| Error::Crypto(format!("p384 signature parse error: {e}")))?;
                key.verify(message, &sig)
                    .map_err(|e| Error::Crypto(format!("p384 signature verify error: {e}")))
            }
            (CertificateSignatureScheme::EcdsaSha512, PublicKey::P521(key)) => {
                let sig = p521::ecdsa::Signature::from_der(signature)
                    .map_err(|e| Error::Crypto(format!("p521 signature parse error: {e}")))?;
                key.verify(message, &sig)
                    .map_err(|e| Error::Crypto(format!("p521 signature verify error: {e}")))
            }
            (CertificateSignatureScheme::Ed25519, PublicKey::Ed25519(key)) => {
                let sig = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|e| Error::Crypto(format!("ed25519 signature error: {e}")))?;
                key.verify(message, &sig)
                    .map_err(|e| Error::Crypto(format!("ed25519 verify error: {e}")))
            }
            (scheme, key) => Err(Error::Crypto(format!(
                "certificate signature {scheme:?} does not match issuer {} key",
                key.key_type()
            ))),
        }
    }
}

/// Certificate signature algorithms accepted while building trust chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CertificateSignatureScheme {
    RsaSha256,
    RsaSha384,
    RsaSha512,
    EcdsaSha256,
    EcdsaSha384,
    EcdsaSha512,
    Ed25519,
}

impl CertificateSignatureScheme {
    pub(crate) fn from_oid(oid: &str) -> Option<Self> {
        match oid {
            "1.2.840.113549.1.1.11" => Some(CertificateSignatureScheme::RsaSha256),
            "1.2.840.113549.1.1.12" => Some(CertificateSignatureScheme::RsaSha384),
            "1.2.840.113549.1.1.13" => Some(CertificateSignatureScheme::RsaSha512),
            "1.2.840.10045.4.3.2" => Some(CertificateSignatureScheme::EcdsaSha256),
            "1.2.840.10045.4.3.3" => Some(CertificateSignatureScheme::EcdsaSha384),
            "1.2.840.10045.4.3.4" => Some(CertificateSignatureScheme::EcdsaSha512),
            ED25519_OID => Some(CertificateSignatureScheme::Ed25519),
            _ => None,
        }
    }
}

fn verify_pkcs1v15<D>(key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> Result<(), Error>
where
    D: sha2::Digest + pkcs8::AssociatedOid,
{
    let verifier = RsaVerifyingKey::<D>::new(key.clone());
    let sig = RsaSignature::try_from(signature)
        .map_err(|e| Error::Crypto(format!("rsa signature error: {e}")))?;
    verifier
        .verify(message, &sig)
        .map_err(|e| Error::Crypto(format!("rsa verify error: {e}")))
}

fn verify_pss<D>(key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> Result<(), Error>
where
    D: sha2::Digest + sha2::digest::FixedOutputReset,
{
    let verifier = PssVerifyingKey::<D>::new(key.clone());
    let sig = PssSignature::try_from(signature)
        .map_err(|e| Error::Crypto(format!("rsa-pss signature error: {e}")))?;
    verifier
        .verify(message, &sig)
        .map_err(|e| Error::Crypto(format!("rsa-pss verify error: {e}")))
}
