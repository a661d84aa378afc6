#![forbid(unsafe_code)]

mod access;
mod controller;
mod error;
mod token;
mod trust;

pub use error::Error;

pub use access::{Access, AccessSet, ActionSet, Resource, WILDCARD_ACTION};

pub use token::{
    key_id, public_key_from_jwk, verify, verify_at, Audience, ClaimSet, PublicKey,
    ResourceActions, SigningAlgorithm, VerificationError, VerifyPolicy, LEEWAY_SECS,
};

#[cfg(feature = "async-fetch")]
pub use trust::fetch_jwks_async;
pub use trust::{
    certificates_from_pem, fetch_jwks, load_jwks, CertificatePool, KeySetDocument,
    ParsedCertificate, RemovedAlg, RemovedAlgReason, TrustMaterial,
};

pub use controller::{
    build_auto_redirect_url, AccessController, AccessControllerConfig, AccessError,
    AuthorizationError, Challenge, ChallengeReason, Grant, UserInfo,
};
