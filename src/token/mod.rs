mod algorithm;
mod constants;
mod errors;
pub(crate) mod keys;
mod parts;
mod policy;
mod resolver;
mod types;
mod verifier;

#[cfg(test)]
mod tests;

pub use algorithm::SigningAlgorithm;
pub use constants::LEEWAY_SECS;
pub use errors::VerificationError;
pub use keys::{key_id, public_key_from_jwk, PublicKey};
pub use policy::VerifyPolicy;
pub use types::{Audience, ClaimSet, ResourceActions};
pub use verifier::{verify, verify_at};

pub(crate) use constants::{DEFAULT_SIGNING_ALGS, SUPPORTED_JWK_ALGS};
pub(crate) use verifier::unix_time_now;
