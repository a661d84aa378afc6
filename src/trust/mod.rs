mod bundle;
mod jwks;
mod material;
mod pool;

#[cfg(test)]
pub(crate) mod tests;

pub use bundle::certificates_from_pem;
#[cfg(feature = "async-fetch")]
pub use jwks::fetch_jwks_async;
pub use jwks::{fetch_jwks, load_jwks, KeySetDocument, RemovedAlg, RemovedAlgReason};
pub use material::TrustMaterial;
pub use pool::{CertificatePool, ParsedCertificate};

pub(crate) use jwks::sanitize_jwk_alg;
