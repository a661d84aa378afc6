mod jwk;
mod public_key;
mod thumbprint;

pub use jwk::public_key_from_jwk;
pub use public_key::PublicKey;
pub use thumbprint::key_id;

pub(crate) use public_key::CertificateSignatureScheme;
