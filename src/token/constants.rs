use super::algorithm::SigningAlgorithm;

/// Clock skew tolerated between the token issuer and this verifier, in seconds.
pub const LEEWAY_SECS: u64 = 60;

pub(crate) const DEFAULT_SIGNING_ALGS: &[SigningAlgorithm] = &[
    SigningAlgorithm::RS256,
    SigningAlgorithm::RS384,
    SigningAlgorithm::RS512,
    SigningAlgorithm::PS256,
    SigningAlgorithm::PS384,
    SigningAlgorithm::PS512,
    SigningAlgorithm::ES256,
    SigningAlgorithm::ES384,
    SigningAlgorithm::ES512,
    SigningAlgorithm::EdDSA,
];

// `alg` values jsonwebtoken's typed JWK model accepts. Anything else is stripped
// from key-set entries before they are parsed.
pub(crate) const SUPPORTED_JWK_ALGS: &[&str] = &[
    "HS256",
    "HS384",
    "HS512",
    "ES256",
    "ES384",
    "RS256",
    "RS384",
    "RS512",
    "PS256",
    "PS384",
    "PS512",
    "EdDSA",
    "RSA1_5",
    "RSA-OAEP",
    "RSA-OAEP-256",
];
