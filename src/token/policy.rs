use std::collections::{HashMap, HashSet};

use super::algorithm::SigningAlgorithm;
use super::constants::DEFAULT_SIGNING_ALGS;
use super::keys::PublicKey;
use crate::trust::{CertificatePool, TrustMaterial};

/// Trust policy a token is verified against.
///
/// Built once and shared read-only. `trust_roots` and `trusted_keys` together
/// are the only keys a token may be signed with.
#[derive(Debug, Clone)]
pub struct VerifyPolicy {
    pub trusted_issuers: HashSet<String>,
    pub accepted_audiences: HashSet<String>,
    pub trust_roots: CertificatePool,
    pub trusted_keys: HashMap<String, PublicKey>,
    pub signing_algorithms: Vec<SigningAlgorithm>,
}

impl VerifyPolicy {
    pub fn new(trust: TrustMaterial) -> Self {
        let (trust_roots, trusted_keys) = trust.into_parts();
        Self {
            trusted_issuers: HashSet::new(),
            accepted_audiences: HashSet::new(),
            trust_roots,
            trusted_keys,
            signing_algorithms: DEFAULT_SIGNING_ALGS.to_vec(),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.trusted_issuers.insert(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.accepted_audiences.insert(audience.into());
        self
    }

    pub fn with_signing_algorithms(mut self, algorithms: Vec<SigningAlgorithm>) -> Self {
        self.signing_algorithms = algorithms;
        self
    }

    pub(crate) fn allows(&self, alg: SigningAlgorithm) -> bool {
        self.signing_algorithms.contains(&alg)
    }
}
