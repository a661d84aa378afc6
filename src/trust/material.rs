use jsonwebtoken::jwk::JwkSet;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use super::bundle::certificates_from_pem;
#[cfg(feature = "async-fetch")]
use super::jwks::{fetch_jwks_async, is_url};
use super::jwks::load_jwks;
use super::pool::{CertificatePool, ParsedCertificate};
use crate::error::Error;
use crate::token::keys::{key_id, public_key_from_jwk, PublicKey};

/// The keys a verifier accepts: root certificates anchoring `x5c` chains and
/// a key-identifier to public-key mapping.
///
/// Every root's key is also registered under its JWK thumbprint.
#[derive(Debug, Clone, Default)]
pub struct TrustMaterial {
    roots: CertificatePool,
    keys: HashMap<String, PublicKey>,
}

impl TrustMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pem_bundle(bytes: &[u8]) -> Result<Self, Error> {
        let mut material = Self::new();
        material.add_pem_bundle(bytes)?;
        Ok(material)
    }

    /// Reads trust material from its configured sources, fetching the key set
    /// when `jwks` is a URL.
    pub fn load(
        root_cert_bundle: Option<&Path>,
        jwks: Option<&str>,
        fetch_timeout: Duration,
    ) -> Result<Self, Error> {
        let mut material = Self::new();
        if let Some(path) = root_cert_bundle {
            material.add_pem_bundle(&read_bundle(path)?)?;
        }
        if let Some(source) = jwks {
            let set = load_jwks(source, fetch_timeout).map_err(|err| {
                Error::config(format!("unable to load jwks from {source}: {err}"))
            })?;
            material.add_jwks(&set);
        }
        material.ensure_anchors()?;
        Ok(material)
    }

    #[cfg(feature = "async-fetch")]
    pub async fn load_async(
        root_cert_bundle: Option<&Path>,
        jwks: Option<&str>,
        fetch_timeout: Duration,
    ) -> Result<Self, Error> {
        let mut material = Self::new();
        if let Some(path) = root_cert_bundle {
            material.add_pem_bundle(&read_bundle(path)?)?;
        }
        if let Some(source) = jwks {
            let set = if is_url(source) {
                fetch_jwks_async(&url::Url::parse(source)?, fetch_timeout).await
            } else {
                load_jwks(source, fetch_timeout)
            }
            .map_err(|err| Error::config(format!("unable to load jwks from {source}: {err}")))?;
            material.add_jwks(&set);
        }
        material.ensure_anchors()?;
        Ok(material)
    }

    /// Adds every certificate of a PEM bundle as a root. Returns how many were
    /// added.
    pub fn add_pem_bundle(&mut self, bytes: &[u8]) -> Result<usize, Error> {
        let certs = certificates_from_pem(bytes)?;
        let count = certs.len();
        for cert in certs {
            self.add_root(cert);
        }
        Ok(count)
    }

    /// Adds a root to the pool and registers its key under the key's
    /// thumbprint. Roots with an unsupported key are pooled without a key id.
    pub fn add_root(&mut self, cert: ParsedCertificate) {
        match cert.public_key().map(|key| (key_id(key), key)) {
            Some((id, key)) if !id.is_empty() => {
                debug!("trusting root {} as key {id}", cert.subject());
                self.keys.insert(id, key.clone());
            }
            _ => warn!(
                "root {} has an unsupported key; no key id registered",
                cert.subject()
            ),
        }
        self.roots.add(cert);
    }

    /// Registers each usable key of `jwks` under its thumbprint and, when
    /// declared, its `kid`. Returns how many keys were registered.
    pub fn add_jwks(&mut self, jwks: &JwkSet) -> usize {
        let mut added = 0;
        for jwk in &jwks.keys {
            let declared = jwk.common.key_id.as_deref();
            let key = match public_key_from_jwk(jwk) {
                Ok(key) => key,
                Err(err) => {
                    warn!(
                        "skipping jwk; kid={}: {err}",
                        declared.unwrap_or("<none>")
                    );
                    continue;
                }
            };
            let id = key_id(&key);
            if id.is_empty() {
                continue;
            }
            if let Some(kid) = declared.filter(|kid| *kid != id) {
                self.keys.insert(kid.to_string(), key.clone());
            }
            self.keys.insert(id, key);
            added += 1;
        }
        added
    }

    pub fn add_key(&mut self, key_id: impl Into<String>, key: PublicKey) {
        self.keys.insert(key_id.into(), key);
    }

    /// A verifier without any anchor can never accept a token.
    pub fn ensure_anchors(&self) -> Result<(), Error> {
        if self.roots.is_empty() && self.keys.is_empty() {
            return Err(Error::config(
                "token auth requires at least one root certificate or trusted key",
            ));
        }
        Ok(())
    }

    pub fn roots(&self) -> &CertificatePool {
        &self.roots
    }

    pub fn keys(&self) -> &HashMap<String, PublicKey> {
        &self.keys
    }

    pub fn into_parts(self) -> (CertificatePool, HashMap<String, PublicKey>) {
        (self.roots, self.keys)
    }
}

fn read_bundle(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|err| {
        Error::config(format!(
            "unable to read root certificate bundle {}: {err}",
            path.display()
        ))
    })
}
