use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;
use crate::token::{SigningAlgorithm, DEFAULT_SIGNING_ALGS};

const DEFAULT_AUTO_REDIRECT_PATH: &str = "/auth/token";
const DEFAULT_JWKS_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings of a token access controller.
#[derive(Debug, Clone)]
pub struct AccessControllerConfig {
    pub realm: String,
    pub issuer: String,
    pub service: String,
    pub root_cert_bundle: Option<PathBuf>,
    /// Key-set document: a file path or an `http(s)://` URL.
    pub jwks: Option<String>,
    pub signing_algorithms: Vec<SigningAlgorithm>,
    pub auto_redirect: bool,
    pub auto_redirect_path: String,
    pub auto_redirect_force_tls_disabled: bool,
    pub jwks_fetch_timeout: Duration,
}

impl AccessControllerConfig {
    pub fn new(
        realm: impl Into<String>,
        issuer: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            realm: realm.into(),
            issuer: issuer.into(),
            service: service.into(),
            ..Self::default()
        }
    }

    pub fn with_root_cert_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_cert_bundle = Some(path.into());
        self
    }

    pub fn with_jwks(mut self, source: impl Into<String>) -> Self {
        self.jwks = Some(source.into());
        self
    }

    pub fn with_signing_algorithms(mut self, algorithms: Vec<SigningAlgorithm>) -> Self {
        self.signing_algorithms = algorithms;
        self
    }

    pub fn with_auto_redirect(mut self, path: impl Into<String>) -> Self {
        self.auto_redirect = true;
        self.auto_redirect_path = path.into();
        self
    }

    pub fn with_force_tls_disabled(mut self, disabled: bool) -> Self {
        self.auto_redirect_force_tls_disabled = disabled;
        self
    }

    pub fn with_jwks_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.jwks_fetch_timeout = timeout;
        self
    }

    /// Reads the `token` access-controller options of a registry
    /// configuration.
    ///
    /// Recognised keys: `realm`, `issuer`, `service`, `rootcertbundle`, `jwks`,
    /// `signingalgorithms`, `autoredirect`, `autoredirectpath` and
    /// `autoredirectforcetlsdisabled`.
    pub fn from_options(options: &Map<String, Value>) -> Result<Self, Error> {
        let raw: TokenOptions = serde_json::from_value(Value::Object(options.clone()))
            .map_err(|err| Error::config(format!("invalid token auth options: {err}")))?;

        let signing_algorithms = match raw.signingalgorithms {
            Some(names) if !names.is_empty() => names
                .iter()
                .map(|name| SigningAlgorithm::from_str(name))
                .collect::<Result<Vec<_>, _>>()?,
            _ => DEFAULT_SIGNING_ALGS.to_vec(),
        };

        let config = Self {
            realm: raw.realm,
            issuer: raw.issuer,
            service: raw.service,
            root_cert_bundle: raw.rootcertbundle.filter(|p| !p.as_os_str().is_empty()),
            jwks: raw.jwks.filter(|s| !s.is_empty()),
            signing_algorithms,
            auto_redirect: raw.autoredirect,
            auto_redirect_path: raw
                .autoredirectpath
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_AUTO_REDIRECT_PATH.to_string()),
            auto_redirect_force_tls_disabled: raw.autoredirectforcetlsdisabled,
            jwks_fetch_timeout: DEFAULT_JWKS_TIMEOUT,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.validate_settings()?;
        if self.root_cert_bundle.is_none() && self.jwks.is_none() {
            return Err(Error::config(
                "token auth requires at least one of \"rootcertbundle\" or \"jwks\"",
            ));
        }
        Ok(())
    }

    /// Checks everything except the trust sources.
    pub(crate) fn validate_settings(&self) -> Result<(), Error> {
        for (name, value) in [
            ("realm", &self.realm),
            ("issuer", &self.issuer),
            ("service", &self.service),
        ] {
            if value.is_empty() {
                return Err(Error::config(format!(
                    "token auth requires a valid option string: {name:?}"
                )));
            }
        }
        if self.signing_algorithms.is_empty() {
            return Err(Error::config("token auth requires a signing algorithm"));
        }
        if self.auto_redirect && !self.auto_redirect_path.starts_with('/') {
            return Err(Error::config(format!(
                "autoredirectpath must be an absolute path: {:?}",
                self.auto_redirect_path
            )));
        }
        Ok(())
    }
}

impl Default for AccessControllerConfig {
    fn default() -> Self {
        Self {
            realm: String::new(),
            issuer: String::new(),
            service: String::new(),
            root_cert_bundle: None,
            jwks: None,
            signing_algorithms: DEFAULT_SIGNING_ALGS.to_vec(),
            auto_redirect: false,
            auto_redirect_path: DEFAULT_AUTO_REDIRECT_PATH.to_string(),
            auto_redirect_force_tls_disabled: false,
            jwks_fetch_timeout: DEFAULT_JWKS_TIMEOUT,
        }
    }
}

#[derive(Deserialize)]
struct TokenOptions {
    #[serde(default)]
    realm: String,
    #[serde(default)]
    issuer: String,
    #[serde(default)]
    service: String,
    #[serde(default)]
    rootcertbundle: Option<PathBuf>,
    #[serde(default)]
    jwks: Option<String>,
    #[serde(default)]
    signingalgorithms: Option<Vec<String>>,
    #[serde(default)]
    autoredirect: bool,
    #[serde(default)]
    autoredirectpath: Option<String>,
    #[serde(default)]
    autoredirectforcetlsdisabled: bool,
}
