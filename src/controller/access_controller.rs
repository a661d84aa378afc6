use http::header::AUTHORIZATION;
use http::{HeaderMap, Request};
use log::{debug, info};
use std::sync::{Arc, RwLock};

use super::challenge::{Challenge, ChallengeReason};
use super::config::AccessControllerConfig;
use super::errors::{AccessError, AuthorizationError};
use super::grant::{Grant, UserInfo};
use super::redirect::build_auto_redirect_url;
use crate::access::{Access, AccessSet};
use crate::error::Error;
use crate::token::{unix_time_now, verify_at, VerifyPolicy};
use crate::trust::TrustMaterial;

const BEARER_PREFIX: &str = "bearer ";

/// Decides whether a request's Bearer token grants a set of requested
/// actions.
///
/// The controller only reads shared state, so one instance may serve
/// concurrent requests. Trust material can be swapped while it is in use.
#[derive(Debug)]
pub struct AccessController {
    realm: String,
    service: String,
    auto_redirect: Option<AutoRedirect>,
    policy: RwLock<Arc<VerifyPolicy>>,
}

#[derive(Debug, Clone)]
struct AutoRedirect {
    path: String,
    force_tls_disabled: bool,
}

impl AccessController {
    /// Validates `config` and loads its trust material, fetching a remote key
    /// set when one is configured.
    pub fn new(config: AccessControllerConfig) -> Result<Self, Error> {
        config.validate()?;
        let trust = TrustMaterial::load(
            config.root_cert_bundle.as_deref(),
            config.jwks.as_deref(),
            config.jwks_fetch_timeout,
        )?;
        Self::with_trust(config, trust)
    }

    #[cfg(feature = "async-fetch")]
    pub async fn new_async(config: AccessControllerConfig) -> Result<Self, Error> {
        config.validate()?;
        let trust = TrustMaterial::load_async(
            config.root_cert_bundle.as_deref(),
            config.jwks.as_deref(),
            config.jwks_fetch_timeout,
        )
        .await?;
        Self::with_trust(config, trust)
    }

    /// Builds a controller around trust material that is already loaded.
    /// The trust sources named in `config` are not read.
    pub fn with_trust(config: AccessControllerConfig, trust: TrustMaterial) -> Result<Self, Error> {
        config.validate_settings()?;
        trust.ensure_anchors()?;
        let policy = VerifyPolicy::new(trust)
            .with_issuer(config.issuer.clone())
            .with_audience(config.service.clone())
            .with_signing_algorithms(config.signing_algorithms.clone());
        let auto_redirect = config.auto_redirect.then(|| AutoRedirect {
            path: config.auto_redirect_path.clone(),
            force_tls_disabled: config.auto_redirect_force_tls_disabled,
        });
        Ok(Self {
            realm: config.realm,
            service: config.service,
            auto_redirect,
            policy: RwLock::new(Arc::new(policy)),
        })
    }

    /// Snapshot of the policy tokens are currently verified against.
    pub fn policy(&self) -> Arc<VerifyPolicy> {
        match self.policy.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replaces the trusted roots and keys. Decisions already in progress
    /// finish against the previous material.
    pub fn replace_trust(&self, trust: TrustMaterial) -> Result<(), Error> {
        trust.ensure_anchors()?;
        let current = self.policy();
        let (trust_roots, trusted_keys) = trust.into_parts();
        let next = VerifyPolicy {
            trust_roots,
            trusted_keys,
            ..(*current).clone()
        };
        let mut guard = match self.policy.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(next);
        info!(
            "token trust material replaced; {} roots, {} keys",
            guard.trust_roots.len(),
            guard.trusted_keys.len()
        );
        Ok(())
    }

    pub fn authorize<B>(
        &self,
        request: &Request<B>,
        access: &[Access],
    ) -> Result<Grant, AccessError> {
        self.authorize_at(request, access, unix_time_now())
    }

    /// Same as [`authorize`](Self::authorize), judging token lifetimes as of
    /// `now` (seconds since the Unix epoch).
    pub fn authorize_at<B>(
        &self,
        request: &Request<B>,
        access: &[Access],
        now: u64,
    ) -> Result<Grant, AccessError> {
        let requested = AccessSet::from_requests(access);
        let challenge = |reason| {
            Challenge::new(
                self.challenge_realm(request),
                self.service.clone(),
                requested.scope_param(),
                reason,
            )
        };

        let Some(token) = bearer_token(request.headers()) else {
            debug!("request carries no bearer token");
            return Err(challenge(ChallengeReason::TokenRequired).into());
        };

        let policy = self.policy();
        let claims = verify_at(token, &policy, now)
            .map_err(|err| challenge(ChallengeReason::Verification(err)))?;

        let granted = claims.access_set();
        for (resource, actions) in requested.iter() {
            let granted_actions = granted.actions_for(resource).cloned().unwrap_or_default();
            if actions.iter().all(|action| granted_actions.contains(action)) {
                continue;
            }
            info!(
                "subject {:?} lacks {} on {}:{}",
                claims.subject, actions, resource.resource_type, resource.name
            );
            return Err(AuthorizationError::new(
                resource.clone(),
                actions.clone(),
                granted_actions,
                challenge(ChallengeReason::InsufficientScope),
            )
            .into());
        }

        Ok(Grant {
            user: UserInfo {
                name: claims.subject.clone(),
            },
            resources: claims.resources(),
        })
    }

    fn challenge_realm<B>(&self, request: &Request<B>) -> String {
        self.auto_redirect
            .as_ref()
            .and_then(|redirect| {
                build_auto_redirect_url(request, &redirect.path, redirect.force_tls_disabled)
            })
            .unwrap_or_else(|| self.realm.clone())
    }
}

/// Token of an `Authorization: Bearer <token>` header. The scheme is matched
/// case-insensitively; a blank token counts as no credential.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let prefix = value.get(..BEARER_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }
    Some(value[BEARER_PREFIX.len()..].trim()).filter(|token| !token.is_empty())
}
