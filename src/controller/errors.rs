use http::StatusCode;
use std::fmt;

use super::challenge::Challenge;
use crate::access::{ActionSet, Resource};
use crate::error::Error;

/// A valid token that does not grant every requested action.
///
/// The display text never reveals what was granted.
#[derive(Clone, PartialEq, Eq, thiserror::Error)]
#[error("insufficient scope")]
pub struct AuthorizationError {
    resource: Resource,
    requested: ActionSet,
    granted: ActionSet,
    challenge: Challenge,
}

impl AuthorizationError {
    pub(crate) fn new(
        resource: Resource,
        requested: ActionSet,
        granted: ActionSet,
        challenge: Challenge,
    ) -> Self {
        Self {
            resource,
            requested,
            granted,
            challenge,
        }
    }

    /// The resource whose requested actions are not covered.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn requested(&self) -> &ActionSet {
        &self.requested
    }

    pub fn granted(&self) -> &ActionSet {
        &self.granted
    }

    /// True when the token grants nothing on the resource, in which case the
    /// caller should answer as if the resource did not exist.
    pub fn resource_hidden(&self) -> bool {
        self.granted.is_empty()
    }

    /// Bearer challenge with `error="insufficient_scope"`, for callers that
    /// answer with 401 instead of 403.
    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }
}

impl fmt::Debug for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationError")
            .field("resource", &self.resource)
            .field("requested", &self.requested)
            .field("granted", &self.granted)
            .finish()
    }
}

/// Every way an access decision can fail.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error(transparent)]
    Challenge(#[from] Challenge),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    Configuration(#[from] Error),
}

impl AccessError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccessError::Challenge(_) => StatusCode::UNAUTHORIZED,
            AccessError::Authorization(err) if err.resource_hidden() => StatusCode::NOT_FOUND,
            AccessError::Authorization(_) => StatusCode::FORBIDDEN,
            AccessError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        match self {
            AccessError::Challenge(challenge) => Some(challenge),
            _ => None,
        }
    }
}
