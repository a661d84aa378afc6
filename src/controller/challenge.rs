use http::header::{HeaderMap, HeaderValue, InvalidHeaderValue, WWW_AUTHENTICATE};
use std::fmt;

use crate::token::VerificationError;

/// Why a Bearer challenge is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeReason {
    /// No Bearer credential was presented.
    TokenRequired,
    /// A credential was presented but rejected.
    Verification(VerificationError),
    /// The token is valid but does not grant the requested actions.
    InsufficientScope,
}

impl ChallengeReason {
    /// RFC 6750 `error` code. A missing credential carries none.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            ChallengeReason::TokenRequired => None,
            ChallengeReason::Verification(_) => Some("invalid_token"),
            ChallengeReason::InsufficientScope => Some("insufficient_scope"),
        }
    }
}

impl fmt::Display for ChallengeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeReason::TokenRequired => f.write_str("token required"),
            ChallengeReason::Verification(err) => write!(f, "{err}"),
            ChallengeReason::InsufficientScope => f.write_str("insufficient scope"),
        }
    }
}

/// A denial telling the client how to (re-)authenticate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct Challenge {
    realm: String,
    service: String,
    scope: String,
    reason: ChallengeReason,
}

impl Challenge {
    pub(crate) fn new(
        realm: String,
        service: String,
        scope: String,
        reason: ChallengeReason,
    ) -> Self {
        Self {
            realm,
            service,
            scope,
            reason,
        }
    }

    pub fn reason(&self) -> ChallengeReason {
        self.reason
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Space separated `type:name:actions` scopes, empty when nothing was
    /// requested.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Value of the `WWW-Authenticate` header.
    ///
    /// `Bearer realm="..",service=".."[,scope=".."][,error="..",error_description=".."]`
    pub fn header_value(&self) -> String {
        let mut value = format!(
            "Bearer realm={},service={}",
            quote(&self.realm),
            quote(&self.service)
        );
        if !self.scope.is_empty() {
            value.push_str(",scope=");
            value.push_str(&quote(&self.scope));
        }
        if let Some(code) = self.reason.error_code() {
            value.push_str(",error=");
            value.push_str(&quote(code));
            value.push_str(",error_description=");
            value.push_str(&quote(&self.reason.to_string()));
        }
        value
    }

    pub fn set_headers(&self, headers: &mut HeaderMap) -> Result<(), InvalidHeaderValue> {
        headers.insert(WWW_AUTHENTICATE, HeaderValue::from_str(&self.header_value())?);
        Ok(())
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
