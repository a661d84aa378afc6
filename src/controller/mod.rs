mod access_controller;
mod challenge;
mod config;
mod errors;
mod grant;
mod redirect;

#[cfg(test)]
mod tests;

pub use access_controller::AccessController;
pub use challenge::{Challenge, ChallengeReason};
pub use config::AccessControllerConfig;
pub use errors::{AccessError, AuthorizationError};
pub use grant::{Grant, UserInfo};
pub use redirect::build_auto_redirect_url;
