/// Why a token was rejected.
///
/// Deliberately coarse: the display text is what reaches clients, so it never
/// says which check failed. The detailed cause is logged where it is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("malformed token")]
    MalformedToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("untrusted signing key")]
    UntrustedSigningKey,
}
