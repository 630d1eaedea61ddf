use thiserror::Error;

/// Error type for token issuance.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}

/// Reasons a presented token is not accepted.
///
/// The variants exist for internal diagnostics only. Callers facing an
/// unauthenticated client must collapse them into one "unauthorized" outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("No token presented")]
    Missing,

    #[error("Token signature is invalid")]
    Invalid,

    #[error("Token is expired")]
    Expired,

    #[error("Token could not be decoded")]
    Malformed,
}
