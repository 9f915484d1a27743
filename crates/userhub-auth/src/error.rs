use std::path::PathBuf;

use axum::http::StatusCode;
use userhub_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Any token that fails verification. The concrete reason is logged, never returned.
    #[error("invalid token")]
    InvalidToken,

    #[error("key {kid} not found")]
    KeyNotFound { kid: String },

    #[error("private key {kid} has no matching public key")]
    MissingPublicKey { kid: String },

    #[error("failed to load key {kid}")]
    KeyLoad {
        kid: String,
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => AppError::request(StatusCode::UNAUTHORIZED, err.to_string()),
            other => AppError::Unclassified(other.into()),
        }
    }
}
