//! Error taxonomy. Every fallible path in the crate bottoms out in
//! [`AppError`], which the dispatcher turns into the stable `code` field
//! of the response envelope (spec §7).

use crate::fetch::FetchError;

/// One of the three stable, externally-visible error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Bad, missing, empty, or conflicting parameter.
    Validation = 2,
    /// Forced-live fetch failed with no allowable fallback.
    Unavailable = 12,
    /// Unknown action/provider/chain, or disallowed by policy.
    Unsupported = 13,
}

impl ErrorCode {
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unsupported(String),
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::Validation,
            Self::Unsupported(_) => ErrorCode::Unsupported,
            Self::Unavailable(_) => ErrorCode::Unavailable,
        }
    }
}

impl From<crate::params::ParamError> for AppError {
    fn from(err: crate::params::ParamError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::unavailable(err.to_string())
    }
}

impl From<crate::select::SelectError> for AppError {
    fn from(err: crate::select::SelectError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<crate::cache::CacheError> for AppError {
    fn from(err: crate::cache::CacheError) -> Self {
        AppError::unavailable(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
