//! Unified application error model.
//! One enum is shared by the session gate, the dinner log, and the shell,
//! along with a disposition mapping that decides whether a failure is shown
//! inline to the user or only logged.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Where a failure surfaces. `Inline` failures are rendered next to the view
/// that triggered them; `LogOnly` failures are recorded and the view carries
/// on with a neutral fallback. Nothing is allowed to crash the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    LogOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// Bad form input. No write is performed and no state changes.
    Validation { code: String, message: String },
    /// Allow-list lookup failed. Callers must treat this as "not authorized".
    AuthCheck { code: String, message: String },
    /// The store rejected or failed an append. Form state is preserved.
    Write { code: String, message: String },
    /// Sign-out failed; the session may remain stale until the next start.
    SignOut { code: String, message: String },
    /// A read query failed; views render empty rather than propagate.
    Store { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Validation { code, .. }
            | AppError::AuthCheck { code, .. }
            | AppError::Write { code, .. }
            | AppError::SignOut { code, .. }
            | AppError::Store { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message, .. }
            | AppError::AuthCheck { message, .. }
            | AppError::Write { message, .. }
            | AppError::SignOut { message, .. }
            | AppError::Store { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn validation<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Validation { code: code.into(), message: msg.into() } }
    pub fn auth_check<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::AuthCheck { code: code.into(), message: msg.into() } }
    pub fn write<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Write { code: code.into(), message: msg.into() } }
    pub fn sign_out<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::SignOut { code: code.into(), message: msg.into() } }
    pub fn store<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Store { code: code.into(), message: msg.into() } }
    pub fn internal<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// How the failure is surfaced. Validation and write failures are the
    /// user's business; everything else is an operational log line.
    pub fn disposition(&self) -> Disposition {
        match self {
            AppError::Validation { .. } => Disposition::Inline,
            AppError::Write { .. } => Disposition::Inline,
            AppError::AuthCheck { .. } => Disposition::LogOnly,
            AppError::SignOut { .. } => Disposition::LogOnly,
            AppError::Store { .. } => Disposition::LogOnly,
            AppError::Internal { .. } => Disposition::LogOnly,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Default mapping: treat as a store failure unless mapped at the call site
        AppError::Store { code: "store_error".into(), message: err.to_string() }
    }
}
