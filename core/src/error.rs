//! Error types for TalentScope

use crate::rbac::{Action, Resource, Role};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for TalentScope operations
pub type Result<T> = std::result::Result<T, TalentScopeError>;

/// Main error type for TalentScope
#[derive(Error, Debug)]
pub enum TalentScopeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Session persistence errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Authorization denials
    #[error("{0}")]
    PermissionDenied(#[from] PermissionDenied),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while authenticating a user into the session
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("Credentials rejected")]
    CredentialsRejected,

    /// A system-bound role resolved without a system to bind to
    #[error("Role '{0}' requires a system")]
    MissingSystem(Role),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Failed to persist session: {0}")]
    Storage(#[from] SessionError),
}

/// Session persistence errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to load session: {0}")]
    LoadFailed(String),

    #[error("Failed to save session: {0}")]
    SaveFailed(String),

    #[error("Failed to clear session: {0}")]
    ClearFailed(String),

    /// Persisted data exists but cannot be decoded into a user
    #[error("Corrupt session data: {0}")]
    Corrupt(String),
}

/// A denied authorization check, suitable for `?` propagation at mutation sites
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Permission denied for {action} on {resource}: {reason}")]
pub struct PermissionDenied {
    pub resource: Resource,
    pub action: Action,
    pub reason: String,
}

/// A role or backend name that does not parse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownName {
    pub kind: &'static str,
    pub value: String,
}

impl From<serde_json::Error> for TalentScopeError {
    fn from(err: serde_json::Error) -> Self {
        TalentScopeError::Other(format!("JSON error: {}", err))
    }
}
