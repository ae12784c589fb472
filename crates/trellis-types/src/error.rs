//! Error types for trellis.
//!
//! Command execution itself reports failure as a boolean with a diagnostic
//! already written to the output sink; these errors cover the setup path
//! (tree construction, alias registration, configuration).

use std::io;

/// Errors produced while building or configuring an interpreter.
#[derive(Debug, thiserror::Error)]
pub enum TrellisError {
    #[error("registration error: {0}")]
    Registration(String),

    #[error("alias error: {0}")]
    Alias(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TrellisError>;
