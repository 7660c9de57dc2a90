//! Error types.
//!
//! Each failure domain gets its own enum so callers can match on what actually
//! went wrong. None of these are fatal to a running bridge: sink failures are
//! retried (startup) or logged (afterwards), and device loss is not an error at
//! all, it is an `Option` that drives the disconnect path.

use thiserror::Error;

/// Failure reported by a [`Sink`](crate::sink::Sink).
#[derive(Debug, Error)]
pub enum SinkError {
    /// The receiving side is not wired up yet. Expected during startup.
    #[error("sink is not ready")]
    NotReady,

    /// The receiving side went away.
    #[error("sink is closed")]
    Closed,

    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A bridge command string that could not be decoded.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    #[error("expected namespace `{expected}`, found `{found}`")]
    WrongNamespace { expected: String, found: String },

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("command `{command}` is missing field `{field}`")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("invalid boolean `{0}`")]
    InvalidBool(String),

    #[error("malformed device entry `{0}`")]
    MalformedDevice(String),
}

/// Configuration could not be loaded or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A virtual-device scenario script could not be loaded.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse script: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by [`Bridge`](crate::bridge::Bridge) operations that take
/// caller input.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// `select` was given a position outside the last register listing.
    #[error("no registered device at position {position} ({available} registered)")]
    UnknownSelection { position: usize, available: usize },

    /// A device backend failed to initialise.
    #[error("backend error: {0}")]
    Backend(String),
}
