//! Error taxonomy
//!
//! Activation errors (`NotAMember`, `UnavailablePort`) and data-integrity
//! errors are typed so callers can decide whether to surface or absorb them.
//! Nothing in this crate is fatal to the embedding process: at worst a single
//! port's state goes stale until the next server event.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Activation was requested for a port that does not belong to the device
    /// asked to activate it. Integration error; log and drop the request.
    #[error("port `{port}` does not belong to device `{device}`")]
    NotAMember { device: String, port: String },

    /// Activation was requested for a port that is not effectively available.
    /// Can occur legitimately when a user click races an unplug event;
    /// recovered locally by ignoring the activation.
    #[error("port `{port}` on device `{device}` is not available")]
    UnavailablePort { device: String, port: String },

    /// A non-dummy port has neither a display name nor a description. This
    /// signals malformed input from the server layer and is surfaced, never
    /// silently defaulted.
    #[error("port `{port}` has neither a display name nor a description")]
    MissingDescription { port: String },

    /// The audio server rejected or failed an outbound activation request.
    #[error("audio server request failed: {0}")]
    Server(String),

    #[error("failed to read config {path:?}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {reason}")]
    ConfigInvalid { reason: String },

    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to show notification")]
    Notification(#[from] notify_rust::error::Error),
}
