use thiserror::Error;

use crate::keyfile::KeyfileError;
use crate::settings::SettingsError;
use crate::store::StoreError;
use crate::types::GrammarError;

/// Error types for the netprofile crate.
///
/// Wraps the per-area errors so callers that do not care which layer
/// failed can work with a single type.
#[derive(Error, Debug)]
pub enum NetprofileError {
    /// The keyfile store rejected its input
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The settings model rejected an operation
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The codec aborted a read or write
    #[error(transparent)]
    Keyfile(#[from] KeyfileError),

    /// One of the domain value grammars rejected its input
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for netprofile operations.
pub type Result<T> = std::result::Result<T, NetprofileError>;
