use thiserror::Error;

use crate::settings::SettingsError;

/// Error types for keyfile read and write operations.
#[derive(Error, Debug)]
pub enum KeyfileError {
    /// The embedder vetoed a warning; the operation was aborted
    #[error("aborted on warning: {message}")]
    Vetoed {
        /// Group the vetoed warning referred to
        group: Option<String>,
        /// Property the vetoed warning referred to
        property: Option<String>,
        /// The vetoed warning's message
        message: String,
    },

    /// The connection failed verification before writing
    #[error("refusing to write unverified connection")]
    InvalidConnection(#[from] SettingsError),
}

/// A specialized `Result` type for keyfile operations.
pub type Result<T> = std::result::Result<T, KeyfileError>;
