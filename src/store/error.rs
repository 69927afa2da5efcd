use thiserror::Error;

/// Error types for keyfile store operations.
///
/// Covers both parsing a keyfile from text and resolving typed values
/// out of an already-loaded store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A line could not be parsed as a group header, key/value pair or comment
    #[error("parse error on line {line}: {details}")]
    Parse {
        /// 1-based line number of the offending input line
        line: usize,
        /// What was wrong with the line
        details: String,
    },

    /// The requested group does not exist
    #[error("group '{0}' not found")]
    GroupNotFound(String),

    /// The requested key does not exist within its group
    #[error("key '{key}' not found in group '{group}'")]
    KeyNotFound {
        /// Group that was searched
        group: String,
        /// Key that was not found
        key: String,
    },

    /// A value exists but cannot be interpreted as the requested type
    #[error("invalid value for key '{key}' in group '{group}': {details}")]
    InvalidValue {
        /// Group containing the value
        group: String,
        /// Key holding the value
        key: String,
        /// Why the conversion failed
        details: String,
    },
}

/// A specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
