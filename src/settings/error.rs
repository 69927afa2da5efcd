use thiserror::Error;

use super::value::PropertyKind;

/// Error types for the settings model.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// No setting kind with this name exists in the catalog
    #[error("unknown setting '{0}'")]
    UnknownSetting(String),

    /// The setting kind does not declare this property
    #[error("setting '{setting}' has no property '{property}'")]
    UnknownProperty {
        /// Setting that was addressed
        setting: String,
        /// Property that does not exist
        property: String,
    },

    /// A value of the wrong kind was assigned to a property
    #[error("property '{setting}.{property}' expects {expected}, got {found}")]
    KindMismatch {
        /// Setting that was addressed
        setting: String,
        /// Property that was assigned
        property: String,
        /// The property's declared kind
        expected: PropertyKind,
        /// The kind of the rejected value
        found: PropertyKind,
    },

    /// The connection does not satisfy the write-path invariants
    #[error("connection verification failed: {details}")]
    Verify {
        /// What is missing or inconsistent
        details: String,
    },
}

/// A specialized `Result` type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
