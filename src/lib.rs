//! netprofile - a keyfile codec for network connection profiles.
//!
//! This crate translates between INI-style keyfile text and a typed
//! in-memory connection profile: a [`settings::Connection`] holding
//! typed [`settings::Setting`]s. The reader accepts every historical
//! encoding of the format and reports each lenient interpretation as a
//! vetoable warning; the writer emits one canonical modern form.

/// Core types and error handling.
pub mod core;

/// The keyfile reader and writer.
pub mod keyfile;

/// The settings catalog and connection model.
pub mod settings;

/// The low-level INI store.
pub mod store;

/// Domain value types.
pub mod types;

pub use self::core::{NetprofileError, Result};
