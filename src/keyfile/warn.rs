//! The warning pipeline.
//!
//! Every lenient acceptance or rejection of quirky input surfaces as a
//! [`Warning`] delivered to the embedder's handler. The handler decides
//! whether the operation continues; the first veto latches an error that
//! short-circuits all remaining work.

/// How severe a warning is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnSeverity {
    /// Deprecated but accepted syntax
    Info,
    /// A referenced file does not exist; the value is still accepted
    InfoMissingFile,
    /// A value was discarded or replaced with its default
    Warn,
}

/// A structured warning raised while reading or writing a keyfile.
#[derive(Debug, Clone)]
pub struct Warning {
    /// Keyfile group being processed, if any
    pub group: Option<String>,
    /// Canonical name of the setting being processed, if any
    pub setting: Option<String>,
    /// Property the warning refers to, if any
    pub property: Option<String>,
    /// Severity of the warning
    pub severity: WarnSeverity,
    /// Human-readable description
    pub message: String,
}

/// The embedder's decision about a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Veto {
    /// Keep going; the lenient interpretation stands.
    Continue,
    /// Abort the whole read or write operation.
    Abort,
}

/// Callback invoked for every warning.
pub type WarnHandler = dyn FnMut(&Warning) -> Veto;
