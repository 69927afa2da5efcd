//! The keyfile codec: bidirectional translation between INI-style
//! keyfile text and an in-memory [`Connection`].
//!
//! The read entry point walks every group of a [`KeyFile`] store,
//! obtains a fresh setting from the catalog and drives the generic
//! property engine over its declared properties; a static dispatch
//! table overrides the behavior of properties with custom encodings.
//! The write entry point runs the same machinery in reverse into a
//! fresh store.
//!
//! Lenient acceptance of legacy or quirky input always surfaces as a
//! [`Warning`]; the embedder's handler may veto any warning, which
//! aborts the operation.

mod cert;
mod dispatch;
mod error;
mod ip;
mod reader;
mod sriov;
mod tc;
mod values;
mod warn;
mod writer;

use std::path::PathBuf;

use crate::settings::Connection;
use crate::store::KeyFile;

pub use cert::{
    CertDecision, CertHandler, CertWriteEvent, CERT_SCHEME_BLOB, CERT_SCHEME_PATH,
    CERT_SCHEME_PKCS11,
};
pub use error::{KeyfileError, Result};
pub use reader::uuid_from_strings;
pub use warn::{Veto, WarnHandler, WarnSeverity, Warning};

/// The reserved group holding VPN secrets, kept apart from the `vpn`
/// setting's own group.
pub const VPN_SECRETS_GROUP: &str = "vpn-secrets";

/// Options for [`read_connection`].
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// File the store was loaded from. Used to synthesize a missing
    /// `id` (its basename) and `uuid` (a stable hash of the name), and
    /// as a fallback origin for `base_dir`.
    pub keyfile_name: Option<PathBuf>,
    /// Directory against which relative certificate paths resolve.
    /// Defaults to the directory of an absolute `keyfile_name`, else
    /// the current working directory.
    pub base_dir: Option<PathBuf>,
}

/// Reads a connection from a keyfile store.
///
/// Every group becomes one setting (the reserved [`VPN_SECRETS_GROUP`]
/// is decoded into the VPN setting's secrets at the end); missing
/// identity fields are synthesized from `options.keyfile_name`. The
/// returned connection is intentionally **not** verified; that is the
/// caller's decision.
///
/// # Errors
///
/// Returns [`KeyfileError::Vetoed`] when the handler vetoes a warning.
pub fn read_connection(
    store: &KeyFile,
    options: &ReadOptions,
    handler: Option<&mut WarnHandler>,
) -> Result<Connection> {
    reader::read_connection(store, options, handler)
}

/// Writes a connection into a fresh keyfile store.
///
/// The connection must verify. Properties equal to their default are
/// skipped (unless their dispatch entry persists defaults), secrets
/// with non-`NONE` storage flags are withheld, and VPN secrets go to
/// the reserved [`VPN_SECRETS_GROUP`]. The optional `cert_handler` may
/// intercept certificate serialization.
///
/// # Errors
///
/// Returns [`KeyfileError::InvalidConnection`] when verification fails
/// and [`KeyfileError::Vetoed`] when the certificate handler aborts.
pub fn write_connection(
    connection: &Connection,
    cert_handler: Option<&mut CertHandler>,
) -> Result<KeyFile> {
    writer::write_connection(connection, cert_handler)
}

#[cfg(test)]
mod tests;
