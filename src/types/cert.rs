//! Certificate and key references.

use std::path::PathBuf;

/// A certificate or private key reference as carried by an 802.1X
/// setting.
///
/// The keyfile text form tags the variant with a scheme prefix
/// (`file://`, `pkcs11:`, `data:;base64,`); a bare path is accepted on
/// read and normalized to the path scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertValue {
    /// An absolute path to a file on disk
    Path(PathBuf),
    /// A PKCS#11 URI, stored verbatim including its `pkcs11:` prefix
    Pkcs11(String),
    /// The raw certificate bytes
    Blob(Vec<u8>),
    /// An unset or unrecognized value; never produced by the reader
    Unknown,
}
