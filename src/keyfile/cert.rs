//! Certificate scheme codec.
//!
//! Certificate values are byte blobs tagged by an ASCII prefix:
//! `file://` for a NUL-terminated path, `pkcs11:` for a token URI and
//! `data:;base64,` for inline data. A bare path is accepted on read,
//! resolved against the reader's base directory and normalized to the
//! path scheme; everything else falls back to a raw blob.

use std::env;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use tracing::debug;

use crate::settings::{Setting, Value};
use crate::store::KeyFile;
use crate::types::CertValue;

use super::reader::ReadContext;
use super::values::{apply, get_bytes, strict_base64_decode};
use super::warn::WarnSeverity;
use super::writer::WriteContext;

/// Scheme prefix of path-valued certificates.
pub const CERT_SCHEME_PATH: &str = "file://";
/// Scheme prefix of PKCS#11 URIs.
pub const CERT_SCHEME_PKCS11: &str = "pkcs11:";
/// Scheme prefix of inline base64 blobs.
pub const CERT_SCHEME_BLOB: &str = "data:;base64,";

/// File suffixes that mark a bare value as a certificate path.
const CERT_EXTENSIONS: &[&str] = &[".pem", ".cert", ".crt", ".cer", ".p12", ".der", ".key"];

/// Longest bare value considered as a possible path.
const CERT_PATH_MAX_LEN: usize = 500;

/// A certificate about to be serialized, offered to the embedder's
/// write handler before the default encoding runs.
#[derive(Debug)]
pub struct CertWriteEvent<'a> {
    /// Canonical name of the setting being written
    pub setting: &'a str,
    /// Property holding the certificate
    pub property: &'a str,
    /// The certificate value
    pub value: &'a CertValue,
}

/// The embedder's answer to a [`CertWriteEvent`].
#[derive(Debug)]
pub enum CertDecision {
    /// The codec applies its default encoding.
    Unhandled,
    /// The handler wrote the value itself; the codec does nothing.
    Handled,
    /// Abort the whole write operation.
    Abort(String),
}

/// Callback intercepting certificate serialization.
pub type CertHandler = dyn FnMut(&CertWriteEvent<'_>, &mut KeyFile) -> CertDecision;

/// Resolves a certificate path against the base directory.
///
/// A relative path contributes only its final component; this matches
/// the historical resolution of values written by other tools.
fn cert_path(base_dir: &Path, path: &str) -> PathBuf {
    if path.starts_with('/') {
        return PathBuf::from(path);
    }
    let base = path.rsplit('/').next().unwrap_or(path);
    base_dir.join(base)
}

fn has_cert_ext(path: &Path) -> bool {
    let Some(text) = path.to_str() else {
        return false;
    };
    CERT_EXTENSIONS.iter().any(|ext| text.ends_with(ext))
}

fn has_scheme_prefix(bin: &[u8], scheme: &str) -> bool {
    bin.len() > scheme.len() + 1
        && bin.last() == Some(&0)
        && bin.starts_with(scheme.as_bytes())
}

/// Decides whether a prefix-less value is a certificate path.
///
/// The value must be 1..=500 bytes of NUL-free UTF-8 (one trailing NUL
/// is tolerated and excluded). It is accepted outright when it contains
/// a `/` or resolves to a name with a certificate extension; otherwise
/// only when the resolved file actually exists. Returns the resolved
/// path and whether it exists.
fn detect_unqualified_path(base_dir: &Path, data: &[u8]) -> Option<(PathBuf, bool)> {
    if data.is_empty() || data.len() > CERT_PATH_MAX_LEN {
        return None;
    }
    let payload = match data.last() {
        Some(0) => &data[..data.len() - 1],
        _ => data,
    };
    if payload.is_empty() || payload.contains(&0) {
        return None;
    }
    let text = std::str::from_utf8(payload).ok()?;

    let path = cert_path(base_dir, text);
    if !text.contains('/') && !has_cert_ext(&path) {
        if !path.exists() {
            return None;
        }
        return Some((path, true));
    }
    let exists = path.exists();
    Some((path, exists))
}

fn utf8_payload<'a>(bin: &'a [u8], scheme: &str) -> Option<&'a str> {
    let payload = &bin[scheme.len()..bin.len() - 1];
    if payload.is_empty() || payload.contains(&0) {
        return None;
    }
    std::str::from_utf8(payload).ok()
}

/// Certificate reader: classifies the blob by scheme prefix and stores
/// the decoded [`CertValue`].
pub(crate) fn cert_parser(ctx: &mut ReadContext<'_>, setting: &mut Setting, key: &str) {
    let Some(bin) = get_bytes(ctx, key, true, false) else {
        if !ctx.aborted() {
            ctx.warn(
                Some(key),
                WarnSeverity::Warn,
                "invalid key/cert value".to_string(),
            );
        }
        return;
    };
    if bin.is_empty() {
        ctx.warn(
            Some(key),
            WarnSeverity::Warn,
            "invalid key/cert value".to_string(),
        );
        return;
    }

    if has_scheme_prefix(&bin, CERT_SCHEME_PATH) {
        let Some(text) = utf8_payload(&bin, CERT_SCHEME_PATH) else {
            ctx.warn(
                Some(key),
                WarnSeverity::Warn,
                format!(
                    "invalid key/cert value path \"{}\"",
                    String::from_utf8_lossy(&bin[..bin.len() - 1])
                ),
            );
            return;
        };

        // Resolve to an absolute path: keyfiles are exchanged between
        // processes that need not share a working directory.
        let path = cert_path(&ctx.base_dir, text);
        let exists = path.exists();
        apply(setting, key, Value::Cert(Some(CertValue::Path(path.clone()))));
        if !exists {
            ctx.warn(
                Some(key),
                WarnSeverity::InfoMissingFile,
                format!(
                    "certificate or key file '{}' does not exist",
                    path.display()
                ),
            );
        }
        return;
    }

    if has_scheme_prefix(&bin, CERT_SCHEME_PKCS11) {
        let total = bin.len() - 1;
        let uri_ok = utf8_payload(&bin, CERT_SCHEME_PKCS11)
            .filter(|_| total <= CERT_SCHEME_PKCS11.len() + CERT_PATH_MAX_LEN)
            .is_some();
        if !uri_ok {
            ctx.warn(
                Some(key),
                WarnSeverity::Warn,
                format!(
                    "invalid PKCS#11 URI \"{}\"",
                    String::from_utf8_lossy(&bin[..bin.len() - 1])
                ),
            );
            return;
        }
        let uri = String::from_utf8_lossy(&bin[..bin.len() - 1]).into_owned();
        apply(setting, key, Value::Cert(Some(CertValue::Pkcs11(uri))));
        return;
    }

    if has_scheme_prefix(&bin, CERT_SCHEME_BLOB) {
        let cdata = &bin[CERT_SCHEME_BLOB.len()..bin.len() - 1];
        let decoded = std::str::from_utf8(cdata)
            .ok()
            .and_then(strict_base64_decode)
            .filter(|d| !d.is_empty());
        let Some(decoded) = decoded else {
            ctx.warn(
                Some(key),
                WarnSeverity::Warn,
                "invalid key/cert value data:;base64, is not base64".to_string(),
            );
            return;
        };
        apply(setting, key, Value::Cert(Some(CertValue::Blob(decoded))));
        return;
    }

    // Might be a bare path without the file:// prefix.
    if let Some((path, exists)) = detect_unqualified_path(&ctx.base_dir, &bin) {
        apply(setting, key, Value::Cert(Some(CertValue::Path(path.clone()))));
        if !exists {
            ctx.warn(
                Some(key),
                WarnSeverity::InfoMissingFile,
                format!(
                    "certificate or key file '{}' does not exist",
                    path.display()
                ),
            );
        }
        return;
    }

    // A blob that *starts* like a scheme but failed its checks would
    // confuse every consumer; refuse it.
    let sans_nul = match bin.last() {
        Some(0) => &bin[..bin.len() - 1],
        _ => &bin[..],
    };
    for scheme in [CERT_SCHEME_PATH, CERT_SCHEME_PKCS11, CERT_SCHEME_BLOB] {
        if sans_nul.starts_with(scheme.as_bytes()) {
            ctx.warn(
                Some(key),
                WarnSeverity::Warn,
                "invalid key/cert value is not a valid blob".to_string(),
            );
            return;
        }
    }

    apply(
        setting,
        key,
        Value::Cert(Some(CertValue::Blob(sans_nul.to_vec()))),
    );
}

/// Certificate writer.
///
/// The embedder's handler may take over; otherwise paths are made
/// absolute and written with the `file://` prefix, blobs as
/// `data:;base64,` and PKCS#11 URIs verbatim.
pub(crate) fn cert_writer(ctx: &mut WriteContext<'_>, setting: &Setting, key: &str, value: &Value) {
    let Value::Cert(Some(cert)) = value else {
        return;
    };

    if ctx.intercept_cert(setting.name(), key, cert) {
        return;
    }

    let group = setting.name();
    match cert {
        CertValue::Path(path) => {
            let absolute = if path.is_absolute() {
                path.clone()
            } else {
                env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("/"))
                    .join(path)
            };
            let text = format!("{CERT_SCHEME_PATH}{}", absolute.display());
            ctx.store.set_string(group, key, &text);
        }
        CertValue::Blob(data) => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(data);
            let text = format!("{CERT_SCHEME_BLOB}{encoded}");
            ctx.store.set_string(group, key, &text);
        }
        CertValue::Pkcs11(uri) => {
            ctx.store.set_string(group, key, uri);
        }
        CertValue::Unknown => {
            debug!("not writing certificate of unknown scheme for '{key}'");
        }
    }
}
