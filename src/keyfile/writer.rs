//! Write path: the generic property engine driven by the catalog's
//! property enumeration.

use tracing::debug;

use crate::settings::{
    Connection, PropertyDescriptor, SecretFlags, Setting, Value, SETTING_VPN,
};
use crate::store::{key_encode, KeyFile};
use crate::types::CertValue;

use super::cert::{CertDecision, CertHandler, CertWriteEvent};
use super::dispatch;
use super::error::{KeyfileError, Result};
use super::VPN_SECRETS_GROUP;

/// State shared by everything on the write path.
pub(crate) struct WriteContext<'a> {
    /// The store being built
    pub store: KeyFile,
    cert_handler: Option<&'a mut CertHandler>,
    /// Latched abort error
    pub error: Option<KeyfileError>,
}

impl WriteContext<'_> {
    /// Offers a certificate to the embedder's handler.
    ///
    /// Returns `true` when the handler wrote the value itself or
    /// aborted the operation; `false` means the default encoding should
    /// run.
    pub fn intercept_cert(&mut self, setting: &str, property: &str, value: &CertValue) -> bool {
        let Some(handler) = self.cert_handler.as_deref_mut() else {
            return false;
        };
        let event = CertWriteEvent {
            setting,
            property,
            value,
        };
        match handler(&event, &mut self.store) {
            CertDecision::Unhandled => false,
            CertDecision::Handled => true,
            CertDecision::Abort(message) => {
                self.error = Some(KeyfileError::Vetoed {
                    group: Some(setting.to_string()),
                    property: Some(property.to_string()),
                    message,
                });
                true
            }
        }
    }
}

/// Writes a connection into a fresh keyfile store.
///
/// The connection is verified first; an unverifiable connection is
/// refused outright.
pub(crate) fn write_connection(
    connection: &Connection,
    cert_handler: Option<&mut CertHandler>,
) -> Result<KeyFile> {
    connection.verify()?;

    let mut ctx = WriteContext {
        store: KeyFile::new(),
        cert_handler,
        error: None,
    };

    for setting in connection.settings() {
        for descriptor in setting.schema().properties {
            if ctx.error.is_some() {
                break;
            }
            write_setting_property(&mut ctx, setting, descriptor);
        }
    }

    match ctx.error {
        Some(error) => Err(error),
        None => Ok(ctx.store),
    }
}

/// Writes one property: dispatch override first, then the type-directed
/// default encoding.
fn write_setting_property(
    ctx: &mut WriteContext<'_>,
    setting: &Setting,
    descriptor: &PropertyDescriptor,
) {
    let key = descriptor.name;
    if key == "name" {
        return;
    }

    let info = dispatch::lookup(setting.name(), key);
    if info.is_some_and(|i| i.skip_write) {
        return;
    }

    // Secrets owned by agents or never saved stay out of the file. VPN
    // secrets carry their flags inside the secrets map and are filtered
    // where that map is written.
    if descriptor.secret
        && setting.name() != SETTING_VPN
        && setting.secret_flags(key) != SecretFlags::NONE
    {
        return;
    }

    if setting.is_default(key) && !info.is_some_and(|i| i.persist_default) {
        return;
    }

    let Some(value) = setting.get(key) else {
        return;
    };

    if let Some(writer) = info.and_then(|i| i.writer) {
        writer(ctx, setting, key, value);
        return;
    }

    let group = setting.name();
    match value {
        Value::Str(Some(s)) => ctx.store.set_string(group, key, s),
        Value::Str(None) => {}
        Value::Uint32(v) => ctx.store.set_i32(group, key, *v as i32),
        Value::Int32(v) => ctx.store.set_i32(group, key, *v),
        Value::Int64(v) => ctx.store.set_i64(group, key, *v),
        Value::Uint64(v) => ctx.store.set_u64(group, key, *v),
        Value::Bool(v) => ctx.store.set_bool(group, key, *v),
        Value::Char(v) => ctx.store.set_i32(group, key, i32::from(*v)),
        Value::Bytes(Some(data)) => {
            if !data.is_empty() {
                ctx.store.set_u8_list(group, key, data);
            }
        }
        Value::Bytes(None) => {}
        Value::StringList(list) => ctx.store.set_string_list(group, key, list),
        Value::StringMap(map) => write_hash_of_string(ctx, setting, key, map),
        Value::UintArray(values) => {
            if values.is_empty() {
                return;
            }
            if values.iter().any(|v| *v > i32::MAX as u32) {
                debug!("not writing out-of-range uint array '{group}.{key}'");
                return;
            }
            let ints: Vec<i32> = values.iter().map(|v| *v as i32).collect();
            ctx.store.set_i32_list(group, key, &ints);
        }
        Value::Flags(v) => ctx.store.set_u64(group, key, u64::from(*v)),
        Value::Enum(v) => ctx.store.set_i32(group, key, *v),
        _ => debug!("no generic writer for '{group}.{key}'"),
    }
}

/// Writes a map property key by key.
///
/// VPN secrets go to the reserved `vpn-secrets` group instead of the
/// setting's own group, and individual secrets whose storage flags are
/// not `NONE` are withheld.
fn write_hash_of_string(
    ctx: &mut WriteContext<'_>,
    setting: &Setting,
    key: &str,
    map: &std::collections::BTreeMap<String, String>,
) {
    let vpn_secrets = setting.name() == SETTING_VPN && key == "secrets";
    let group = if vpn_secrets {
        VPN_SECRETS_GROUP
    } else {
        setting.name()
    };

    for (name, value) in map {
        if vpn_secrets && setting.secret_flags(name) != SecretFlags::NONE {
            continue;
        }
        ctx.store.set_string(group, &key_encode(name), value);
    }
}
