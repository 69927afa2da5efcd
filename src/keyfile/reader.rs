//! Read path: the generic property engine and the setting and
//! connection orchestrators.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::settings::{
    self, Connection, PropertyDescriptor, PropertyKind, Setting, Value, SETTING_BOND,
    SETTING_CONNECTION, SETTING_USER, SETTING_VPN,
};
use crate::store::{self, KeyFile};

use super::dispatch;
use super::error::{KeyfileError, Result};
use super::values::apply;
use super::warn::{Veto, WarnHandler, WarnSeverity, Warning};
use super::{ReadOptions, VPN_SECRETS_GROUP};

/// Fixed namespace for deriving connection UUIDs from strings.
const UUID_NAMESPACE: Uuid = Uuid::from_bytes([
    0xb4, 0x25, 0xe9, 0xfb, 0x75, 0x98, 0x44, 0xb4, 0x9e, 0x3b, 0x5a, 0x2e, 0x3a, 0xaa, 0x49, 0x05,
]);

/// Derives a stable UUID from a list of strings.
///
/// The parts are joined with NUL and hashed into a name-based (v5)
/// UUID, so equal inputs give equal UUIDs on every platform.
pub fn uuid_from_strings(parts: &[&str]) -> String {
    let joined = parts.join("\0");
    Uuid::new_v5(&UUID_NAMESPACE, joined.as_bytes()).to_string()
}

/// State shared by everything on the read path.
///
/// Holds borrowed collaborators and the latched error; scoped to a
/// single top-level read call.
pub(crate) struct ReadContext<'a> {
    /// The store being read
    pub store: &'a KeyFile,
    /// Base directory for resolving relative certificate paths
    pub base_dir: PathBuf,
    /// Group currently being processed
    pub group: String,
    /// Canonical name of the setting currently being processed
    pub setting_name: Option<&'static str>,
    handler: Option<&'a mut WarnHandler>,
    /// Latched abort error; set by the first vetoed warning
    pub error: Option<KeyfileError>,
}

impl<'a> ReadContext<'a> {
    /// Creates a context over a store, positioned at no group.
    pub(crate) fn new(
        store: &'a KeyFile,
        base_dir: PathBuf,
        handler: Option<&'a mut WarnHandler>,
    ) -> Self {
        Self {
            store,
            base_dir,
            group: String::new(),
            setting_name: None,
            handler,
            error: None,
        }
    }

    /// Whether a vetoed warning has aborted the operation.
    pub fn aborted(&self) -> bool {
        self.error.is_some()
    }

    /// Reports a warning through the embedder's handler.
    ///
    /// Returns `true` when processing may continue; `false` latches the
    /// veto error and suppresses all further work.
    pub fn warn(&mut self, property: Option<&str>, severity: WarnSeverity, message: String) -> bool {
        if self.error.is_some() {
            return false;
        }

        match severity {
            WarnSeverity::Warn => warn!("[{}] {message}", self.group),
            _ => debug!("[{}] {message}", self.group),
        }

        let warning = Warning {
            group: Some(self.group.clone()),
            setting: self.setting_name.map(str::to_string),
            property: property.map(str::to_string),
            severity,
            message,
        };

        if let Some(handler) = self.handler.as_deref_mut() {
            if handler(&warning) == Veto::Abort {
                self.error = Some(KeyfileError::Vetoed {
                    group: warning.group,
                    property: warning.property,
                    message: warning.message,
                });
                return false;
            }
        }
        true
    }
}

/// Reads a connection from a keyfile store.
pub(crate) fn read_connection(
    store: &KeyFile,
    options: &ReadOptions,
    handler: Option<&mut WarnHandler>,
) -> Result<Connection> {
    let base_dir = options.base_dir.clone().unwrap_or_else(|| {
        options
            .keyfile_name
            .as_deref()
            .filter(|name| name.is_absolute())
            .and_then(|name| name.parent().map(PathBuf::from))
            .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    });

    let mut ctx = ReadContext::new(store, base_dir, handler);
    let mut connection = Connection::new();
    let mut saw_vpn_secrets = false;

    let groups: Vec<String> = store.groups().map(str::to_string).collect();
    for group in groups {
        // Secrets are only decoded once the vpn setting itself exists.
        if group == VPN_SECRETS_GROUP {
            saw_vpn_secrets = true;
            continue;
        }

        ctx.group = group;
        let setting = read_setting(&mut ctx);
        ctx.group = String::new();
        if let Some(error) = ctx.error.take() {
            return Err(error);
        }
        if let Some(setting) = setting {
            connection.add_setting(setting);
        }
    }

    if connection.setting(SETTING_CONNECTION).is_none() {
        if let Ok(setting) = Setting::by_name(SETTING_CONNECTION) {
            connection.add_setting(setting);
        }
    }

    synthesize_identity(&mut connection, options, store);

    if saw_vpn_secrets {
        read_vpn_secrets(&mut connection, store);
    }

    Ok(connection)
}

/// Fills in `id`, `uuid` and `interface-name` when the keyfile left
/// them out.
fn synthesize_identity(connection: &mut Connection, options: &ReadOptions, store: &KeyFile) {
    let Some(base) = connection.setting_mut(SETTING_CONNECTION) else {
        return;
    };

    if let Some(name) = options.keyfile_name.as_deref() {
        if base.string_value("id").is_none() {
            if let Some(file_name) = name.file_name() {
                let _ = base.set_string("id", file_name.to_string_lossy());
            }
        }
        if base.string_value("uuid").is_none() {
            let uuid = uuid_from_strings(&["keyfile", &name.to_string_lossy()]);
            let _ = base.set_string("uuid", uuid);
        }
    }

    // Deprecated location: interface-name inside the type's own group.
    if base.string_value("interface-name").is_none() {
        if let Some(ctype) = base.string_value("type").map(str::to_string) {
            if let Some(interface_name) = store.get_string(&ctype, "interface-name") {
                let _ = base.set_string("interface-name", interface_name);
            }
        }
    }
}

fn read_vpn_secrets(connection: &mut Connection, store: &KeyFile) {
    let Some(vpn) = connection.setting_mut(SETTING_VPN) else {
        return;
    };
    let keys: Vec<String> = store
        .keys(VPN_SECRETS_GROUP)
        .into_iter()
        .map(str::to_string)
        .collect();
    for key in keys {
        if let Some(secret) = store.get_string(VPN_SECRETS_GROUP, &key) {
            let _ = vpn.insert_map_entry("secrets", key, secret);
        }
    }
}

/// Reads one group into a fresh setting.
///
/// The group name is resolved through the alias table; an unknown name
/// raises a warning and skips the group.
fn read_setting(ctx: &mut ReadContext<'_>) -> Option<Setting> {
    let group = ctx.group.clone();
    let canonical = settings::setting_name_for_alias(&group).unwrap_or(group.as_str());

    let Ok(mut setting) = Setting::by_name(canonical) else {
        ctx.warn(
            None,
            WarnSeverity::Warn,
            format!("invalid setting name '{group}'"),
        );
        return None;
    };

    ctx.setting_name = Some(setting.name());
    for descriptor in setting.schema().properties {
        if ctx.aborted() {
            break;
        }
        read_setting_property(ctx, &mut setting, descriptor);
    }
    ctx.setting_name = None;

    if ctx.aborted() {
        None
    } else {
        Some(setting)
    }
}

/// Reads one property: dispatch override first, then the type-directed
/// default codec.
fn read_setting_property(
    ctx: &mut ReadContext<'_>,
    setting: &mut Setting,
    descriptor: &PropertyDescriptor,
) {
    if !descriptor.writable {
        return;
    }
    let key = descriptor.name;
    if key == "name" {
        return;
    }

    let info = dispatch::lookup(setting.name(), key);
    if info.is_some_and(|i| i.skip_read) {
        return;
    }

    // Most properties map 1:1 to a key; those assembled from several
    // keys (indexed addresses, vf.N, ...) opt out of this check.
    if !info.is_some_and(|i| i.no_check_key) {
        match ctx.store.has_key(&ctx.group, key) {
            Ok(true) => {}
            Ok(false) => return,
            Err(err) => {
                ctx.warn(
                    Some(key),
                    WarnSeverity::Warn,
                    format!("error loading setting value: {err}"),
                );
                return;
            }
        }
    }

    if let Some(reader) = info.and_then(|i| i.reader) {
        reader(ctx, setting, key);
        return;
    }

    let group = ctx.group.clone();
    match descriptor.kind {
        PropertyKind::Str => {
            if let Some(s) = ctx.store.get_string(&group, key) {
                apply(setting, key, Value::Str(Some(s)));
            }
        }
        PropertyKind::Uint32 => {
            let v = ctx.store.get_i32(&group, key).unwrap_or(0);
            if v < 0 {
                ctx.warn(
                    Some(key),
                    WarnSeverity::Warn,
                    format!("invalid negative value ({v})"),
                );
                return;
            }
            apply(setting, key, Value::Uint32(v as u32));
        }
        PropertyKind::Int32 => {
            let v = ctx.store.get_i32(&group, key).unwrap_or(0);
            apply(setting, key, Value::Int32(v));
        }
        PropertyKind::Bool => {
            let v = ctx.store.get_bool(&group, key).unwrap_or(false);
            apply(setting, key, Value::Bool(v));
        }
        PropertyKind::Char => {
            let v = ctx.store.get_i32(&group, key).unwrap_or(0);
            match i8::try_from(v) {
                Ok(c) => apply(setting, key, Value::Char(c)),
                Err(_) => {
                    ctx.warn(
                        Some(key),
                        WarnSeverity::Warn,
                        format!("invalid char value ({v})"),
                    );
                }
            }
        }
        PropertyKind::Uint64 => {
            let raw = ctx.store.get_value(&group, key).unwrap_or_default();
            let v = raw.trim().parse::<u64>().unwrap_or(0);
            apply(setting, key, Value::Uint64(v));
        }
        PropertyKind::Int64 => {
            let raw = ctx
                .store
                .get_value(&group, key)
                .unwrap_or_default()
                .to_string();
            match raw.trim().parse::<i64>() {
                Ok(v) => apply(setting, key, Value::Int64(v)),
                Err(_) => {
                    ctx.warn(
                        Some(key),
                        WarnSeverity::Warn,
                        format!("invalid int64 value ({raw})"),
                    );
                }
            }
        }
        PropertyKind::Bytes => {
            let list = ctx.store.get_i32_list(&group, key).unwrap_or_default();
            let mut bytes = Vec::with_capacity(list.len());
            let mut already_warned = false;
            for v in &list {
                if !(0..=255).contains(v) {
                    if !already_warned
                        && !ctx.warn(
                            Some(key),
                            WarnSeverity::Warn,
                            format!(
                                "ignoring invalid byte element '{v}' (not between 0 and 255 inclusive)"
                            ),
                        )
                    {
                        return;
                    }
                    already_warned = true;
                } else {
                    bytes.push(*v as u8);
                }
            }
            apply(setting, key, Value::Bytes(Some(bytes)));
        }
        PropertyKind::StringList => {
            let list = ctx.store.get_string_list(&group, key).unwrap_or_default();
            apply(setting, key, Value::StringList(list));
        }
        PropertyKind::StringMap => read_hash_of_string(ctx, setting),
        PropertyKind::UintArray => {
            let list = ctx.store.get_i32_list(&group, key).unwrap_or_default();
            if list.iter().any(|v| *v < 0) {
                return;
            }
            let values: Vec<u32> = list.into_iter().map(|v| v as u32).collect();
            apply(setting, key, Value::UintArray(values));
        }
        PropertyKind::Flags => {
            // The store has no direct u32 getter, only u64.
            if let Ok(v) = ctx.store.get_u64(&group, key) {
                match u32::try_from(v) {
                    Ok(bits) => apply(setting, key, Value::Flags(bits)),
                    Err(_) => {
                        ctx.warn(
                            Some(key),
                            WarnSeverity::Warn,
                            format!("too large FLAGS property '{key}' ({v})"),
                        );
                    }
                }
            }
        }
        PropertyKind::Enum => {
            if let Ok(v) = ctx.store.get_i32(&group, key) {
                apply(setting, key, Value::Enum(v));
            }
        }
        _ => {
            ctx.warn(
                Some(key),
                WarnSeverity::Warn,
                format!("unhandled setting property type '{}'", descriptor.kind),
            );
        }
    }
}

/// The setting-kind-aware map codec.
///
/// For the VPN setting every undeclared key becomes a data item; for
/// bond every key except the reserved `interface-name` becomes an
/// option; for the user setting all keys land in the data map through
/// the key decoder. Other settings have no implicit map behavior.
fn read_hash_of_string(ctx: &mut ReadContext<'_>, setting: &mut Setting) {
    let group = ctx.group.clone();
    let keys: Vec<String> = ctx
        .store
        .keys(&group)
        .into_iter()
        .map(str::to_string)
        .collect();
    if keys.is_empty() {
        return;
    }

    let name = setting.name();
    if name == SETTING_VPN || name == SETTING_BOND {
        let is_vpn = name == SETTING_VPN;
        let target = if is_vpn { "data" } else { "options" };
        let mut map = setting
            .get(target)
            .and_then(Value::as_map)
            .cloned()
            .unwrap_or_default();
        for key in keys {
            let Some(value) = ctx.store.get_string(&group, &key) else {
                continue;
            };
            let decoded = store::key_decode(&key);
            if is_vpn {
                if setting.schema().property(&decoded).is_some() {
                    continue;
                }
                map.insert(decoded, value);
            } else if decoded != "interface-name" {
                map.insert(decoded, value);
            }
        }
        apply(setting, target, Value::StringMap(map));
        return;
    }

    if name == SETTING_USER {
        let mut map = BTreeMap::new();
        for key in keys {
            let Some(value) = ctx.store.get_string(&group, &key) else {
                continue;
            };
            map.insert(store::key_decode(&key), value);
        }
        apply(setting, "data", Value::StringMap(map));
    }
}
