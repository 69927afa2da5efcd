//! Scalar value grammar: bounded integers, MAC addresses, byte blobs,
//! strict base64, serial parity and small per-property codecs.
//!
//! Readers accept every historical encoding of a value; writers emit
//! exactly one canonical modern form.

use tracing::debug;

use crate::settings::{
    self, Setting, Value, PARITY_EVEN, PARITY_NONE, PARITY_ODD,
};

use super::reader::ReadContext;
use super::warn::WarnSeverity;
use super::writer::WriteContext;

/// Tokens accepted verbatim for the cloned MAC address property.
const CLONED_MAC_SPECIAL: &[&str] = &["preserve", "permanent", "random", "stable"];

/// Stores a value whose kind is already known to match the descriptor.
///
/// The engines only construct values of the declared kind, so a failure
/// here is a programming error in a codec, not an input problem.
pub(crate) fn apply(setting: &mut Setting, property: &str, value: Value) {
    if let Err(err) = setting.set(property, value) {
        debug!("dropping mistyped codec result: {err}");
    }
}

/// Parses a base-10 number bounded to `[0, max]`.
///
/// With a property name given, failures are reported through the warning
/// pipeline; without one the probe is silent (used when sniffing whether
/// a field could be a metric).
pub(crate) fn get_one_uint(
    ctx: &mut ReadContext<'_>,
    property: Option<&str>,
    input: Option<&str>,
    max: u32,
) -> Option<u32> {
    let input = input.unwrap_or_default();
    if input.is_empty() {
        if let Some(property) = property {
            ctx.warn(
                Some(property),
                WarnSeverity::Warn,
                "ignoring missing number".to_string(),
            );
        }
        return None;
    }

    match input.trim().parse::<u32>() {
        Ok(value) if value <= max => Some(value),
        _ => {
            if let Some(property) = property {
                ctx.warn(
                    Some(property),
                    WarnSeverity::Warn,
                    format!("ignoring invalid number '{input}'"),
                );
            }
            None
        }
    }
}

fn mac_aton(text: &str) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    for part in text.split(':') {
        if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        buf.push(u8::from_str_radix(part, 16).ok()?);
    }
    Some(buf)
}

fn mac_ntoa(bytes: &[u8]) -> String {
    let parts: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
    parts.join(":")
}

/// Reads a MAC address in either the colon-separated hex form or the
/// legacy semicolon-separated integer list, storing the canonical hex
/// form. `enforce_length` of zero accepts any length.
fn mac_address_parser(
    ctx: &mut ReadContext<'_>,
    setting: &mut Setting,
    key: &str,
    enforce_length: usize,
    cloned: bool,
) {
    let group = ctx.group.clone();
    let text = ctx.store.get_string(&group, key);

    if cloned {
        if let Some(t) = &text {
            if CLONED_MAC_SPECIAL.contains(&t.as_str()) {
                apply(setting, key, Value::Str(Some(t.clone())));
                return;
            }
        }
    }

    let mut bytes: Option<Vec<u8>> = None;
    if let Some(t) = &text {
        if !t.is_empty() {
            let fields = t.split(':').count();
            if enforce_length == 0 || enforce_length == fields {
                bytes = mac_aton(t);
            }
        }
    }

    if bytes.is_none() {
        // Old format: list of ints.
        if let Ok(list) = ctx.store.get_i32_list(&group, key) {
            if !list.is_empty() && (enforce_length == 0 || enforce_length == list.len()) {
                let mut buf = Vec::with_capacity(list.len());
                for v in &list {
                    if !(0..=255).contains(v) {
                        ctx.warn(
                            Some(key),
                            WarnSeverity::Warn,
                            format!(
                                "ignoring invalid byte element '{v}' (not between 0 and 255 inclusive)"
                            ),
                        );
                        return;
                    }
                    buf.push(*v as u8);
                }
                bytes = Some(buf);
            }
        }
    }

    let Some(buf) = bytes else {
        ctx.warn(
            Some(key),
            WarnSeverity::Warn,
            "ignoring invalid MAC address".to_string(),
        );
        return;
    };

    apply(setting, key, Value::Str(Some(mac_ntoa(&buf))));
}

/// Ethernet MAC address reader (6 bytes).
pub(crate) fn mac_address_parser_ether(ctx: &mut ReadContext<'_>, setting: &mut Setting, key: &str) {
    mac_address_parser(ctx, setting, key, 6, false);
}

/// Ethernet cloned MAC reader; special tokens pass through verbatim.
pub(crate) fn mac_address_parser_ether_cloned(
    ctx: &mut ReadContext<'_>,
    setting: &mut Setting,
    key: &str,
) {
    mac_address_parser(ctx, setting, key, 6, true);
}

/// InfiniBand MAC address reader (20 bytes).
pub(crate) fn mac_address_parser_infiniband(
    ctx: &mut ReadContext<'_>,
    setting: &mut Setting,
    key: &str,
) {
    mac_address_parser(ctx, setting, key, 20, false);
}

fn parse_int_list_bytes(s: &str) -> Option<Vec<u8>> {
    let b = s.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    loop {
        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        if i == b.len() {
            break;
        }
        if !b[i].is_ascii_digit() {
            return None;
        }
        let mut n = u32::from(b[i] - b'0');
        i += 1;
        for _ in 0..2 {
            if i < b.len() && b[i].is_ascii_digit() {
                n = n * 10 + u32::from(b[i] - b'0');
                i += 1;
            }
        }
        if n > 255 {
            return None;
        }
        out.push(n as u8);
        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        // every element, the last one included, needs its separator
        if i == b.len() || b[i] != b';' {
            return None;
        }
        i += 1;
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Reads a byte blob from a key.
///
/// An empty value is an empty blob, distinct from an absent key. A value
/// that looks like (and reparses as) a semicolon-terminated integer list
/// is decoded from the legacy list form; anything else is taken as raw
/// string bytes, optionally with `\;` unescaped and a trailing NUL
/// appended.
pub(crate) fn get_bytes(
    ctx: &mut ReadContext<'_>,
    key: &str,
    zero_terminate: bool,
    unescape_semicolon: bool,
) -> Option<Vec<u8>> {
    let text = ctx.store.get_string(&ctx.group, key)?;
    if text.is_empty() {
        return Some(Vec::new());
    }

    let may_be_int_list = text
        .bytes()
        .all(|b| b.is_ascii_whitespace() || b.is_ascii_digit() || b == b';');
    if may_be_int_list {
        if let Some(bytes) = parse_int_list_bytes(&text) {
            return Some(bytes);
        }
    }

    let mut s = if unescape_semicolon {
        text.replace("\\;", ";")
    } else {
        text
    };
    if zero_terminate {
        s.push('\0');
    }
    if s.is_empty() {
        return None;
    }
    Some(s.into_bytes())
}

/// Validates and decodes strict base64.
///
/// The length must be a multiple of four, the alphabet is
/// `[A-Za-z0-9+/]`, and `=` padding may only close the value. Anything
/// else is rejected even if a permissive decoder could handle it.
pub(crate) fn strict_base64_decode(data: &str) -> Option<Vec<u8>> {
    use base64::Engine as _;

    if data.len() % 4 != 0 {
        return None;
    }
    let bytes = data.as_bytes();
    for (i, &c) in bytes.iter().enumerate() {
        if c.is_ascii_alphanumeric() || c == b'+' || c == b'/' {
            continue;
        }
        if c != b'=' || i + 2 < bytes.len() {
            return None;
        }
        if !bytes[i..].iter().all(|&p| p == b'=') {
            return None;
        }
        break;
    }

    base64::engine::general_purpose::STANDARD.decode(data).ok()
}

/// SSID reader: byte blob with `\;` unescaping.
pub(crate) fn ssid_parser(ctx: &mut ReadContext<'_>, setting: &mut Setting, key: &str) {
    match get_bytes(ctx, key, false, true) {
        Some(bytes) => apply(setting, key, Value::Bytes(Some(bytes))),
        None => {
            if !ctx.aborted() {
                ctx.warn(
                    Some(key),
                    WarnSeverity::Warn,
                    "ignoring invalid SSID".to_string(),
                );
            }
        }
    }
}

/// SSID writer: a printable SSID becomes a string with `\;`-escaped
/// separators, anything else the legacy integer list.
pub(crate) fn ssid_writer(ctx: &mut WriteContext<'_>, setting: &Setting, key: &str, value: &Value) {
    let Value::Bytes(Some(data)) = value else {
        return;
    };
    let group = setting.name();
    if data.is_empty() {
        ctx.store.set_string(group, key, "");
        return;
    }

    let printable = data.iter().all(|b| (0x20..=0x7e).contains(b));
    if printable {
        let mut raw = String::with_capacity(data.len());
        for &b in data {
            if b == b';' {
                raw.push('\\');
            }
            raw.push(b as char);
        }
        ctx.store.set_value(group, key, &raw);
    } else {
        ctx.store.set_u8_list(group, key, data);
    }
}

/// Raw password reader: byte blob with `\;` unescaping.
pub(crate) fn password_raw_parser(ctx: &mut ReadContext<'_>, setting: &mut Setting, key: &str) {
    match get_bytes(ctx, key, false, true) {
        Some(bytes) => apply(setting, key, Value::Bytes(Some(bytes))),
        None => {
            if !ctx.aborted() {
                ctx.warn(
                    Some(key),
                    WarnSeverity::Warn,
                    "ignoring invalid raw password".to_string(),
                );
            }
        }
    }
}

/// Raw password writer: always the legacy integer list, even when empty.
pub(crate) fn password_raw_writer(
    ctx: &mut WriteContext<'_>,
    setting: &Setting,
    key: &str,
    value: &Value,
) {
    let Value::Bytes(Some(data)) = value else {
        return;
    };
    ctx.store.set_u8_list(setting.name(), key, data);
}

/// Serial parity reader.
///
/// Accepts the historical ASCII-code integer or the single character
/// itself, in either case.
pub(crate) fn parity_parser(ctx: &mut ReadContext<'_>, setting: &mut Setting, key: &str) {
    let group = ctx.group.clone();
    let mut int_val = ctx.store.get_i32(&group, key).unwrap_or(0);
    let mut str_val = None;

    if int_val == 0 {
        if let Some(s) = ctx.store.get_string(&group, key) {
            let mut chars = s.chars();
            int_val = match (chars.next(), chars.next()) {
                (Some(c), None) => c as i32,
                _ => i32::from(b'X'),
            };
            str_val = Some(s);
        }
    }

    if int_val == 0 {
        return;
    }

    let parity = match u8::try_from(int_val).unwrap_or(b'X') {
        b'E' | b'e' => PARITY_EVEN,
        b'O' | b'o' => PARITY_ODD,
        b'N' | b'n' => PARITY_NONE,
        _ => {
            ctx.warn(
                Some(key),
                WarnSeverity::Warn,
                format!("invalid parity value '{}'", str_val.unwrap_or_default()),
            );
            return;
        }
    };
    apply(setting, key, Value::Enum(parity));
}

/// Serial parity writer: always the ASCII-code integer.
pub(crate) fn parity_writer(ctx: &mut WriteContext<'_>, setting: &Setting, key: &str, value: &Value) {
    let Value::Enum(parity) = value else {
        return;
    };
    let code = match *parity {
        PARITY_EVEN => b'E',
        PARITY_ODD => b'o',
        PARITY_NONE => b'n',
        _ => {
            debug!("not writing unknown parity value {parity}");
            return;
        }
    };
    ctx.store.set_i32(setting.name(), key, i32::from(code));
}

/// Reader for properties whose value is itself a setting name: legacy
/// short names are normalized to the canonical name.
pub(crate) fn setting_alias_parser(ctx: &mut ReadContext<'_>, setting: &mut Setting, key: &str) {
    let group = ctx.group.clone();
    let Some(s) = ctx.store.get_string(&group, key) else {
        return;
    };
    let resolved = settings::setting_name_for_alias(&s)
        .map(str::to_string)
        .unwrap_or(s);
    apply(setting, key, Value::Str(Some(resolved)));
}

/// Writer counterpart of [`setting_alias_parser`]: canonical names are
/// written as their short alias where one exists.
pub(crate) fn setting_alias_writer(
    ctx: &mut WriteContext<'_>,
    setting: &Setting,
    key: &str,
    value: &Value,
) {
    let Some(s) = value.as_str() else {
        return;
    };
    let alias = settings::alias_for_setting_name(s).unwrap_or(s);
    ctx.store.set_string(setting.name(), key, alias);
}

/// Team configuration reader: the value must be a JSON object.
pub(crate) fn team_config_parser(ctx: &mut ReadContext<'_>, setting: &mut Setting, key: &str) {
    let group = ctx.group.clone();
    let conf = ctx.store.get_string(&group, key);

    if let Some(c) = &conf {
        if !c.is_empty() && !is_json_object(c) {
            ctx.warn(
                Some(key),
                WarnSeverity::Warn,
                "ignoring invalid team configuration: not a JSON object".to_string(),
            );
            return;
        }
    }

    apply(setting, key, Value::Str(conf));
}

/// Whether a string is a single JSON object (brace- and string-aware
/// scan; the content of the object is not validated further).
pub(crate) fn is_json_object(s: &str) -> bool {
    let trimmed = s.trim();
    if !trimmed.starts_with('{') {
        return false;
    }

    let mut depth = 0u32;
    let mut in_string = false;
    let mut escaped = false;
    let mut closed_at = None;

    for (i, c) in trimmed.char_indices() {
        if closed_at.is_some() {
            return false;
        }
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
                if depth == 0 {
                    closed_at = Some(i);
                }
            }
            c if c.is_whitespace() => {}
            _ if depth > 0 => {}
            _ => return false,
        }
    }

    closed_at.is_some()
}
