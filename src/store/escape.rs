//! Value and key escaping for the keyfile dialect.
//!
//! Values use backslash escapes for whitespace that would be lost or
//! ambiguous in the text form (`\s`, `\t`, `\n`, `\r`, `\\`). List values
//! additionally escape the `;` separator as `\;`. Keys are restricted to
//! `[A-Za-z0-9-]` on disk; other bytes round-trip through a reversible
//! `\xHH` encoding.

/// Characters a key may contain without encoding.
fn is_plain_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// Encodes a property name for use as a keyfile key.
///
/// Bytes outside `[A-Za-z0-9-]` (including the backslash itself) are
/// written as `\xHH` with lowercase hex digits. The result contains only
/// plain key characters and backslash escapes, and [`key_decode`] is its
/// exact inverse.
pub fn key_encode(name: &str) -> String {
    if name.chars().all(is_plain_key_char) {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len() * 2);
    for b in name.bytes() {
        let c = b as char;
        if is_plain_key_char(c) {
            out.push(c);
        } else {
            out.push_str(&format!("\\x{b:02x}"));
        }
    }
    out
}

/// Decodes a keyfile key back into the property name it encodes.
///
/// Unrecognized or truncated escapes are kept verbatim so that decoding
/// never fails on hand-edited files.
pub fn key_decode(key: &str) -> String {
    if !key.contains('\\') {
        return key.to_string();
    }

    let bytes = key.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1] == b'x'
            && bytes[i + 2].is_ascii_hexdigit()
            && bytes[i + 3].is_ascii_hexdigit()
        {
            let hex = std::str::from_utf8(&bytes[i + 2..i + 4]).unwrap_or("00");
            out.push(u8::from_str_radix(hex, 16).unwrap_or(0));
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Unescapes a raw value into its in-memory string form.
///
/// Handles `\s`, `\t`, `\n`, `\r` and `\\`. Unknown escape sequences are
/// preserved verbatim (backslash included); list-aware callers rely on
/// this to see `\;` untouched.
pub fn unescape_value(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Escapes a string into its raw on-disk form.
///
/// Leading spaces, tabs and line breaks are escaped so the value survives
/// whitespace trimming; embedded backslashes are doubled.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut leading = true;
    for c in value.chars() {
        match c {
            ' ' if leading => out.push_str("\\s"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            _ => {
                leading = false;
                out.push(c);
            }
        }
        if c != ' ' {
            leading = false;
        }
    }
    out
}

/// Escapes a single list element, additionally protecting the separator.
pub fn escape_list_element(value: &str) -> String {
    escape_value(value).replace(';', "\\;")
}

/// Splits a raw list value at unescaped `;` separators.
///
/// Escaped separators (`\;`) are kept inside their element and unescaped
/// along with the standard sequences. A trailing separator does not
/// produce an empty final element.
pub fn split_list(raw: &str) -> Vec<String> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(&next) = chars.peek() {
                    current.push('\\');
                    current.push(next);
                    chars.next();
                } else {
                    current.push('\\');
                }
            }
            ';' => {
                elements.push(std::mem::take(&mut current));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        elements.push(current);
    }

    elements
        .into_iter()
        .map(|e| unescape_value(&e.replace("\\;", ";")))
        .collect()
}
