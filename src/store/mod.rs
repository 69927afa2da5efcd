//! Keyfile-dialect INI store.
//!
//! Provides the low-level group/key container the codec reads from and
//! writes to: ordered groups of ordered `key=value` entries with typed
//! accessors. Semantics follow the classic desktop keyfile dialect:
//! `#` comments, backslash escapes for whitespace, `;`-separated lists
//! with a trailing separator, and booleans spelled `true`/`false`.
//!
//! Duplicate keys are preserved by the parser in file order; the typed
//! getters resolve to the last occurrence. This is implementation-defined
//! behavior that the codec's indexed-key handling depends on.

mod escape;
mod error;

pub use error::{Result, StoreError};

pub use escape::{key_decode, key_encode};
use escape::{escape_list_element, escape_value, split_list, unescape_value};

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    /// Raw (escaped) value as it appears in the text form.
    raw: String,
}

#[derive(Debug, Clone)]
struct Group {
    name: String,
    entries: Vec<Entry>,
}

/// An ordered INI-style key/value store.
///
/// Groups and keys keep their insertion order, which the codec relies on
/// both when enumerating settings and when emitting a stable text form.
#[derive(Debug, Clone, Default)]
pub struct KeyFile {
    groups: Vec<Group>,
}

impl KeyFile {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a store from keyfile text.
    ///
    /// Blank lines and lines starting with `#` are skipped. A key/value
    /// line outside any group, an unterminated group header or a line
    /// without `=` is an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Parse` with the 1-based line number of the
    /// first malformed line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut store = Self::new();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim_start();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let Some(name) = rest.strip_suffix(']') else {
                    return Err(StoreError::Parse {
                        line: line_no,
                        details: "unterminated group header".to_string(),
                    });
                };
                if name.is_empty() || name.contains(['[', ']']) {
                    return Err(StoreError::Parse {
                        line: line_no,
                        details: format!("invalid group name '{name}'"),
                    });
                }
                store.ensure_group(name);
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(StoreError::Parse {
                    line: line_no,
                    details: format!("expected 'key=value', got '{trimmed}'"),
                });
            };
            let key = key.trim_end();
            if key.is_empty() {
                return Err(StoreError::Parse {
                    line: line_no,
                    details: "empty key".to_string(),
                });
            }
            let Some(group) = store.groups.last_mut() else {
                return Err(StoreError::Parse {
                    line: line_no,
                    details: format!("key '{key}' outside of any group"),
                });
            };
            // Duplicates are intentionally kept; getters take the last one.
            group.entries.push(Entry {
                key: key.to_string(),
                raw: value.to_string(),
            });
        }

        Ok(store)
    }

    /// Serializes the store back into keyfile text, in insertion order.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push('[');
            out.push_str(&group.name);
            out.push_str("]\n");
            for entry in &group.entries {
                out.push_str(&entry.key);
                out.push('=');
                out.push_str(&entry.raw);
                out.push('\n');
            }
        }
        out
    }

    /// Enumerates group names in insertion order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// Enumerates the keys of a group in insertion order.
    ///
    /// Duplicate keys appear as often as they occur in the input.
    pub fn keys(&self, group: &str) -> Vec<&str> {
        self.group(group)
            .map(|g| g.entries.iter().map(|e| e.key.as_str()).collect())
            .unwrap_or_default()
    }

    /// Whether a group with the given name exists.
    pub fn has_group(&self, group: &str) -> bool {
        self.group(group).is_some()
    }

    /// Whether a key exists in the given group.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::GroupNotFound` if the group itself is absent,
    /// so callers can distinguish "no such key" from "no such group".
    pub fn has_key(&self, group: &str, key: &str) -> Result<bool> {
        let g = self
            .group(group)
            .ok_or_else(|| StoreError::GroupNotFound(group.to_string()))?;
        Ok(g.entries.iter().any(|e| e.key == key))
    }

    /// Returns the raw (escaped) value of a key, or `None` if absent.
    pub fn get_value(&self, group: &str, key: &str) -> Option<&str> {
        self.group(group)?
            .entries
            .iter()
            .rev()
            .find(|e| e.key == key)
            .map(|e| e.raw.as_str())
    }

    /// Returns the unescaped string value of a key, or `None` if absent.
    ///
    /// Unknown escape sequences (notably `\;`) are preserved verbatim.
    pub fn get_string(&self, group: &str, key: &str) -> Option<String> {
        self.get_value(group, key).map(unescape_value)
    }

    /// Returns a key's value parsed as a 32-bit signed integer.
    ///
    /// # Errors
    ///
    /// `StoreError::KeyNotFound` when absent, `StoreError::InvalidValue`
    /// when present but not an integer.
    pub fn get_i32(&self, group: &str, key: &str) -> Result<i32> {
        let raw = self.require(group, key)?;
        raw.trim()
            .parse()
            .map_err(|_| self.invalid(group, key, "not a 32-bit integer"))
    }

    /// Returns a key's value parsed as a 64-bit signed integer.
    ///
    /// # Errors
    ///
    /// Same contract as [`KeyFile::get_i32`].
    pub fn get_i64(&self, group: &str, key: &str) -> Result<i64> {
        let raw = self.require(group, key)?;
        raw.trim()
            .parse()
            .map_err(|_| self.invalid(group, key, "not a 64-bit integer"))
    }

    /// Returns a key's value parsed as a 64-bit unsigned integer.
    ///
    /// # Errors
    ///
    /// Same contract as [`KeyFile::get_i32`].
    pub fn get_u64(&self, group: &str, key: &str) -> Result<u64> {
        let raw = self.require(group, key)?;
        raw.trim()
            .parse()
            .map_err(|_| self.invalid(group, key, "not an unsigned 64-bit integer"))
    }

    /// Returns a key's value parsed as a boolean (`true`/`false`/`1`/`0`).
    ///
    /// # Errors
    ///
    /// Same contract as [`KeyFile::get_i32`].
    pub fn get_bool(&self, group: &str, key: &str) -> Result<bool> {
        let raw = self.require(group, key)?;
        match raw.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(self.invalid(group, key, "not a boolean")),
        }
    }

    /// Returns a key's value split into a list of unescaped strings.
    pub fn get_string_list(&self, group: &str, key: &str) -> Option<Vec<String>> {
        self.get_value(group, key).map(split_list)
    }

    /// Returns a key's value parsed as a `;`-separated list of integers.
    ///
    /// # Errors
    ///
    /// `StoreError::KeyNotFound` when absent, `StoreError::InvalidValue`
    /// when any element is not an integer.
    pub fn get_i32_list(&self, group: &str, key: &str) -> Result<Vec<i32>> {
        let raw = self.require(group, key)?;
        split_list(raw)
            .iter()
            .map(|e| {
                e.trim()
                    .parse()
                    .map_err(|_| self.invalid(group, key, "list element is not an integer"))
            })
            .collect()
    }

    /// Sets a raw (pre-escaped) value.
    ///
    /// The first existing occurrence of the key is updated in place and
    /// later duplicates are dropped; a new key is appended at the end.
    pub fn set_value(&mut self, group: &str, key: &str, raw: &str) {
        let g = self.ensure_group(group);
        let mut found = false;
        g.entries.retain_mut(|e| {
            if e.key != key {
                return true;
            }
            if found {
                return false;
            }
            found = true;
            e.raw = raw.to_string();
            true
        });
        if !found {
            g.entries.push(Entry {
                key: key.to_string(),
                raw: raw.to_string(),
            });
        }
    }

    /// Sets a string value, escaping it for the text form.
    pub fn set_string(&mut self, group: &str, key: &str, value: &str) {
        self.set_value(group, key, &escape_value(value));
    }

    /// Sets a 32-bit integer value.
    pub fn set_i32(&mut self, group: &str, key: &str, value: i32) {
        self.set_value(group, key, &value.to_string());
    }

    /// Sets a 64-bit signed integer value.
    pub fn set_i64(&mut self, group: &str, key: &str, value: i64) {
        self.set_value(group, key, &value.to_string());
    }

    /// Sets a 64-bit unsigned integer value.
    pub fn set_u64(&mut self, group: &str, key: &str, value: u64) {
        self.set_value(group, key, &value.to_string());
    }

    /// Sets a boolean value.
    pub fn set_bool(&mut self, group: &str, key: &str, value: bool) {
        self.set_value(group, key, if value { "true" } else { "false" });
    }

    /// Sets a string list; elements are escaped and `;`-terminated.
    pub fn set_string_list(&mut self, group: &str, key: &str, values: &[String]) {
        let mut raw = String::new();
        for v in values {
            raw.push_str(&escape_list_element(v));
            raw.push(';');
        }
        self.set_value(group, key, &raw);
    }

    /// Sets an integer list; elements are `;`-terminated.
    pub fn set_i32_list(&mut self, group: &str, key: &str, values: &[i32]) {
        let mut raw = String::new();
        for v in values {
            raw.push_str(&v.to_string());
            raw.push(';');
        }
        self.set_value(group, key, &raw);
    }

    /// Sets a byte list in the legacy integer-list form.
    pub fn set_u8_list(&mut self, group: &str, key: &str, values: &[u8]) {
        let mut raw = String::new();
        for v in values {
            raw.push_str(&v.to_string());
            raw.push(';');
        }
        self.set_value(group, key, &raw);
    }

    fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    fn ensure_group(&mut self, name: &str) -> &mut Group {
        if let Some(idx) = self.groups.iter().position(|g| g.name == name) {
            return &mut self.groups[idx];
        }
        self.groups.push(Group {
            name: name.to_string(),
            entries: Vec::new(),
        });
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    fn require(&self, group: &str, key: &str) -> Result<&str> {
        self.get_value(group, key)
            .ok_or_else(|| StoreError::KeyNotFound {
                group: group.to_string(),
                key: key.to_string(),
            })
    }

    fn invalid(&self, group: &str, key: &str, details: &str) -> StoreError {
        StoreError::InvalidValue {
            group: group.to_string(),
            key: key.to_string(),
            details: details.to_string(),
        }
    }
}

#[cfg(test)]
mod tests;
