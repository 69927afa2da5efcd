//! The in-memory connection profile model.
//!
//! A [`Connection`] is an ordered collection of [`Setting`]s; a setting
//! is a bag of typed property values described by its static
//! [`SettingSchema`]. The codec constructs settings through the catalog
//! and reads them back property by property.

mod connection;
mod error;
mod schema;
mod secrets;
mod value;

pub use connection::Connection;
pub use error::{Result, SettingsError};
pub use schema::{
    alias_for_setting_name, catalog, lookup, setting_name_for_alias, PropertyDescriptor,
    SettingSchema, ADDR_GEN_MODE_EUI64, ADDR_GEN_MODE_STABLE_PRIVACY, PARITY_EVEN, PARITY_NONE,
    PARITY_ODD, SETTING_BOND, SETTING_CONNECTION, SETTING_IP4, SETTING_IP6, SETTING_USER,
    SETTING_VPN, SETTING_WIRED, SETTING_WIRELESS,
};
pub use secrets::SecretFlags;
pub use value::{PropertyKind, Value};

use std::collections::BTreeMap;

/// A single setting: one named aspect of a connection profile.
///
/// Holds only the values that differ from the schema defaults; reading
/// an untouched property yields its default.
#[derive(Debug, Clone)]
pub struct Setting {
    schema: &'static SettingSchema,
    values: BTreeMap<&'static str, Value>,
}

/// Settings compare by effective property values, so an explicitly
/// assigned default equals an untouched property.
impl PartialEq for Setting {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema)
            && self
                .schema
                .properties
                .iter()
                .all(|p| self.get(p.name) == other.get(p.name))
    }
}

impl Setting {
    /// Creates a fresh setting of the given kind, all properties at
    /// their defaults.
    pub fn new(schema: &'static SettingSchema) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    /// Creates a fresh setting by catalog lookup.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::UnknownSetting` for a name the catalog
    /// does not know.
    pub fn by_name(name: &str) -> Result<Self> {
        schema::lookup(name)
            .map(Self::new)
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_string()))
    }

    /// The setting's canonical name.
    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    /// The setting's schema.
    pub fn schema(&self) -> &'static SettingSchema {
        self.schema
    }

    /// The current value of a property, default included.
    ///
    /// Returns `None` only for properties the schema does not declare.
    pub fn get(&self, property: &str) -> Option<&Value> {
        let descriptor = self.schema.property(property)?;
        Some(self.values.get(descriptor.name).unwrap_or(&descriptor.default))
    }

    /// Sets a property to a new value of its declared kind.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::UnknownProperty` or
    /// `SettingsError::KindMismatch`.
    pub fn set(&mut self, property: &str, value: Value) -> Result<()> {
        let descriptor = self.schema.property(property).ok_or_else(|| {
            SettingsError::UnknownProperty {
                setting: self.schema.name.to_string(),
                property: property.to_string(),
            }
        })?;
        if value.kind() != descriptor.kind {
            return Err(SettingsError::KindMismatch {
                setting: self.schema.name.to_string(),
                property: property.to_string(),
                expected: descriptor.kind,
                found: value.kind(),
            });
        }
        self.values.insert(descriptor.name, value);
        Ok(())
    }

    /// Sets a string property.
    ///
    /// # Errors
    ///
    /// Same contract as [`Setting::set`].
    pub fn set_string(&mut self, property: &str, value: impl Into<String>) -> Result<()> {
        self.set(property, Value::Str(Some(value.into())))
    }

    /// The string held by a string property, if set.
    pub fn string_value(&self, property: &str) -> Option<&str> {
        self.get(property).and_then(Value::as_str)
    }

    /// Whether a property currently equals its declared default.
    pub fn is_default(&self, property: &str) -> bool {
        match self.schema.property(property) {
            Some(descriptor) => match self.values.get(descriptor.name) {
                Some(value) => *value == descriptor.default,
                None => true,
            },
            None => true,
        }
    }

    /// Inserts an entry into a map property, creating the map from its
    /// default if untouched.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::UnknownProperty` for an undeclared
    /// property and `SettingsError::KindMismatch` if it is not a map.
    pub fn insert_map_entry(
        &mut self,
        property: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let current = self.get(property).cloned().ok_or_else(|| {
            SettingsError::UnknownProperty {
                setting: self.schema.name.to_string(),
                property: property.to_string(),
            }
        })?;
        let Value::StringMap(mut map) = current else {
            return Err(SettingsError::KindMismatch {
                setting: self.schema.name.to_string(),
                property: property.to_string(),
                expected: PropertyKind::StringMap,
                found: current.kind(),
            });
        };
        map.insert(key.into(), value.into());
        self.set(property, Value::StringMap(map))
    }

    /// Resolves the storage flags protecting a secret property.
    ///
    /// For the VPN setting the flags live as a `<name>-flags` entry of
    /// the data map; elsewhere they are the companion `<name>-flags`
    /// flags property. Missing companions mean [`SecretFlags::NONE`].
    pub fn secret_flags(&self, property: &str) -> SecretFlags {
        let companion = format!("{property}-flags");

        if self.schema.name == SETTING_VPN {
            let flags = self
                .get("data")
                .and_then(Value::as_map)
                .and_then(|data| data.get(&companion))
                .and_then(|raw| raw.parse::<u32>().ok())
                .unwrap_or(0);
            return SecretFlags::from_bits_truncate(flags);
        }

        match self.get(&companion) {
            Some(Value::Flags(bits)) => SecretFlags::from_bits_truncate(*bits),
            _ => SecretFlags::NONE,
        }
    }
}

#[cfg(test)]
mod tests;
