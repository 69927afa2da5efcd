//! The connection profile container.

use super::error::{Result, SettingsError};
use super::schema::{self, SETTING_CONNECTION};
use super::Setting;

/// An ordered collection of settings, unique per setting name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connection {
    settings: Vec<Setting>,
}

impl Connection {
    /// Creates an empty connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a setting, replacing any existing setting of the same name.
    ///
    /// The connection takes ownership; insertion order is preserved for
    /// new names.
    pub fn add_setting(&mut self, setting: Setting) {
        if let Some(existing) = self
            .settings
            .iter_mut()
            .find(|s| s.name() == setting.name())
        {
            *existing = setting;
        } else {
            self.settings.push(setting);
        }
    }

    /// The setting with the given canonical name, if present.
    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.name() == name)
    }

    /// Mutable access to the setting with the given canonical name.
    pub fn setting_mut(&mut self, name: &str) -> Option<&mut Setting> {
        self.settings.iter_mut().find(|s| s.name() == name)
    }

    /// All settings in insertion order.
    pub fn settings(&self) -> impl Iterator<Item = &Setting> {
        self.settings.iter()
    }

    /// Checks the invariants required before the connection may be
    /// serialized.
    ///
    /// A writable connection needs a `connection` setting carrying a
    /// non-empty `id` and `uuid`, and a `type` naming a setting kind
    /// known to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Verify` describing the first violated
    /// invariant.
    pub fn verify(&self) -> Result<()> {
        let base = self.setting(SETTING_CONNECTION).ok_or_else(|| {
            SettingsError::Verify {
                details: "missing 'connection' setting".to_string(),
            }
        })?;

        for required in ["id", "uuid"] {
            if base.string_value(required).is_none_or(str::is_empty) {
                return Err(SettingsError::Verify {
                    details: format!("'connection.{required}' is not set"),
                });
            }
        }

        match base.string_value("type") {
            None => Err(SettingsError::Verify {
                details: "'connection.type' is not set".to_string(),
            }),
            Some(kind) if schema::lookup(kind).is_none() => Err(SettingsError::Verify {
                details: format!("'connection.type' names unknown setting '{kind}'"),
            }),
            Some(_) => Ok(()),
        }
    }
}
