//! Connection profiles: the settings maps NetworkManager stores per network,
//! with helpers for the secret-valued properties the applet manages.

mod dbus;
mod matching;
/// Setting names and secret property tables
pub mod names;
mod store;
mod value;

#[cfg(test)]
mod tests;

use std::{collections::BTreeMap, fmt};

pub use dbus::{secrets_to_dbus, wipe_secrets};
pub use matching::profile_applies_to;
pub use store::{ConnectionStore, DbusConnectionStore, MemoryConnectionStore};
pub use value::SettingValue;

use crate::services::{common::ObjectPath, network_manager::NMSettingSecretFlags};
use names::{CONNECTION, VPN};

/// One setting of a profile: property name -> value.
pub type Setting = BTreeMap<String, SettingValue>;

/// Secrets of one setting: property (or VPN secret) name -> value.
pub type SecretsMap = BTreeMap<String, SettingValue>;

/// Secrets of a whole profile: setting name -> secrets.
pub type ConnectionSecrets = BTreeMap<String, SecretsMap>;

/// A secret found on a profile, with the flags controlling who stores it.
#[derive(Clone, PartialEq)]
pub struct SecretEntry<'a> {
    /// Setting the secret belongs to.
    pub setting: &'a str,
    /// Property name, or the VPN secret name for VPN profiles.
    pub key: &'a str,
    /// The secret value.
    pub value: &'a str,
    /// Storage flags of the secret.
    pub flags: NMSettingSecretFlags,
}

/// A connection profile.
///
/// Besides the settings exchanged with the daemon, a profile carries
/// applet-private tags (such as private key file paths) that are never sent
/// over the bus.
#[derive(Clone, PartialEq, Default)]
pub struct Connection {
    path: Option<ObjectPath>,
    settings: BTreeMap<String, Setting>,
    private: BTreeMap<String, String>,
}

impl Connection {
    /// Create an empty profile, optionally bound to its settings object path.
    pub fn new(path: Option<ObjectPath>) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    /// Create a profile with the mandatory `connection` setting filled in.
    pub fn with_identity(uuid: &str, id: &str, connection_type: &str) -> Self {
        let mut connection = Self::default();
        connection.set(CONNECTION, "uuid", SettingValue::from(uuid));
        connection.set(CONNECTION, "id", SettingValue::from(id));
        connection.set(CONNECTION, "type", SettingValue::from(connection_type));
        connection
    }

    /// Settings object path of the profile, if it is known to the daemon.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Bind the profile to a settings object path.
    pub fn set_path(&mut self, path: Option<ObjectPath>) {
        self.path = path;
    }

    /// UUID of the profile.
    pub fn uuid(&self) -> Option<&str> {
        self.string(CONNECTION, "uuid")
    }

    /// Human readable name of the profile.
    pub fn id(&self) -> Option<&str> {
        self.string(CONNECTION, "id")
    }

    /// Base type of the profile, which is also the name of its primary setting.
    pub fn connection_type(&self) -> Option<&str> {
        self.string(CONNECTION, "type")
    }

    /// Whether the profile is a VPN, whose secrets are handled by a plugin helper.
    pub fn is_vpn(&self) -> bool {
        self.connection_type() == Some(VPN)
    }

    /// D-Bus service name of the VPN plugin for VPN profiles.
    pub fn vpn_service_type(&self) -> Option<&str> {
        self.string(VPN, "service-type")
    }

    /// All settings of the profile.
    pub fn settings(&self) -> &BTreeMap<String, Setting> {
        &self.settings
    }

    /// A single setting of the profile.
    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.get(name)
    }

    /// Whether the profile has the named setting.
    pub fn has_setting(&self, name: &str) -> bool {
        self.settings.contains_key(name)
    }

    /// Replace a whole setting.
    pub fn insert_setting(&mut self, name: impl Into<String>, setting: Setting) {
        self.settings.insert(name.into(), setting);
    }

    /// Value of a property.
    pub fn get(&self, setting: &str, key: &str) -> Option<&SettingValue> {
        self.settings.get(setting).and_then(|s| s.get(key))
    }

    /// String value of a property.
    pub fn string(&self, setting: &str, key: &str) -> Option<&str> {
        self.get(setting, key).and_then(SettingValue::as_str)
    }

    /// Set a property, creating the setting if needed.
    pub fn set(&mut self, setting: &str, key: &str, value: SettingValue) {
        self.settings
            .entry(setting.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
    }

    /// Applet-private tag value.
    pub fn private_value(&self, tag: &str) -> Option<&str> {
        self.private.get(tag).map(String::as_str)
    }

    /// Set an applet-private tag.
    pub fn set_private_value(&mut self, tag: &str, value: impl Into<String>) {
        self.private.insert(tag.to_owned(), value.into());
    }

    /// Storage flags of a secret.
    ///
    /// Missing flags mean the secret is system-owned. VPN secret flags are
    /// kept as strings in the `data` map of the `vpn` setting.
    pub fn secret_flags(&self, setting: &str, key: &str) -> NMSettingSecretFlags {
        if setting == VPN {
            let flags_key = format!("{key}-flags");
            return self
                .get(VPN, "data")
                .and_then(SettingValue::as_str_map)
                .and_then(|data| data.get(&flags_key))
                .and_then(|raw| raw.parse::<u32>().ok())
                .map(NMSettingSecretFlags::from_bits_truncate)
                .unwrap_or_default();
        }

        let flags_key = names::secret_properties(setting)
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.flags_key);

        flags_key
            .and_then(|flags_key| self.get(setting, flags_key))
            .and_then(SettingValue::as_u32)
            .map(NMSettingSecretFlags::from_bits_truncate)
            .unwrap_or_default()
    }

    /// Whether a setting must always be prompted for.
    ///
    /// True if any of its secret fields is flagged `NOT_SAVED`, whether or
    /// not a value is currently present.
    pub fn is_always_ask(&self, setting: &str) -> bool {
        if !self.has_setting(setting) {
            return false;
        }

        if setting == VPN {
            return self
                .get(VPN, "data")
                .and_then(SettingValue::as_str_map)
                .is_some_and(|data| {
                    data.iter()
                        .filter(|(key, _)| key.ends_with("-flags"))
                        .filter_map(|(_, raw)| raw.parse::<u32>().ok())
                        .any(|raw| {
                            NMSettingSecretFlags::from_bits_truncate(raw)
                                .contains(NMSettingSecretFlags::NOT_SAVED)
                        })
                });
        }

        names::secret_properties(setting).iter().any(|property| {
            self.secret_flags(setting, property.key)
                .contains(NMSettingSecretFlags::NOT_SAVED)
        })
    }

    /// Every non-empty string secret on the profile.
    pub fn secret_entries(&self) -> Vec<SecretEntry<'_>> {
        let mut entries = Vec::new();

        for (setting_name, setting) in &self.settings {
            if setting_name == VPN {
                let Some(secrets) = setting.get("secrets").and_then(SettingValue::as_str_map)
                else {
                    continue;
                };
                entries.extend(secrets.iter().filter(|(_, v)| !v.is_empty()).map(
                    |(key, value)| SecretEntry {
                        setting: setting_name,
                        key,
                        value,
                        flags: self.secret_flags(VPN, key),
                    },
                ));
                continue;
            }

            for property in names::secret_properties(setting_name) {
                let Some(value) = setting.get(property.key).and_then(SettingValue::as_str) else {
                    continue;
                };
                if value.is_empty() {
                    continue;
                }
                entries.push(SecretEntry {
                    setting: setting_name,
                    key: property.key,
                    value,
                    flags: self.secret_flags(setting_name, property.key),
                });
            }
        }

        entries
    }

    /// Secrets currently present in one setting, shaped the way the daemon
    /// expects them back from GetSecrets.
    pub fn secrets_for(&self, setting: &str) -> SecretsMap {
        let Some(values) = self.settings.get(setting) else {
            return SecretsMap::new();
        };

        if setting == VPN {
            return values
                .get("secrets")
                .map(|secrets| SecretsMap::from([("secrets".to_owned(), secrets.clone())]))
                .unwrap_or_default();
        }

        names::secret_properties(setting)
            .iter()
            .filter_map(|p| values.get(p.key).map(|v| (p.key.to_owned(), v.clone())))
            .collect()
    }

    /// Copy secrets into a setting so a prompt can pre-populate its fields.
    ///
    /// For VPN profiles, plain secret names are merged into the `secrets` map.
    pub fn stage_secrets(&mut self, setting: &str, secrets: &SecretsMap) {
        if setting == VPN {
            let mut merged = self
                .get(VPN, "secrets")
                .and_then(SettingValue::as_str_map)
                .cloned()
                .unwrap_or_default();

            for (key, value) in secrets {
                match (key.as_str(), value) {
                    ("secrets", SettingValue::StrMap(map)) => {
                        merged.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
                    }
                    (_, SettingValue::Str(value)) => {
                        merged.insert(key.clone(), value.clone());
                    }
                    _ => {}
                }
            }

            self.set(VPN, "secrets", SettingValue::StrMap(merged));
            return;
        }

        for (key, value) in secrets {
            self.set(setting, key, value.clone());
        }
    }

    /// Wipe every secret value held by this profile.
    pub fn clear_secrets(&mut self) {
        for (setting_name, setting) in self.settings.iter_mut() {
            if setting_name == VPN {
                if let Some(mut secrets) = setting.remove("secrets") {
                    secrets.wipe();
                }
                continue;
            }

            for property in names::secret_properties(setting_name) {
                if let Some(mut value) = setting.remove(property.key) {
                    value.wipe();
                }
            }
        }
    }

    /// A copy of the profile with every secret removed, as handed to the
    /// profile store.
    pub fn without_secrets(&self) -> Self {
        let mut copy = self.clone();
        copy.clear_secrets();
        copy
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("path", &self.path)
            .field("uuid", &self.uuid())
            .field("id", &self.id())
            .field("type", &self.connection_type())
            .field("settings", &self.settings.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
