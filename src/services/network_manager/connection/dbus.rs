use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use tracing::debug;
use zbus::zvariant::{OwnedValue, Value};

use super::{
    Connection, ConnectionSecrets, SettingValue,
    names::{IEEE_8021X, PATH_PHASE2_PRIVATE_KEY_TAG, PATH_PRIVATE_KEY_TAG},
};
use crate::services::network_manager::{NMConnectionSettings, NetworkError};

const PATH_SCHEME_PREFIX: &[u8] = b"file://";

impl Connection {
    /// Build a profile from the daemon's `a{sa{sv}}` settings.
    ///
    /// Private key paths stored with the path scheme are recorded as
    /// applet-private tags so the key loader can find them.
    pub fn from_dbus(path: Option<String>, settings: NMConnectionSettings) -> Self {
        let mut connection = Connection::new(path);

        for (setting_name, properties) in settings {
            let setting = properties
                .into_iter()
                .map(|(key, value)| (key, setting_value_from_owned(value)))
                .collect();
            connection.insert_setting(setting_name, setting);
        }

        for (key, tag) in [
            ("private-key", PATH_PRIVATE_KEY_TAG),
            ("phase2-private-key", PATH_PHASE2_PRIVATE_KEY_TAG),
        ] {
            let file = connection
                .get(IEEE_8021X, key)
                .and_then(SettingValue::as_bytes)
                .and_then(path_scheme_file);
            if let Some(file) = file {
                connection.set_private_value(tag, file);
            }
        }

        connection
    }

    /// Marshal the profile into the daemon's `a{sa{sv}}` form.
    ///
    /// # Errors
    /// Returns `NetworkError::DataConversionFailed` if a value cannot be
    /// converted to its owned wire form.
    pub fn to_dbus(&self) -> Result<NMConnectionSettings, NetworkError> {
        self.settings()
            .iter()
            .map(|(name, setting)| {
                let properties = setting
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), setting_value_to_owned(value)?)))
                    .collect::<Result<HashMap<_, _>, NetworkError>>()?;
                Ok((name.clone(), properties))
            })
            .collect()
    }
}

/// Marshal a secrets reply into `a{sa{sv}}`.
///
/// # Errors
/// Returns `NetworkError::DataConversionFailed` if a value cannot be
/// converted to its owned wire form.
pub fn secrets_to_dbus(secrets: &ConnectionSecrets) -> Result<NMConnectionSettings, NetworkError> {
    secrets
        .iter()
        .map(|(name, values)| {
            let properties = values
                .iter()
                .map(|(key, value)| Ok((key.clone(), setting_value_to_owned(value)?)))
                .collect::<Result<HashMap<_, _>, NetworkError>>()?;
            Ok((name.clone(), properties))
        })
        .collect()
}

/// Overwrite every secret in a reply once it has been marshalled.
pub fn wipe_secrets(secrets: &mut ConnectionSecrets) {
    secrets
        .values_mut()
        .flat_map(|setting| setting.values_mut())
        .for_each(SettingValue::wipe);
}

fn path_scheme_file(blob: &[u8]) -> Option<String> {
    let rest = blob.strip_prefix(PATH_SCHEME_PREFIX)?;
    let rest = rest.strip_suffix(b"\0").unwrap_or(rest);
    if rest.is_empty() {
        return None;
    }
    String::from_utf8(rest.to_vec()).ok()
}

fn setting_value_from_owned(value: OwnedValue) -> SettingValue {
    let signature = value.value_signature().to_string();

    let converted = match signature.as_str() {
        "s" => value.try_clone().ok().and_then(|v| String::try_from(v).ok()).map(SettingValue::Str),
        "u" => u32::try_from(&value).ok().map(SettingValue::U32),
        "b" => bool::try_from(&value).ok().map(SettingValue::Bool),
        "ay" => value
            .try_clone()
            .ok()
            .and_then(|v| Vec::<u8>::try_from(v).ok())
            .map(SettingValue::Bytes),
        "as" => value
            .try_clone()
            .ok()
            .and_then(|v| Vec::<String>::try_from(v).ok())
            .map(SettingValue::StrList),
        "a{ss}" => value
            .try_clone()
            .ok()
            .and_then(|v| HashMap::<String, String>::try_from(v).ok())
            .map(|map| SettingValue::StrMap(map.into_iter().collect::<BTreeMap<_, _>>())),
        _ => None,
    };

    converted.unwrap_or_else(|| {
        debug!(signature = %signature, "Keeping setting value in wire form");
        SettingValue::Raw(Arc::new(value))
    })
}

fn setting_value_to_owned(value: &SettingValue) -> Result<OwnedValue, NetworkError> {
    let to_owned = |value: Value| {
        value
            .try_to_owned()
            .map_err(|e| NetworkError::DataConversionFailed {
                data_type: "setting value".to_string(),
                reason: e.to_string(),
            })
    };

    match value {
        SettingValue::Str(s) => to_owned(Value::from(s.as_str())),
        SettingValue::Bytes(bytes) => to_owned(Value::from(bytes.clone())),
        SettingValue::U32(n) => to_owned(Value::from(*n)),
        SettingValue::Bool(b) => to_owned(Value::from(*b)),
        SettingValue::StrList(list) => to_owned(Value::from(list.clone())),
        SettingValue::StrMap(map) => {
            let map: HashMap<String, String> =
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            to_owned(Value::from(map))
        }
        SettingValue::Raw(raw) => raw
            .try_clone()
            .map_err(|e| NetworkError::DataConversionFailed {
                data_type: "setting value".to_string(),
                reason: e.to_string(),
            }),
    }
}
