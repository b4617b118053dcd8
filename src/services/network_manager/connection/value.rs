use std::{collections::BTreeMap, fmt, sync::Arc};

use zbus::zvariant::OwnedValue;
use zeroize::Zeroize;

/// Value of a single setting property.
///
/// Properties whose wire type the applet never inspects (IP address arrays,
/// routes and the like) are carried untouched in `Raw` so that writing a
/// profile back does not lose them.
#[derive(Clone, PartialEq)]
pub enum SettingValue {
    /// `s`
    Str(String),
    /// `ay`
    Bytes(Vec<u8>),
    /// `u`
    U32(u32),
    /// `b`
    Bool(bool),
    /// `as`
    StrList(Vec<String>),
    /// `a{ss}`
    StrMap(BTreeMap<String, String>),
    /// Any other wire type.
    Raw(Arc<OwnedValue>),
}

impl SettingValue {
    /// The value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// The value as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// The value as an unsigned integer.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(value) => Some(*value),
            _ => None,
        }
    }

    /// The value as a list of strings.
    pub fn as_str_list(&self) -> Option<&[String]> {
        match self {
            Self::StrList(value) => Some(value),
            _ => None,
        }
    }

    /// The value as a string dictionary.
    pub fn as_str_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::StrMap(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the value carries no data.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Str(value) => value.is_empty(),
            Self::Bytes(value) => value.is_empty(),
            Self::StrList(value) => value.is_empty(),
            Self::StrMap(value) => value.is_empty(),
            Self::U32(_) | Self::Bool(_) | Self::Raw(_) => false,
        }
    }

    /// Overwrite any secret material held by the value.
    pub fn wipe(&mut self) {
        match self {
            Self::Str(value) => value.zeroize(),
            Self::Bytes(value) => value.zeroize(),
            Self::StrList(values) => values.iter_mut().for_each(Zeroize::zeroize),
            Self::StrMap(map) => {
                map.values_mut().for_each(Zeroize::zeroize);
                map.clear();
            }
            Self::U32(_) | Self::Bool(_) | Self::Raw(_) => {}
        }
    }
}

impl fmt::Debug for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(_) => f.write_str("Str(..)"),
            Self::Bytes(value) => write!(f, "Bytes({} bytes)", value.len()),
            Self::U32(value) => write!(f, "U32({value})"),
            Self::Bool(value) => write!(f, "Bool({value})"),
            Self::StrList(value) => write!(f, "StrList({} items)", value.len()),
            Self::StrMap(value) => write!(f, "StrMap({:?})", value.keys().collect::<Vec<_>>()),
            Self::Raw(value) => write!(f, "Raw({})", value.value_signature()),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<u8>> for SettingValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        Self::U32(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<BTreeMap<String, String>> for SettingValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self::StrMap(value)
    }
}
