//! NetworkManager Wi-Fi types.

/// Indicates the 802.11 mode an access point or device is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NM80211Mode {
    /// the device or access point mode is unknown
    #[default]
    Unknown = 0,
    /// part of an Ad-Hoc 802.11 network without a central coordinating access point.
    Adhoc = 1,
    /// the access point provides connectivity to station clients.
    Infra = 2,
    /// the device is an access point/hotspot. Not valid for access point objects.
    Ap = 3,
    /// the device is a 802.11s mesh point.
    Mesh = 4,
}

impl NM80211Mode {
    /// Convert from D-Bus u32 representation
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => Self::Adhoc,
            2 => Self::Infra,
            3 => Self::Ap,
            4 => Self::Mesh,
            _ => Self::Unknown,
        }
    }

    /// The value a profile's `802-11-wireless.mode` property uses for this
    /// mode, if a profile can pin it.
    pub fn profile_name(self) -> Option<&'static str> {
        match self {
            Self::Infra => Some("infrastructure"),
            Self::Adhoc => Some("adhoc"),
            Self::Ap => Some("ap"),
            Self::Mesh => Some("mesh"),
            Self::Unknown => None,
        }
    }
}
