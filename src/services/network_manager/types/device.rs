//! NetworkManager device types.

/// The subset of NMDeviceType values the applet builds menus for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NMDeviceType {
    /// unknown or unsupported device
    Unknown,
    /// a wired ethernet device
    Ethernet,
    /// an 802.11 Wi-Fi device
    Wifi,
    /// a modem supporting CDMA/EVDO, GSM/UMTS, or LTE network access
    Modem,
}

impl NMDeviceType {
    /// Convert from D-Bus u32 representation
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => Self::Ethernet,
            2 => Self::Wifi,
            8 => Self::Modem,
            _ => Self::Unknown,
        }
    }
}
