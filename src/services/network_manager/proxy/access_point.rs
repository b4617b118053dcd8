//! NetworkManager Access Point interface.

use zbus::proxy;

/// Wi-Fi access point as seen by a wireless device.
#[proxy(
    default_service = "org.freedesktop.NetworkManager",
    interface = "org.freedesktop.NetworkManager.AccessPoint"
)]
pub trait AccessPoint {
    /// Flags describing the capabilities of the access point (NM80211ApFlags).
    #[zbus(property)]
    fn flags(&self) -> zbus::Result<u32>;

    /// WPA information element capabilities (NM80211ApSecurityFlags).
    #[zbus(property)]
    fn wpa_flags(&self) -> zbus::Result<u32>;

    /// RSN information element capabilities (NM80211ApSecurityFlags).
    #[zbus(property)]
    fn rsn_flags(&self) -> zbus::Result<u32>;

    /// The Service Set Identifier, as raw bytes.
    #[zbus(property)]
    fn ssid(&self) -> zbus::Result<Vec<u8>>;

    /// The radio channel frequency in MHz.
    #[zbus(property)]
    fn frequency(&self) -> zbus::Result<u32>;

    /// The hardware address (BSSID) of the access point.
    #[zbus(property)]
    fn hw_address(&self) -> zbus::Result<String>;

    /// The operating mode of the access point (NM80211Mode).
    #[zbus(property)]
    fn mode(&self) -> zbus::Result<u32>;

    /// The current signal quality of the access point, in percent.
    #[zbus(property)]
    fn strength(&self) -> zbus::Result<u8>;
}
