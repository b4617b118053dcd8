//! NetworkManager Device interfaces.

use zbus::{proxy, zvariant::OwnedObjectPath};

/// Generic device properties shared by every device type.
#[proxy(
    default_service = "org.freedesktop.NetworkManager",
    interface = "org.freedesktop.NetworkManager.Device"
)]
pub trait Device {
    /// The name of the device's control interface.
    #[zbus(property)]
    fn interface(&self) -> zbus::Result<String>;

    /// The general type of the network device (NMDeviceType).
    #[zbus(property)]
    fn device_type(&self) -> zbus::Result<u32>;

    /// The hardware address of the device.
    #[zbus(property)]
    fn hw_address(&self) -> zbus::Result<String>;
}

/// Wireless device.
#[proxy(
    default_service = "org.freedesktop.NetworkManager",
    interface = "org.freedesktop.NetworkManager.Device.Wireless"
)]
pub trait DeviceWireless {
    /// List of object paths of every access point visible to this device,
    /// including hidden ones.
    fn get_all_access_points(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    /// The active hardware address of the device.
    #[zbus(property)]
    fn hw_address(&self) -> zbus::Result<String>;

    /// Object path of the access point currently used by the device.
    #[zbus(property)]
    fn active_access_point(&self) -> zbus::Result<OwnedObjectPath>;

    /// The capabilities of the wireless device (NMDeviceWifiCapabilities).
    #[zbus(property)]
    fn wireless_capabilities(&self) -> zbus::Result<u32>;

    /// Emitted when a new access point is found by the device.
    #[zbus(signal)]
    fn access_point_added(&self, access_point: OwnedObjectPath) -> zbus::Result<()>;

    /// Emitted when an access point disappears from view of the device.
    #[zbus(signal)]
    fn access_point_removed(&self, access_point: OwnedObjectPath) -> zbus::Result<()>;
}
