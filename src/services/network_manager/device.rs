use tracing::instrument;
use zbus::{Connection, zvariant::OwnedObjectPath};

use crate::{
    services::{
        common::ObjectPath,
        network_manager::{
            DeviceProxy, DeviceWirelessProxy, NMDeviceType, NMDeviceWifiCapabilities,
            NetworkError,
        },
    },
    unwrap_property,
};

/// What profile matching needs to know about a network device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Object path of the device.
    pub path: ObjectPath,
    /// Control interface name, e.g. `wlan0`.
    pub interface: String,
    /// Kind of device.
    pub kind: NMDeviceType,
    /// Permanent hardware address, if known.
    pub hw_address: Option<String>,
    /// Wi-Fi capabilities; empty for non-wireless devices.
    pub wifi_capabilities: NMDeviceWifiCapabilities,
}

impl DeviceInfo {
    /// Describe a Wi-Fi device.
    pub fn wifi(
        path: impl Into<ObjectPath>,
        hw_address: Option<&str>,
        wifi_capabilities: NMDeviceWifiCapabilities,
    ) -> Self {
        Self {
            path: path.into(),
            interface: String::new(),
            kind: NMDeviceType::Wifi,
            hw_address: hw_address.map(str::to_owned),
            wifi_capabilities,
        }
    }

    /// Describe a wired device.
    pub fn ethernet(path: impl Into<ObjectPath>, hw_address: Option<&str>) -> Self {
        Self {
            path: path.into(),
            interface: String::new(),
            kind: NMDeviceType::Ethernet,
            hw_address: hw_address.map(str::to_owned),
            wifi_capabilities: NMDeviceWifiCapabilities::NONE,
        }
    }

    /// Load a device description from the daemon.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::ObjectNotFound` if the device is gone.
    #[instrument(skip(connection), fields(device = %path))]
    pub async fn from_path(
        connection: &Connection,
        path: OwnedObjectPath,
    ) -> Result<Self, NetworkError> {
        let device_proxy = DeviceProxy::new(connection, path.clone()).await?;

        let Ok(device_type) = device_proxy.device_type().await else {
            return Err(NetworkError::ObjectNotFound(path.to_string()));
        };
        let kind = NMDeviceType::from_u32(device_type);
        let interface: String = unwrap_property!(device_proxy.interface().await, "Interface", path);

        let hw_address: String =
            unwrap_property!(device_proxy.hw_address().await, "HwAddress", path);
        let hw_address = (!hw_address.is_empty()).then_some(hw_address);

        let wifi_capabilities = if kind == NMDeviceType::Wifi {
            let wireless = DeviceWirelessProxy::new(connection, path.clone()).await?;
            NMDeviceWifiCapabilities::from_bits_truncate(unwrap_property!(
                wireless.wireless_capabilities().await,
                "WirelessCapabilities",
                path
            ))
        } else {
            NMDeviceWifiCapabilities::NONE
        };

        Ok(Self {
            path: path.to_string(),
            interface,
            kind,
            hw_address,
            wifi_capabilities,
        })
    }
}
