//! NetworkManager Settings interfaces.

use zbus::{proxy, zvariant::OwnedObjectPath};

use super::NMConnectionSettings;

/// Connection profile storage.
#[proxy(
    default_service = "org.freedesktop.NetworkManager",
    interface = "org.freedesktop.NetworkManager.Settings",
    default_path = "/org/freedesktop/NetworkManager/Settings"
)]
pub trait Settings {
    /// List the saved network connections known to NetworkManager.
    fn list_connections(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    /// Add a new connection and save it to disk.
    fn add_connection(&self, connection: NMConnectionSettings) -> zbus::Result<OwnedObjectPath>;

    /// Retrieve the object path of a connection, given that connection's UUID.
    fn get_connection_by_uuid(&self, uuid: &str) -> zbus::Result<OwnedObjectPath>;

    /// Emitted when a new connection has been added.
    #[zbus(signal)]
    fn new_connection(&self, connection: OwnedObjectPath) -> zbus::Result<()>;

    /// Emitted when a connection is no longer available.
    #[zbus(signal)]
    fn connection_removed(&self, connection: OwnedObjectPath) -> zbus::Result<()>;
}

/// A single saved connection profile.
#[proxy(
    default_service = "org.freedesktop.NetworkManager",
    interface = "org.freedesktop.NetworkManager.Settings.Connection"
)]
pub trait SettingsConnection {
    /// Update the connection with new settings and properties, replacing all
    /// previous settings and properties, and save it to disk.
    fn update(&self, properties: NMConnectionSettings) -> zbus::Result<()>;

    /// Delete the connection.
    fn delete(&self) -> zbus::Result<()>;

    /// Get the settings maps describing this network configuration, without secrets.
    fn get_settings(&self) -> zbus::Result<NMConnectionSettings>;

    /// Emitted when any settings property of the connection changes.
    #[zbus(signal)]
    fn updated(&self) -> zbus::Result<()>;
}
