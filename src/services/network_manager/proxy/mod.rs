//! D-Bus proxies for the NetworkManager interfaces the applet talks to.

mod access_point;
mod agent_manager;
mod device;
mod manager;
mod settings;

pub use access_point::AccessPointProxy;
pub use agent_manager::AgentManagerProxy;
pub use device::{DeviceProxy, DeviceWirelessProxy};
pub use manager::NetworkManagerProxy;
pub use settings::{SettingsConnectionProxy, SettingsProxy};

/// Wire form of a connection profile: setting name -> property -> value.
pub type NMConnectionSettings =
    std::collections::HashMap<String, std::collections::HashMap<String, zbus::zvariant::OwnedValue>>;
