//! NetworkManager Agent Manager interface.

use zbus::proxy;

/// Secret Agent Manager.
///
/// Manages secret agents that provide secrets to NetworkManager.
#[proxy(
    default_service = "org.freedesktop.NetworkManager",
    interface = "org.freedesktop.NetworkManager.AgentManager",
    default_path = "/org/freedesktop/NetworkManager/AgentManager"
)]
pub trait AgentManager {
    /// Like Register() but indicates agent capabilities to NetworkManager.
    ///
    /// # Arguments
    /// * `identifier` - Identifies this agent; only one agent in each user session may use the same identifier.
    /// * `capabilities` - NMSecretAgentCapabilities flags
    fn register_with_capabilities(&self, identifier: &str, capabilities: u32) -> zbus::Result<()>;

    /// Called by secret Agents to notify NetworkManager that they will no longer handle requests for network secrets.
    fn unregister(&self) -> zbus::Result<()>;
}
