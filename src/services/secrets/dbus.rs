//! The `org.freedesktop.NetworkManager.SecretAgent` bus interface.

use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use zbus::{Connection, interface, zvariant::OwnedObjectPath};

use super::{SecretAgent, SecretsError};
use crate::services::network_manager::{
    AgentManagerProxy, NMConnectionSettings, NMSecretAgentCapabilities,
    NMSecretAgentGetSecretsFlags, NetworkError,
    connection::{Connection as Profile, secrets_to_dbus, wipe_secrets},
};

/// Object path the agent is served at.
pub const SECRET_AGENT_PATH: &str = "/org/freedesktop/NetworkManager/SecretAgent";

/// Errors returned to the daemon.
#[derive(Debug, zbus::DBusError)]
#[zbus(prefix = "org.freedesktop.NetworkManager.SecretAgent")]
pub enum AgentError {
    /// Transport failure.
    #[zbus(error)]
    ZBus(zbus::Error),
    /// The profile was malformed.
    InvalidConnection(String),
    /// The user or the daemon canceled the request.
    UserCanceled(String),
    /// Something unexpected failed.
    InternalError(String),
}

impl From<SecretsError> for AgentError {
    fn from(error: SecretsError) -> Self {
        let message = error.to_string();
        match error {
            SecretsError::UserCanceled => Self::UserCanceled(message),
            SecretsError::InvalidConnection(_) => Self::InvalidConnection(message),
            SecretsError::InternalError { .. } | SecretsError::Keyring(_) => {
                Self::InternalError(message)
            }
        }
    }
}

impl From<NetworkError> for AgentError {
    fn from(error: NetworkError) -> Self {
        Self::InternalError(error.to_string())
    }
}

/// Bus face of a [`SecretAgent`].
#[derive(Debug, Clone)]
pub struct SecretAgentInterface {
    agent: Arc<SecretAgent>,
}

impl SecretAgentInterface {
    /// Serve `agent` on the bus.
    pub fn new(agent: Arc<SecretAgent>) -> Self {
        Self { agent }
    }
}

#[interface(name = "org.freedesktop.NetworkManager.SecretAgent")]
impl SecretAgentInterface {
    async fn get_secrets(
        &self,
        connection: NMConnectionSettings,
        connection_path: OwnedObjectPath,
        setting_name: String,
        hints: Vec<String>,
        flags: u32,
    ) -> Result<NMConnectionSettings, AgentError> {
        let profile = Profile::from_dbus(Some(connection_path.to_string()), connection);
        let flags = NMSecretAgentGetSecretsFlags::from_bits_truncate(flags);

        let mut secrets = self
            .agent
            .on_get_secrets(profile, connection_path.as_str(), &setting_name, hints, flags)
            .wait()
            .await?;

        let reply = secrets_to_dbus(&secrets);
        wipe_secrets(&mut secrets);
        Ok(reply?)
    }

    async fn cancel_get_secrets(&self, connection_path: OwnedObjectPath, setting_name: String) {
        self.agent
            .on_cancel_get_secrets(connection_path.as_str(), &setting_name);
    }

    async fn save_secrets(
        &self,
        connection: NMConnectionSettings,
        connection_path: OwnedObjectPath,
    ) -> Result<(), AgentError> {
        let profile = Profile::from_dbus(Some(connection_path.to_string()), connection);
        self.agent
            .on_save_secrets(profile, connection_path.as_str())
            .wait()
            .await?;
        Ok(())
    }

    async fn delete_secrets(
        &self,
        connection: NMConnectionSettings,
        connection_path: OwnedObjectPath,
    ) -> Result<(), AgentError> {
        let profile = Profile::from_dbus(Some(connection_path.to_string()), connection);
        self.agent
            .on_delete_secrets(profile, connection_path.as_str())
            .wait()
            .await?;
        Ok(())
    }
}

/// Serve the agent and register it with the daemon's agent manager.
///
/// # Errors
///
/// Returns `NetworkError::DbusError` if the object cannot be exported or the
/// daemon refuses the registration.
#[instrument(skip(connection, agent))]
pub async fn register(
    connection: &Connection,
    agent: Arc<SecretAgent>,
    identifier: &str,
) -> Result<(), NetworkError> {
    connection
        .object_server()
        .at(SECRET_AGENT_PATH, SecretAgentInterface::new(agent))
        .await?;

    announce(connection, identifier).await?;
    info!(path = SECRET_AGENT_PATH, "Secret agent registered");
    Ok(())
}

async fn announce(connection: &Connection, identifier: &str) -> Result<(), NetworkError> {
    let manager = AgentManagerProxy::new(connection).await?;
    manager
        .register_with_capabilities(identifier, NMSecretAgentCapabilities::VPN_HINTS.bits())
        .await?;
    Ok(())
}

/// Register again whenever the daemon restarts, until the handle is aborted.
pub async fn watch_daemon_restarts(
    connection: &Connection,
    identifier: &str,
) -> Result<JoinHandle<()>, NetworkError> {
    let manager = AgentManagerProxy::new(connection).await?;
    let mut owner_changes = manager.inner().receive_owner_changed().await?;

    let connection = connection.clone();
    let identifier = identifier.to_owned();
    Ok(tokio::spawn(async move {
        while let Some(owner) = owner_changes.next().await {
            if owner.is_none() {
                debug!("NetworkManager left the bus");
                continue;
            }
            match announce(&connection, &identifier).await {
                Ok(()) => info!("Re-registered secret agent after daemon restart"),
                Err(e) => warn!(error = %e, "Failed to re-register secret agent"),
            }
        }
    }))
}

/// Tell the daemon the agent is going away and stop serving it.
///
/// # Errors
///
/// Returns `NetworkError::DbusError` if the daemon cannot be reached.
pub async fn unregister(connection: &Connection) -> Result<(), NetworkError> {
    let manager = AgentManagerProxy::new(connection).await?;
    manager.unregister().await?;
    connection
        .object_server()
        .remove::<SecretAgentInterface, _>(SECRET_AGENT_PATH)
        .await?;
    Ok(())
}
