use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use zbus::{Connection as DbusConnection, zvariant::OwnedObjectPath};

use super::Connection;
use crate::services::network_manager::{NetworkError, SettingsConnectionProxy, SettingsProxy};

/// Saved connection profiles.
///
/// Profiles handed to `save` never carry secrets.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Every saved profile.
    ///
    /// # Errors
    /// Returns error if the backing store cannot be read.
    async fn list(&self) -> Result<Vec<Connection>, NetworkError>;

    /// Look a profile up by UUID or settings object path.
    ///
    /// # Errors
    /// Returns error if the backing store cannot be read.
    async fn get_by_uuid_or_path(&self, id: &str) -> Result<Option<Connection>, NetworkError>;

    /// Create or replace a profile.
    ///
    /// # Errors
    /// Returns error if the profile cannot be written.
    async fn save(&self, connection: &Connection) -> Result<(), NetworkError>;

    /// Delete a profile.
    ///
    /// # Errors
    /// Returns `NetworkError::ProfileNotFound` if the profile does not exist.
    async fn delete(&self, connection: &Connection) -> Result<(), NetworkError>;
}

/// In-process profile store.
#[derive(Debug, Default)]
pub struct MemoryConnectionStore {
    connections: RwLock<Vec<Connection>>,
}

impl MemoryConnectionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given profiles, stripped of secrets.
    pub fn with_connections(connections: impl IntoIterator<Item = Connection>) -> Self {
        let connections = connections.into_iter().map(|c| c.without_secrets()).collect();
        Self {
            connections: RwLock::new(connections),
        }
    }

    fn matches(connection: &Connection, id: &str) -> bool {
        connection.uuid() == Some(id) || connection.path() == Some(id)
    }
}

#[async_trait]
impl ConnectionStore for MemoryConnectionStore {
    async fn list(&self) -> Result<Vec<Connection>, NetworkError> {
        Ok(self.connections.read().await.clone())
    }

    async fn get_by_uuid_or_path(&self, id: &str) -> Result<Option<Connection>, NetworkError> {
        Ok(self
            .connections
            .read()
            .await
            .iter()
            .find(|c| Self::matches(c, id))
            .cloned())
    }

    async fn save(&self, connection: &Connection) -> Result<(), NetworkError> {
        let stored = connection.without_secrets();
        let uuid = stored
            .uuid()
            .ok_or_else(|| NetworkError::ProfileNotFound("<missing uuid>".to_string()))?
            .to_owned();

        let mut connections = self.connections.write().await;
        match connections.iter_mut().find(|c| c.uuid() == Some(uuid.as_str())) {
            Some(existing) => *existing = stored,
            None => connections.push(stored),
        }

        debug!(uuid = %uuid, "Saved profile");
        Ok(())
    }

    async fn delete(&self, connection: &Connection) -> Result<(), NetworkError> {
        let uuid = connection.uuid().unwrap_or_default();
        let mut connections = self.connections.write().await;
        let before = connections.len();
        connections.retain(|c| c.uuid() != Some(uuid));

        if connections.len() == before {
            return Err(NetworkError::ProfileNotFound(uuid.to_string()));
        }
        Ok(())
    }
}

/// Profiles stored by the daemon's settings service.
#[derive(Debug, Clone)]
pub struct DbusConnectionStore {
    connection: DbusConnection,
}

impl DbusConnectionStore {
    /// Create a store talking to the daemon over `connection`.
    pub fn new(connection: DbusConnection) -> Self {
        Self { connection }
    }

    async fn load(&self, path: OwnedObjectPath) -> Result<Connection, NetworkError> {
        let proxy = SettingsConnectionProxy::new(&self.connection, path.clone()).await?;
        let settings = proxy
            .get_settings()
            .await
            .map_err(|e| NetworkError::OperationFailed {
                operation: "get_settings",
                reason: e.to_string(),
            })?;
        Ok(Connection::from_dbus(Some(path.to_string()), settings))
    }
}

#[async_trait]
impl ConnectionStore for DbusConnectionStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Connection>, NetworkError> {
        let settings = SettingsProxy::new(&self.connection).await?;
        let paths = settings.list_connections().await?;

        let mut connections = Vec::with_capacity(paths.len());
        for path in paths {
            match self.load(path.clone()).await {
                Ok(connection) => connections.push(connection),
                Err(e) => debug!(path = %path, error = %e, "Skipping unreadable profile"),
            }
        }
        Ok(connections)
    }

    async fn get_by_uuid_or_path(&self, id: &str) -> Result<Option<Connection>, NetworkError> {
        let path = if id.starts_with('/') {
            OwnedObjectPath::try_from(id).map_err(|e| NetworkError::DbusError(e.into()))?
        } else {
            let settings = SettingsProxy::new(&self.connection).await?;
            match settings.get_connection_by_uuid(id).await {
                Ok(path) => path,
                Err(zbus::Error::MethodError(..)) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        };

        match self.load(path).await {
            Ok(connection) => Ok(Some(connection)),
            Err(NetworkError::OperationFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, connection), fields(uuid = ?connection.uuid()))]
    async fn save(&self, connection: &Connection) -> Result<(), NetworkError> {
        let settings = connection.without_secrets().to_dbus()?;

        match connection.path() {
            Some(path) => {
                let proxy = SettingsConnectionProxy::new(&self.connection, path.to_owned()).await?;
                proxy
                    .update(settings)
                    .await
                    .map_err(|e| NetworkError::OperationFailed {
                        operation: "update",
                        reason: e.to_string(),
                    })
            }
            None => {
                let proxy = SettingsProxy::new(&self.connection).await?;
                proxy
                    .add_connection(settings)
                    .await
                    .map(|_| ())
                    .map_err(|e| NetworkError::OperationFailed {
                        operation: "add_connection",
                        reason: e.to_string(),
                    })
            }
        }
    }

    async fn delete(&self, connection: &Connection) -> Result<(), NetworkError> {
        let Some(path) = connection.path() else {
            return Err(NetworkError::ProfileNotFound(
                connection.uuid().unwrap_or_default().to_string(),
            ));
        };

        let proxy = SettingsConnectionProxy::new(&self.connection, path.to_owned()).await?;
        proxy
            .delete()
            .await
            .map_err(|e| NetworkError::OperationFailed {
                operation: "delete",
                reason: e.to_string(),
            })
    }
}
