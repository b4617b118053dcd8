use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, instrument, warn};
use zbus::{
    Connection,
    zvariant::{ObjectPath, OwnedObjectPath, Value},
};
use zeroize::Zeroizing;

use super::{
    Attributes, KeyringError, KeyringItem, SecretStore,
    proxy::{CollectionProxy, ItemProxy, PromptProxy, SecretStruct, ServiceProxy},
};

const NO_PROMPT: &str = "/";
const LABEL_PROPERTY: &str = "org.freedesktop.Secret.Item.Label";
const ATTRIBUTES_PROPERTY: &str = "org.freedesktop.Secret.Item.Attributes";

/// Secret store backed by the session's `org.freedesktop.secrets` daemon.
///
/// Secrets travel over a plain session; new items go into the collection
/// behind the configured alias.
#[derive(Debug, Clone)]
pub struct SecretServiceStore {
    connection: Connection,
    session: OwnedObjectPath,
    collection: OwnedObjectPath,
}

impl SecretServiceStore {
    /// Connect to the session bus keyring and open a session.
    ///
    /// # Errors
    ///
    /// Returns `KeyringError::NoKeyringDaemon` if the session bus or the
    /// keyring daemon is unreachable, and `KeyringError::NoSuchKeyring` if
    /// `alias` names no collection.
    #[instrument]
    pub async fn connect(alias: &str) -> Result<Self, KeyringError> {
        let connection = Connection::session().await.map_err(|e| {
            warn!(error = %e, "Session bus unavailable");
            KeyringError::NoKeyringDaemon
        })?;
        Self::with_connection(connection, alias).await
    }

    /// Open a session on an existing bus connection.
    ///
    /// # Errors
    ///
    /// See [`SecretServiceStore::connect`].
    pub async fn with_connection(
        connection: Connection,
        alias: &str,
    ) -> Result<Self, KeyringError> {
        let service = ServiceProxy::new(&connection).await?;

        let session = service
            .open_session("plain", Value::from(""))
            .await
            .map_err(|e| {
                warn!(error = %e, "Cannot open keyring session");
                KeyringError::NoKeyringDaemon
            })?
            .result;

        let collection = service.read_alias(alias).await?;
        if collection.as_str() == NO_PROMPT {
            return Err(KeyringError::NoSuchKeyring(alias.to_owned()));
        }

        debug!(session = %session, collection = %collection, "Keyring session opened");
        Ok(Self {
            connection,
            session,
            collection,
        })
    }

    async fn run_prompt(&self, prompt: OwnedObjectPath) -> Result<(), KeyringError> {
        if prompt.as_str() == NO_PROMPT {
            return Ok(());
        }

        let proxy = PromptProxy::new(&self.connection, prompt).await?;
        let mut completed = proxy.receive_completed().await?;
        proxy.prompt("").await?;

        let Some(signal) = completed.next().await else {
            return Err(KeyringError::IoError("prompt vanished".to_owned()));
        };
        let args = signal.args()?;
        if args.dismissed {
            return Err(KeyringError::Canceled);
        }

        Ok(())
    }

    async fn unlock(
        &self,
        service: &ServiceProxy<'_>,
        locked: &[OwnedObjectPath],
    ) -> Result<(), KeyringError> {
        if locked.is_empty() {
            return Ok(());
        }

        let objects = locked.iter().map(ObjectPath::from).collect();
        let reply = service.unlock(objects).await?;
        self.run_prompt(reply.prompt).await
    }
}

#[async_trait]
impl SecretStore for SecretServiceStore {
    #[instrument(skip(self))]
    async fn find_items(&self, attributes: &Attributes) -> Result<Vec<KeyringItem>, KeyringError> {
        let service = ServiceProxy::new(&self.connection).await?;

        let query: HashMap<&str, &str> = attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let found = service.search_items(query).await?;

        self.unlock(&service, &found.locked).await?;

        let paths: Vec<ObjectPath<'_>> = found
            .unlocked
            .iter()
            .chain(found.locked.iter())
            .map(ObjectPath::from)
            .collect();
        if paths.is_empty() {
            return Err(KeyringError::NoMatch);
        }

        let secrets = service
            .get_secrets(paths, ObjectPath::from(&self.session))
            .await?;

        let mut items = Vec::with_capacity(secrets.len());
        for (path, secret) in secrets {
            let item = ItemProxy::new(&self.connection, path.clone()).await?;
            let attributes = item.attributes().await?;
            let value = Zeroizing::new(secret.value);
            let Ok(text) = std::str::from_utf8(&value) else {
                warn!(item = %path, "Skipping non UTF-8 secret");
                continue;
            };
            items.push(KeyringItem {
                handle: path.to_string(),
                attributes,
                secret: Zeroizing::new(text.to_owned()),
            });
        }

        Ok(items)
    }

    #[instrument(skip(self, attributes, secret), err)]
    async fn create_item(
        &self,
        label: &str,
        attributes: &Attributes,
        secret: &str,
        replace: bool,
    ) -> Result<(), KeyringError> {
        let collection = CollectionProxy::new(&self.connection, self.collection.clone()).await?;

        if collection.locked().await? {
            let service = ServiceProxy::new(&self.connection).await?;
            self.unlock(&service, std::slice::from_ref(&self.collection)).await?;
        }

        let item_attributes: HashMap<&str, &str> = attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let properties = HashMap::from([
            (LABEL_PROPERTY, Value::from(label)),
            (ATTRIBUTES_PROPERTY, Value::from(item_attributes)),
        ]);

        let secret = SecretStruct {
            session: self.session.clone(),
            parameters: Vec::new(),
            value: secret.as_bytes().to_vec(),
            content_type: "text/plain".to_owned(),
        };

        let created = collection.create_item(properties, secret, replace).await?;
        self.run_prompt(created.prompt).await
    }

    #[instrument(skip(self), err)]
    async fn delete_item(&self, handle: &str) -> Result<(), KeyringError> {
        let path = OwnedObjectPath::try_from(handle)
            .map_err(|e| KeyringError::BadArguments(e.to_string()))?;

        let item = ItemProxy::new(&self.connection, path).await?;
        let prompt = item.delete().await?;
        self.run_prompt(prompt).await
    }
}
