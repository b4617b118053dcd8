use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use zeroize::Zeroizing;

use super::{
    SecretsError, SecretsRequest,
    keyring::{
        Attributes, KeyringError, SecretStore, connection_attributes, secret_attributes,
        setting_attributes,
    },
    private_key::slot_for_password_property,
};
use crate::services::network_manager::{
    NMSettingSecretFlags,
    connection::{
        Connection, SecretEntry,
        names::{IEEE_8021X, VPN},
    },
};

/// A secret about to be written to the keyring.
struct PendingItem {
    label: String,
    attributes: Attributes,
    secret: Zeroizing<String>,
}

/// Writes agent-owned secrets to the keyring and removes them again.
#[derive(Clone)]
pub struct SecretsSaveCoordinator {
    store: Arc<dyn SecretStore>,
}

impl std::fmt::Debug for SecretsSaveCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsSaveCoordinator").finish_non_exhaustive()
    }
}

impl SecretsSaveCoordinator {
    /// Create a coordinator writing to `store`.
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Forget every secret stored for a profile.
    ///
    /// Matched items are deleted in the background; their outcome is only
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns `SecretsError::InvalidConnection` if the profile has no UUID,
    /// and `SecretsError::Keyring` if the keyring lookup fails.
    #[instrument(skip_all, fields(request_id = request.id(), connection = ?connection.uuid()))]
    pub async fn delete(
        &self,
        request: &SecretsRequest,
        connection: &Connection,
    ) -> Result<(), SecretsError> {
        let uuid = profile_uuid(connection)?;
        self.purge(request, &connection_attributes(uuid))
            .await
            .map(|deletes| {
                debug!(count = deletes.len(), "Deleting stored secrets");
            })
    }

    /// Replace the stored secrets of a profile with its current agent-owned
    /// secrets.
    ///
    /// Stale items are deleted first. Individual write failures are logged
    /// and skipped, so a partial save still succeeds.
    ///
    /// # Errors
    ///
    /// Returns `SecretsError::InvalidConnection` if the profile has no UUID.
    #[instrument(skip_all, fields(request_id = request.id(), connection = ?connection.uuid()))]
    pub async fn save(
        &self,
        request: &SecretsRequest,
        connection: &Connection,
    ) -> Result<(), SecretsError> {
        self.replace(request, connection, None).await
    }

    /// Replace the stored secrets of one setting of a profile.
    ///
    /// Items stored for the profile's other settings are left alone, since
    /// the connection a prompt hands back only carries the prompted setting's
    /// secrets.
    ///
    /// # Errors
    ///
    /// Returns `SecretsError::InvalidConnection` if the profile has no UUID.
    #[instrument(skip_all, fields(request_id = request.id(), connection = ?connection.uuid(), setting))]
    pub async fn save_setting(
        &self,
        request: &SecretsRequest,
        connection: &Connection,
        setting: &str,
    ) -> Result<(), SecretsError> {
        self.replace(request, connection, Some(setting)).await
    }

    async fn replace(
        &self,
        request: &SecretsRequest,
        connection: &Connection,
        setting: Option<&str>,
    ) -> Result<(), SecretsError> {
        let uuid = profile_uuid(connection)?;
        let stale = match setting {
            Some(setting) => setting_attributes(uuid, setting),
            None => connection_attributes(uuid),
        };

        match self.purge(request, &stale).await {
            Ok(deletes) => {
                join_all(deletes).await;
            }
            Err(e) => debug!(error = %e, "Ignoring failure to clear old secrets"),
        }

        let items = pending_items(connection, uuid, setting);
        if items.is_empty() {
            debug!("No agent-owned secrets to save");
            return Ok(());
        }

        let writes = items.iter().map(|item| async move {
            let _call = request.keyring_call();
            match self
                .store
                .create_item(&item.label, &item.attributes, &item.secret, true)
                .await
            {
                Ok(()) => true,
                Err(e) => {
                    warn!(label = %item.label, error = %e, "Failed to save secret");
                    false
                }
            }
        });
        let saved = join_all(writes).await.into_iter().filter(|ok| *ok).count();

        info!(saved, total = items.len(), "Saved secrets to keyring");
        Ok(())
    }

    async fn purge(
        &self,
        request: &SecretsRequest,
        attributes: &Attributes,
    ) -> Result<Vec<JoinHandle<()>>, SecretsError> {
        let found = {
            let _call = request.keyring_call();
            self.store.find_items(attributes).await
        };

        let items = match found {
            Ok(items) => items,
            Err(KeyringError::NoMatch) => Vec::new(),
            Err(e) => return Err(SecretsError::Keyring(e)),
        };

        Ok(items
            .into_iter()
            .map(|item| {
                let store = Arc::clone(&self.store);
                tokio::spawn(async move {
                    if let Err(e) = store.delete_item(&item.handle).await {
                        warn!(item = %item.handle, error = %e, "Failed to delete secret");
                    }
                })
            })
            .collect())
    }
}

fn profile_uuid(connection: &Connection) -> Result<&str, SecretsError> {
    connection
        .uuid()
        .ok_or_else(|| SecretsError::InvalidConnection("profile has no UUID".to_owned()))
}

/// Keyring key a secret is stored under.
///
/// A private key password is stored under its applet tag when the key file
/// path is known, so reading it back can decrypt the key.
fn keyring_key<'a>(connection: &Connection, entry: &SecretEntry<'a>) -> &'a str {
    if entry.setting == IEEE_8021X {
        if let Some(slot) = slot_for_password_property(entry.key) {
            if connection.private_value(slot.path_tag).is_some() {
                return slot.password_tag;
            }
        }
    }
    entry.key
}

fn pending_items(connection: &Connection, uuid: &str, setting: Option<&str>) -> Vec<PendingItem> {
    let name = connection.id().unwrap_or(uuid);

    connection
        .secret_entries()
        .into_iter()
        .filter(|entry| entry.flags == NMSettingSecretFlags::AGENT_OWNED)
        .filter(|entry| setting.is_none_or(|setting| entry.setting == setting))
        .map(|entry| {
            let key = keyring_key(connection, &entry);
            let label = if entry.setting == VPN {
                let service = connection.vpn_service_type().unwrap_or_default();
                format!("VPN {key} secret for {name}/{service}/{VPN}")
            } else {
                format!("Network secret for {name}/{}/{key}", entry.setting)
            };

            PendingItem {
                label,
                attributes: secret_attributes(uuid, entry.setting, key),
                secret: Zeroizing::new(entry.value.to_owned()),
            }
        })
        .collect()
}
