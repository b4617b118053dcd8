use std::{path::Path, sync::Arc};

use tracing::{debug, info, instrument, warn};

use super::{
    RequestResult, SecretsError, SecretsRequest, SecretsSaveCoordinator,
    keyring::{KeyringError, KeyringItem, SecretStore, setting_attributes},
    private_key::{PrivateKeyFormat, PrivateKeyLoader, PrivateKeySlot, slot_for_password_tag},
    prompt::{PromptOutcome, PromptRequest, SecretsPrompt},
};
use crate::services::network_manager::{
    NMSecretAgentGetSecretsFlags,
    connection::{
        Connection, ConnectionSecrets, ConnectionStore, SecretsMap, SettingValue,
        names::{IEEE_8021X, WIRELESS_SECURITY, secret_settings_for_type},
    },
};

/// Keyring keys written by old applet versions that must never reach the
/// daemon.
const OBSOLETE_KEYS: [&str; 2] = ["private-key-passwd", "phase2-private-key-passwd"];

/// The collaborators a resolver works with.
pub struct ResolverParts {
    /// Where agent-owned secrets are cached.
    pub secrets: Arc<dyn SecretStore>,
    /// The dialog asking the user for secrets.
    pub prompt: Arc<dyn SecretsPrompt>,
    /// Where updated profiles are stored after a prompt.
    pub connections: Arc<dyn ConnectionStore>,
    /// Decrypts private keys whose password is in the keyring.
    pub private_keys: Arc<dyn PrivateKeyLoader>,
}

/// Answers GetSecrets requests from the keyring, falling back to asking the
/// user.
#[derive(Clone)]
pub struct KeyringSecretsResolver {
    secrets: Arc<dyn SecretStore>,
    prompt: Arc<dyn SecretsPrompt>,
    connections: Arc<dyn ConnectionStore>,
    private_keys: Arc<dyn PrivateKeyLoader>,
    saver: SecretsSaveCoordinator,
    save_prompted_secrets: bool,
}

impl std::fmt::Debug for KeyringSecretsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringSecretsResolver")
            .field("save_prompted_secrets", &self.save_prompted_secrets)
            .finish_non_exhaustive()
    }
}

impl KeyringSecretsResolver {
    /// Create a resolver.
    ///
    /// With `save_prompted_secrets`, secrets the user types into a prompt are
    /// written back to the keyring before the request completes.
    pub fn new(parts: ResolverParts, save_prompted_secrets: bool) -> Self {
        Self {
            saver: SecretsSaveCoordinator::new(Arc::clone(&parts.secrets)),
            secrets: parts.secrets,
            prompt: parts.prompt,
            connections: parts.connections,
            private_keys: parts.private_keys,
            save_prompted_secrets,
        }
    }

    /// The save coordinator writing to the same keyring.
    pub fn saver(&self) -> &SecretsSaveCoordinator {
        &self.saver
    }

    /// Serve a GetSecrets request to completion.
    ///
    /// VPN profiles go straight to the prompt, since their plugin helper owns
    /// the dialog. Everything else is looked up in the keyring first.
    #[instrument(skip_all, fields(request_id = request.id(), setting = %request.setting_name()))]
    pub async fn resolve(&self, mut request: SecretsRequest) -> RequestResult {
        if request.connection.is_vpn() {
            debug!("VPN secrets come from the plugin helper, skipping keyring");
            return self.ask_user(&request).await;
        }

        let uuid = request
            .connection
            .uuid()
            .ok_or_else(|| SecretsError::InvalidConnection("profile has no UUID".to_owned()))?
            .to_owned();
        let setting = request.setting_name().to_owned();

        let found = {
            let _call = request.keyring_call();
            self.secrets
                .find_items(&setting_attributes(&uuid, &setting))
                .await
        };

        let items = match found {
            Ok(items) => items,
            Err(KeyringError::NoMatch) => Vec::new(),
            Err(KeyringError::Canceled) => return Err(SecretsError::UserCanceled),
            Err(e) => {
                warn!(error = %e, code = e.code(), "Keyring lookup failed");
                return Err(SecretsError::Keyring(e));
            }
        };

        if items.is_empty() {
            if request.flags.contains(NMSecretAgentGetSecretsFlags::ALLOW_INTERACTION) {
                debug!("No stored secrets, asking the user");
                return self.ask_user(&request).await;
            }
            debug!("No stored secrets and interaction not allowed");
            return Ok(ConnectionSecrets::from([(setting, SecretsMap::new())]));
        }

        let secrets = self.extract(&request.connection, &setting, &items)?;

        if needs_prompt(&request, &secrets) {
            request.connection.stage_secrets(&setting, &secrets);
            return self.ask_user(&request).await;
        }

        info!(count = secrets.len(), "Answered from keyring");
        Ok(ConnectionSecrets::from([(setting, secrets)]))
    }

    fn extract(
        &self,
        connection: &Connection,
        setting: &str,
        items: &[KeyringItem],
    ) -> Result<SecretsMap, SecretsError> {
        let mut secrets = SecretsMap::new();

        for item in items {
            let Some(key) = item.setting_key() else {
                return Err(SecretsError::InternalError {
                    code: 0,
                    reason: format!("keyring item {} has no setting-key attribute", item.handle),
                });
            };

            if OBSOLETE_KEYS.contains(&key) {
                debug!(key, "Dropping obsolete keyring key");
                continue;
            }

            let private_key_slot = slot_for_password_tag(key)
                .filter(|_| setting == IEEE_8021X || setting == WIRELESS_SECURITY);
            match private_key_slot {
                Some(slot) => self.forward_private_key(connection, slot, &item.secret, &mut secrets)?,
                None => {
                    secrets.insert(key.to_owned(), SettingValue::from(item.secret.as_str()));
                }
            }
        }

        Ok(secrets)
    }

    /// Decrypt a private key with its stored password and put the key,
    /// rather than the password, into the reply.
    fn forward_private_key(
        &self,
        connection: &Connection,
        slot: PrivateKeySlot,
        password: &str,
        secrets: &mut SecretsMap,
    ) -> Result<(), SecretsError> {
        let Some(path) = connection.private_value(slot.path_tag) else {
            warn!(tag = slot.password_tag, "Stored private key password has no key file");
            return Err(SecretsError::InternalError {
                code: 0,
                reason: format!("couldn't read private key: no {} on the profile", slot.path_tag),
            });
        };

        let key = self
            .private_keys
            .load(Path::new(path), password)
            .map_err(|e| SecretsError::InternalError {
                code: e.code(),
                reason: e.to_string(),
            })?;

        secrets.insert(slot.key_property.to_owned(), SettingValue::from(key.data.to_vec()));
        if key.format == PrivateKeyFormat::Pkcs12 {
            secrets.insert(slot.password_property.to_owned(), SettingValue::from(password));
        }

        Ok(())
    }

    async fn ask_user(&self, request: &SecretsRequest) -> RequestResult {
        let setting = request.setting_name().to_owned();
        let ask = PromptRequest {
            connection: request.connection.clone(),
            setting_name: setting.clone(),
            hints: request.hints.clone(),
            user_requested: request
                .flags
                .contains(NMSecretAgentGetSecretsFlags::USER_REQUESTED),
            request_new: request.flags.contains(NMSecretAgentGetSecretsFlags::REQUEST_NEW),
            device: None,
            access_point: None,
        };

        let connection = match self.prompt.ask(ask).await {
            PromptOutcome::Provided(connection) => connection,
            PromptOutcome::Dismissed => return Err(SecretsError::UserCanceled),
        };

        // Reply payload first: storing the profile may reload it and drop
        // the secrets it carries.
        let reply = ConnectionSecrets::from([(setting.clone(), connection.secrets_for(&setting))]);

        if self.save_prompted_secrets && !connection.is_vpn() {
            if let Err(e) = self.saver.save_setting(request, &connection, &setting).await {
                warn!(error = %e, "Failed to save prompted secrets");
            }
        }

        if let Err(e) = self.connections.save(&connection.without_secrets()).await {
            warn!(error = %e, "Failed to store updated profile");
        }

        Ok(reply)
    }
}

/// Whether stored secrets alone cannot answer the request.
fn needs_prompt(request: &SecretsRequest, found: &SecretsMap) -> bool {
    if !request.hints.is_empty() && !request.hints.iter().any(|hint| found.contains_key(hint)) {
        debug!(hints = ?request.hints, "No stored secret matches the hints");
        return true;
    }

    if request.flags.contains(NMSecretAgentGetSecretsFlags::REQUEST_NEW) {
        debug!("New secrets requested");
        return true;
    }

    request.flags.contains(NMSecretAgentGetSecretsFlags::ALLOW_INTERACTION)
        && is_always_ask(&request.connection)
}

/// Whether the profile's primary setting, or one of the settings it relies
/// on, must always be prompted for.
fn is_always_ask(connection: &Connection) -> bool {
    let Some(connection_type) = connection.connection_type() else {
        return false;
    };

    connection.is_always_ask(connection_type)
        || secret_settings_for_type(connection_type)
            .iter()
            .any(|setting| connection.is_always_ask(setting))
}
