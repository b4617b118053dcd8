//! Attribute-indexed secret storage.
//!
//! Items are keyed by the `connection-uuid`, `setting-name` and
//! `setting-key` attributes. Canceling a pending keyring call is done by
//! dropping its future.

mod error;
mod memory;
mod proxy;
mod secret_service;

use std::{collections::HashMap, fmt};

use async_trait::async_trait;
use zeroize::Zeroizing;

pub use error::KeyringError;
pub use memory::MemorySecretStore;
pub use secret_service::SecretServiceStore;

/// Item attributes: attribute name -> value.
pub type Attributes = HashMap<String, String>;

/// Attribute holding the profile UUID.
pub const UUID_ATTRIBUTE: &str = "connection-uuid";
/// Attribute holding the setting name.
pub const SETTING_NAME_ATTRIBUTE: &str = "setting-name";
/// Attribute holding the property (or VPN secret) name.
pub const SETTING_KEY_ATTRIBUTE: &str = "setting-key";

/// Attributes matching every item stored for a profile.
pub fn connection_attributes(uuid: &str) -> Attributes {
    Attributes::from([(UUID_ATTRIBUTE.to_owned(), uuid.to_owned())])
}

/// Attributes matching every item stored for one setting of a profile.
pub fn setting_attributes(uuid: &str, setting: &str) -> Attributes {
    let mut attributes = connection_attributes(uuid);
    attributes.insert(SETTING_NAME_ATTRIBUTE.to_owned(), setting.to_owned());
    attributes
}

/// Attributes of the item holding a single secret.
pub fn secret_attributes(uuid: &str, setting: &str, key: &str) -> Attributes {
    let mut attributes = setting_attributes(uuid, setting);
    attributes.insert(SETTING_KEY_ATTRIBUTE.to_owned(), key.to_owned());
    attributes
}

/// A secret read back from the store.
#[derive(Clone)]
pub struct KeyringItem {
    /// Store-specific handle used to delete the item.
    pub handle: String,
    /// Attributes the item was stored under.
    pub attributes: Attributes,
    /// The secret value.
    pub secret: Zeroizing<String>,
}

impl KeyringItem {
    /// The `setting-key` attribute of the item.
    pub fn setting_key(&self) -> Option<&str> {
        self.attributes.get(SETTING_KEY_ATTRIBUTE).map(String::as_str)
    }
}

impl fmt::Debug for KeyringItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyringItem")
            .field("handle", &self.handle)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// A secret store the agent caches agent-owned secrets in.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Every item whose attributes include all of `attributes`.
    ///
    /// Returns an empty list, or `KeyringError::NoMatch`, when nothing matches.
    async fn find_items(&self, attributes: &Attributes) -> Result<Vec<KeyringItem>, KeyringError>;

    /// Store a secret. With `replace`, an item with identical attributes is
    /// overwritten instead of duplicated.
    async fn create_item(
        &self,
        label: &str,
        attributes: &Attributes,
        secret: &str,
        replace: bool,
    ) -> Result<(), KeyringError>;

    /// Delete an item by the handle returned from `find_items`.
    async fn delete_item(&self, handle: &str) -> Result<(), KeyringError>;
}
