//! Secret Service D-Bus interfaces.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use zbus::{
    proxy,
    zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Type, Value},
};

/// A secret as carried over the bus.
#[derive(Debug, Serialize, Deserialize, Type)]
pub struct SecretStruct {
    /// Session the secret is encoded for.
    pub session: OwnedObjectPath,
    /// Algorithm parameters; empty for plain sessions.
    pub parameters: Vec<u8>,
    /// The encoded secret.
    pub value: Vec<u8>,
    /// MIME type of the secret.
    pub content_type: String,
}

/// Reply of `OpenSession`.
#[derive(Debug, Serialize, Deserialize, Type)]
pub struct OpenSessionResult {
    /// Algorithm output; empty for plain sessions.
    pub output: OwnedValue,
    /// The opened session.
    pub result: OwnedObjectPath,
}

/// Reply of `SearchItems`.
#[derive(Debug, Serialize, Deserialize, Type)]
pub struct SearchItemsResult {
    /// Items readable right away.
    pub unlocked: Vec<OwnedObjectPath>,
    /// Items that must be unlocked first.
    pub locked: Vec<OwnedObjectPath>,
}

/// Reply of `Unlock`.
#[derive(Debug, Serialize, Deserialize, Type)]
pub struct UnlockResult {
    /// Objects unlocked without a prompt.
    pub unlocked: Vec<OwnedObjectPath>,
    /// Prompt to run for the rest, or `/`.
    pub prompt: OwnedObjectPath,
}

/// Reply of `CreateItem`.
#[derive(Debug, Serialize, Deserialize, Type)]
pub struct CreateItemResult {
    /// The new item, or `/` if a prompt is needed.
    pub item: OwnedObjectPath,
    /// Prompt to run, or `/`.
    pub prompt: OwnedObjectPath,
}

/// `org.freedesktop.Secret.Service`
#[proxy(
    interface = "org.freedesktop.Secret.Service",
    default_service = "org.freedesktop.secrets",
    default_path = "/org/freedesktop/secrets"
)]
pub trait Service {
    /// Open a session for transferring secrets.
    fn open_session(&self, algorithm: &str, input: Value<'_>) -> zbus::Result<OpenSessionResult>;

    /// Find items in any collection.
    fn search_items(&self, attributes: HashMap<&str, &str>) -> zbus::Result<SearchItemsResult>;

    /// Unlock items or collections.
    fn unlock(&self, objects: Vec<ObjectPath<'_>>) -> zbus::Result<UnlockResult>;

    /// Read several secrets at once.
    fn get_secrets(
        &self,
        items: Vec<ObjectPath<'_>>,
        session: ObjectPath<'_>,
    ) -> zbus::Result<HashMap<OwnedObjectPath, SecretStruct>>;

    /// Resolve a collection alias such as `default`.
    fn read_alias(&self, name: &str) -> zbus::Result<OwnedObjectPath>;
}

/// `org.freedesktop.Secret.Collection`
#[proxy(
    interface = "org.freedesktop.Secret.Collection",
    default_service = "org.freedesktop.secrets"
)]
pub trait Collection {
    /// Store a secret in this collection.
    fn create_item(
        &self,
        properties: HashMap<&str, Value<'_>>,
        secret: SecretStruct,
        replace: bool,
    ) -> zbus::Result<CreateItemResult>;

    /// Whether the collection is locked.
    #[zbus(property)]
    fn locked(&self) -> zbus::Result<bool>;
}

/// `org.freedesktop.Secret.Item`
#[proxy(
    interface = "org.freedesktop.Secret.Item",
    default_service = "org.freedesktop.secrets"
)]
pub trait Item {
    /// Delete the item. Returns a prompt path, or `/`.
    fn delete(&self) -> zbus::Result<OwnedObjectPath>;

    /// Attributes of the item.
    #[zbus(property)]
    fn attributes(&self) -> zbus::Result<HashMap<String, String>>;
}

/// `org.freedesktop.Secret.Prompt`
#[proxy(
    interface = "org.freedesktop.Secret.Prompt",
    default_service = "org.freedesktop.secrets"
)]
pub trait Prompt {
    /// Show the prompt.
    fn prompt(&self, window_id: &str) -> zbus::Result<()>;

    /// Emitted once the user answered the prompt.
    #[zbus(signal)]
    fn completed(&self, dismissed: bool, result: Value<'_>) -> zbus::Result<()>;
}
