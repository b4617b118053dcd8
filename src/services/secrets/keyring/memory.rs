use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use zeroize::Zeroizing;

use super::{Attributes, KeyringError, KeyringItem, SecretStore};

#[derive(Debug)]
struct StoredItem {
    id: u64,
    label: String,
    attributes: Attributes,
    secret: Zeroizing<String>,
}

#[derive(Debug, Default)]
struct State {
    items: Vec<StoredItem>,
    next_id: u64,
    fail_next_find: Option<KeyringError>,
}

/// Process-local secret store.
///
/// Backs `nmapplet run --ephemeral` and the test suite. Secrets are lost
/// when the process exits.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    state: Mutex<State>,
    find_calls: AtomicUsize,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MemorySecretStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `find_items` call fail with `error`.
    pub async fn fail_next_find(&self, error: KeyringError) {
        self.state.lock().await.fail_next_find = Some(error);
    }

    /// Number of `find_items` calls so far.
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Number of `create_item` calls so far.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of `delete_item` calls so far.
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    /// Whether the store holds no items.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Labels of the stored items, in insertion order.
    pub async fn labels(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.items.iter().map(|item| item.label.clone()).collect()
    }
}

fn matches(item: &StoredItem, attributes: &Attributes) -> bool {
    attributes
        .iter()
        .all(|(name, value)| item.attributes.get(name) == Some(value))
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn find_items(&self, attributes: &Attributes) -> Result<Vec<KeyringItem>, KeyringError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;

        if let Some(error) = state.fail_next_find.take() {
            return Err(error);
        }

        Ok(state
            .items
            .iter()
            .filter(|item| matches(item, attributes))
            .map(|item| KeyringItem {
                handle: item.id.to_string(),
                attributes: item.attributes.clone(),
                secret: item.secret.clone(),
            })
            .collect())
    }

    async fn create_item(
        &self,
        label: &str,
        attributes: &Attributes,
        secret: &str,
        replace: bool,
    ) -> Result<(), KeyringError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;

        if replace {
            if let Some(existing) = state
                .items
                .iter_mut()
                .find(|item| item.attributes == *attributes)
            {
                existing.label = label.to_owned();
                existing.secret = Zeroizing::new(secret.to_owned());
                return Ok(());
            }
        }

        state.next_id += 1;
        let id = state.next_id;
        state.items.push(StoredItem {
            id,
            label: label.to_owned(),
            attributes: attributes.clone(),
            secret: Zeroizing::new(secret.to_owned()),
        });
        debug!(label, id, "Stored secret");

        Ok(())
    }

    async fn delete_item(&self, handle: &str) -> Result<(), KeyringError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;

        let before = state.items.len();
        state.items.retain(|item| item.id.to_string() != handle);
        if state.items.len() == before {
            return Err(KeyringError::NoMatch);
        }

        Ok(())
    }
}
