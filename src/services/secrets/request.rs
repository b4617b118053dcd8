use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use tokio::sync::oneshot;

use super::SecretsError;
use crate::services::{
    common::ObjectPath,
    network_manager::{
        NMSecretAgentGetSecretsFlags,
        connection::{Connection, ConnectionSecrets},
    },
};

/// Identifier of a request, unique for the lifetime of the process.
pub type RequestId = u64;

/// Final outcome of a request: the secrets to hand back, empty for save and
/// delete requests.
pub type RequestResult = Result<ConnectionSecrets, SecretsError>;

/// What the daemon asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Supply secrets for a setting.
    GetSecrets,
    /// Persist agent-owned secrets.
    SaveSecrets,
    /// Forget stored secrets.
    DeleteSecrets,
}

/// The part of a request the registry keeps for matching cancellations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// Request identifier.
    pub id: RequestId,
    /// Kind of request.
    pub kind: RequestKind,
    /// Settings object path of the profile.
    pub connection_path: ObjectPath,
    /// Setting the request is about; empty for save and delete.
    pub setting_name: String,
}

/// A request handed to the task that serves it.
pub struct SecretsRequest {
    /// Registry bookkeeping for the request.
    pub info: RequestInfo,
    /// The profile as the daemon sent it.
    pub connection: Connection,
    /// Secret names the daemon hinted at, if any.
    pub hints: Vec<String>,
    /// GetSecrets behaviour flags.
    pub flags: NMSecretAgentGetSecretsFlags,
    keyring_calls: Arc<AtomicUsize>,
}

impl SecretsRequest {
    pub(super) fn new(
        info: RequestInfo,
        connection: Connection,
        hints: Vec<String>,
        flags: NMSecretAgentGetSecretsFlags,
        keyring_calls: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            info,
            connection,
            hints,
            flags,
            keyring_calls,
        }
    }

    /// Request identifier.
    pub fn id(&self) -> RequestId {
        self.info.id
    }

    /// Setting the request is about.
    pub fn setting_name(&self) -> &str {
        &self.info.setting_name
    }

    /// Track one outstanding keyring call for the lifetime of the guard.
    pub fn keyring_call(&self) -> KeyringCall {
        KeyringCall::new(Arc::clone(&self.keyring_calls))
    }

    /// Number of keyring calls still in flight.
    pub fn pending_keyring_calls(&self) -> usize {
        self.keyring_calls.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn keyring_call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.keyring_calls)
    }
}

impl fmt::Debug for SecretsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretsRequest")
            .field("info", &self.info)
            .field("connection", &self.connection)
            .field("hints", &self.hints)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// An outstanding keyring call of a request.
///
/// Dropping the future holding the guard cancels the call and releases it.
#[derive(Debug)]
pub struct KeyringCall {
    counter: Arc<AtomicUsize>,
}

impl KeyringCall {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for KeyringCall {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The reply side of a request. Resolves exactly once.
#[derive(Debug)]
pub struct PendingReply {
    id: RequestId,
    reply: oneshot::Receiver<RequestResult>,
}

impl PendingReply {
    pub(super) fn new(id: RequestId, reply: oneshot::Receiver<RequestResult>) -> Self {
        Self { id, reply }
    }

    /// Identifier of the request this reply belongs to.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Wait for the request to complete.
    ///
    /// # Errors
    ///
    /// Returns the error the request completed with, or
    /// `SecretsError::InternalError` if it was dropped without completing.
    pub async fn wait(self) -> RequestResult {
        let id = self.id;
        self.reply.await.unwrap_or_else(|_| {
            Err(SecretsError::InternalError {
                code: 0,
                reason: format!("request {id} dropped without a reply"),
            })
        })
    }
}
