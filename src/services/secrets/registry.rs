use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use tokio::{sync::oneshot, task::AbortHandle};
use tracing::{debug, error, info};

use super::{
    PendingReply, RequestId, RequestInfo, RequestKind, RequestResult, SecretsError, SecretsRequest,
};
use crate::services::network_manager::{NMSecretAgentGetSecretsFlags, connection::Connection};

struct Entry {
    info: RequestInfo,
    reply: oneshot::Sender<RequestResult>,
    task: Option<AbortHandle>,
    keyring_calls: Arc<AtomicUsize>,
}

/// Every outstanding secrets request of an agent.
///
/// The registry owns the reply channel of each request. Whichever path
/// removes a request from the map (normal completion, a cancellation, or
/// agent disposal) is the one that replies, so every request is answered
/// exactly once.
#[derive(Default)]
pub struct SecretsRequestRegistry {
    next_id: AtomicU64,
    requests: Mutex<HashMap<RequestId, Entry>>,
}

impl std::fmt::Debug for SecretsRequestRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsRequestRegistry")
            .field("outstanding", &self.len())
            .finish()
    }
}

impl SecretsRequestRegistry {
    /// Create an empty registry. Identifiers start at 1.
    pub fn new() -> Self {
        Self::default()
    }

    fn requests(&self) -> MutexGuard<'_, HashMap<RequestId, Entry>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new request.
    ///
    /// Returns the request for the task that serves it, and the reply side
    /// for whoever answers the daemon.
    pub fn create(
        &self,
        kind: RequestKind,
        connection: Connection,
        connection_path: &str,
        setting_name: &str,
        hints: Vec<String>,
        flags: NMSecretAgentGetSecretsFlags,
    ) -> (SecretsRequest, PendingReply) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let info = RequestInfo {
            id,
            kind,
            connection_path: connection_path.to_owned(),
            setting_name: setting_name.to_owned(),
        };
        let keyring_calls = Arc::new(AtomicUsize::new(0));
        let (reply_tx, reply_rx) = oneshot::channel();

        self.requests().insert(
            id,
            Entry {
                info: info.clone(),
                reply: reply_tx,
                task: None,
                keyring_calls: Arc::clone(&keyring_calls),
            },
        );
        debug!(request_id = id, ?kind, connection_path, setting_name, "Request created");

        (
            SecretsRequest::new(info, connection, hints, flags, keyring_calls),
            PendingReply::new(id, reply_rx),
        )
    }

    /// Attach the task serving a request, so cancellation can stop it.
    ///
    /// A request that was canceled before its task got attached has the task
    /// stopped right away.
    pub fn attach_task(&self, id: RequestId, task: AbortHandle) {
        match self.requests().get_mut(&id) {
            Some(entry) => entry.task = Some(task),
            None => task.abort(),
        }
    }

    /// Complete a request with its final result.
    ///
    /// Returns false if the request was already completed or canceled, in
    /// which case `result` is discarded.
    pub fn complete(&self, id: RequestId, result: RequestResult) -> bool {
        let Some(entry) = self.requests().remove(&id) else {
            debug!(request_id = id, "Request already finished, dropping result");
            return false;
        };

        let outstanding = entry.keyring_calls.load(Ordering::SeqCst);
        if outstanding != 0 {
            error!(request_id = id, outstanding, "Request completed with keyring calls in flight");
            debug_assert_eq!(outstanding, 0, "request completed with keyring calls in flight");
        }

        match &result {
            Ok(secrets) => {
                info!(request_id = id, settings = secrets.len(), "Request completed");
            }
            Err(e) => info!(request_id = id, error = %e, "Request failed"),
        }

        if entry.reply.send(result).is_err() {
            debug!(request_id = id, "Nobody is waiting for the reply");
        }
        true
    }

    /// Cancel every request matching `predicate`.
    ///
    /// Each matching request stops its task, which drops any keyring call in
    /// flight, and replies with the error built by `reason`. Requests that
    /// already finished are not touched, so repeating a cancellation is
    /// harmless. Returns the number of requests canceled.
    pub fn cancel_matching<P, E>(&self, predicate: P, reason: E) -> usize
    where
        P: Fn(&RequestInfo) -> bool,
        E: Fn() -> SecretsError,
    {
        let canceled: Vec<Entry> = {
            let mut requests = self.requests();
            let ids: Vec<RequestId> = requests
                .values()
                .filter(|entry| predicate(&entry.info))
                .map(|entry| entry.info.id)
                .collect();
            ids.iter().filter_map(|id| requests.remove(id)).collect()
        };

        for entry in &canceled {
            if let Some(task) = &entry.task {
                task.abort();
            }
        }

        let count = canceled.len();
        for entry in canceled {
            debug!(
                request_id = entry.info.id,
                keyring_calls = entry.keyring_calls.load(Ordering::SeqCst),
                "Request canceled"
            );
            let _ = entry.reply.send(Err(reason()));
        }

        count
    }

    /// Drop a request without replying.
    ///
    /// The waiting side then resolves with an internal error.
    pub fn remove(&self, id: RequestId) -> Option<RequestInfo> {
        let entry = self.requests().remove(&id)?;
        if let Some(task) = &entry.task {
            task.abort();
        }
        Some(entry.info)
    }

    /// Cancel every outstanding request with `UserCanceled`.
    pub fn dispose(&self) -> usize {
        let count = self.cancel_matching(|_| true, || SecretsError::UserCanceled);
        if count > 0 {
            info!(count, "Canceled outstanding requests");
        }
        count
    }

    /// Whether a request is still outstanding.
    pub fn contains(&self, id: RequestId) -> bool {
        self.requests().contains_key(&id)
    }

    /// Number of outstanding requests.
    pub fn len(&self) -> usize {
        self.requests().len()
    }

    /// Whether no request is outstanding.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
