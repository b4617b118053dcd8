use std::{future::Future, sync::Arc};

use tracing::{debug, info, instrument};

use super::{
    KeyringSecretsResolver, PendingReply, RequestId, RequestKind, RequestResult, SecretsError,
    SecretsRequestRegistry,
};
use crate::services::network_manager::{
    NMSecretAgentGetSecretsFlags,
    connection::{Connection, ConnectionSecrets},
};

/// The secrets agent: serves the daemon's requests for credentials.
///
/// Each request runs in its own task and is answered exactly once through
/// the `PendingReply` returned when it is submitted. Dropping the agent
/// cancels whatever is still outstanding.
#[derive(Debug)]
pub struct SecretAgent {
    registry: Arc<SecretsRequestRegistry>,
    resolver: KeyringSecretsResolver,
}

impl SecretAgent {
    /// Create an agent with an empty request registry.
    pub fn new(resolver: KeyringSecretsResolver) -> Self {
        Self {
            registry: Arc::new(SecretsRequestRegistry::new()),
            resolver,
        }
    }

    /// Outstanding requests.
    pub fn registry(&self) -> &SecretsRequestRegistry {
        &self.registry
    }

    fn spawn<F>(&self, id: RequestId, work: F)
    where
        F: Future<Output = RequestResult> + Send + 'static,
    {
        let registry = Arc::clone(&self.registry);
        let task = tokio::spawn(async move {
            let result = work.await;
            registry.complete(id, result);
        });
        self.registry.attach_task(id, task.abort_handle());
    }

    /// Supply the secrets of one setting of a profile.
    #[instrument(skip(self, connection, hints), fields(connection = ?connection.uuid()))]
    pub fn on_get_secrets(
        &self,
        connection: Connection,
        connection_path: &str,
        setting_name: &str,
        hints: Vec<String>,
        flags: NMSecretAgentGetSecretsFlags,
    ) -> PendingReply {
        let (request, reply) = self.registry.create(
            RequestKind::GetSecrets,
            connection,
            connection_path,
            setting_name,
            hints,
            flags,
        );
        info!(request_id = request.id(), ?flags, "GetSecrets");

        let resolver = self.resolver.clone();
        self.spawn(request.id(), async move { resolver.resolve(request).await });
        reply
    }

    /// Cancel the pending GetSecrets requests for a setting of a profile.
    ///
    /// Returns how many requests were canceled.
    #[instrument(skip(self))]
    pub fn on_cancel_get_secrets(&self, connection_path: &str, setting_name: &str) -> usize {
        let canceled = self.registry.cancel_matching(
            |info| {
                info.kind == RequestKind::GetSecrets
                    && info.connection_path == connection_path
                    && info.setting_name == setting_name
            },
            || SecretsError::UserCanceled,
        );
        if canceled == 0 {
            debug!("No matching request to cancel");
        }
        canceled
    }

    /// Persist the agent-owned secrets of a profile.
    #[instrument(skip(self, connection), fields(connection = ?connection.uuid()))]
    pub fn on_save_secrets(&self, connection: Connection, connection_path: &str) -> PendingReply {
        let (request, reply) = self.registry.create(
            RequestKind::SaveSecrets,
            connection,
            connection_path,
            "",
            Vec::new(),
            NMSecretAgentGetSecretsFlags::NONE,
        );
        info!(request_id = request.id(), "SaveSecrets");

        let saver = self.resolver.saver().clone();
        self.spawn(request.id(), async move {
            saver
                .save(&request, &request.connection)
                .await
                .map(|()| ConnectionSecrets::new())
        });
        reply
    }

    /// Forget the stored secrets of a profile.
    #[instrument(skip(self, connection), fields(connection = ?connection.uuid()))]
    pub fn on_delete_secrets(&self, connection: Connection, connection_path: &str) -> PendingReply {
        let (request, reply) = self.registry.create(
            RequestKind::DeleteSecrets,
            connection,
            connection_path,
            "",
            Vec::new(),
            NMSecretAgentGetSecretsFlags::NONE,
        );
        info!(request_id = request.id(), "DeleteSecrets");

        let saver = self.resolver.saver().clone();
        self.spawn(request.id(), async move {
            saver
                .delete(&request, &request.connection)
                .await
                .map(|()| ConnectionSecrets::new())
        });
        reply
    }

    /// Cancel every outstanding request with `UserCanceled`.
    pub fn dispose(&self) -> usize {
        self.registry.dispose()
    }
}

impl Drop for SecretAgent {
    fn drop(&mut self) {
        self.dispose();
    }
}
