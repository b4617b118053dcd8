use async_trait::async_trait;
use tracing::info;

use crate::services::network_manager::{
    DeviceInfo, access_point::AccessPointRecord, connection::Connection,
};

/// What a secrets dialog is asked to collect.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    /// The profile, with any secrets already found staged into it.
    pub connection: Connection,
    /// Setting whose secrets are needed.
    pub setting_name: String,
    /// Secret names the daemon hinted at.
    pub hints: Vec<String>,
    /// Whether the user asked for the connection, as opposed to an automatic
    /// activation.
    pub user_requested: bool,
    /// Whether previously stored secrets were rejected.
    pub request_new: bool,
    /// Device the connection is activating on, if known.
    pub device: Option<DeviceInfo>,
    /// Access point being joined, if known.
    pub access_point: Option<AccessPointRecord>,
}

/// How a secrets dialog ended.
#[derive(Debug, Clone)]
pub enum PromptOutcome {
    /// The user filled in the dialog; the profile carries the new secrets.
    Provided(Connection),
    /// The user closed the dialog.
    Dismissed,
}

/// The dialog collaborator that asks the user for secrets.
#[async_trait]
pub trait SecretsPrompt: Send + Sync {
    /// Ask the user for the secrets of `request.setting_name`.
    async fn ask(&self, request: PromptRequest) -> PromptOutcome;
}

/// A prompt for sessions without a UI. Every dialog is dismissed.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessPrompt;

#[async_trait]
impl SecretsPrompt for HeadlessPrompt {
    async fn ask(&self, request: PromptRequest) -> PromptOutcome {
        info!(
            connection = ?request.connection.id(),
            setting = %request.setting_name,
            "No UI available, dismissing secrets prompt"
        );
        PromptOutcome::Dismissed
    }
}
