use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Secrets agent settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// Identifier the agent registers with NetworkManager under.
    pub identifier: String,

    /// Store agent-owned secrets the user typed into a prompt.
    pub save_prompted_secrets: bool,

    /// Secret Service collection alias secrets are kept in.
    pub keyring_collection: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            identifier: String::from("org.freedesktop.nm-applet"),
            save_prompted_secrets: true,
            keyring_collection: String::from("default"),
        }
    }
}
