//! NetworkManager secrets agent.
//!
//! The daemon asks the agent for credentials when activating a profile and
//! hands it agent-owned secrets to store. Stored secrets live in the
//! session keyring; missing ones are asked for through a [`SecretsPrompt`].

mod agent;
/// D-Bus face of the agent
pub mod dbus;
mod error;
/// Secret store adapters
pub mod keyring;
mod private_key;
mod prompt;
mod registry;
mod request;
mod resolver;
mod save;


pub use agent::SecretAgent;
pub use error::SecretsError;
pub use private_key::{
    FilePrivateKeyLoader, LoadedPrivateKey, PrivateKeyError, PrivateKeyFormat, PrivateKeyLoader,
    PrivateKeySlot, slot_for_password_property, slot_for_password_tag,
};
pub use prompt::{HeadlessPrompt, PromptOutcome, PromptRequest, SecretsPrompt};
pub use registry::SecretsRequestRegistry;
pub use request::{
    KeyringCall, PendingReply, RequestId, RequestInfo, RequestKind, RequestResult, SecretsRequest,
};
pub use resolver::{KeyringSecretsResolver, ResolverParts};
pub use save::SecretsSaveCoordinator;
