use super::keyring::KeyringError;

/// Ways a secrets request can fail.
///
/// Every request completes exactly once, either with secrets or with one of
/// these.
#[derive(thiserror::Error, Debug)]
pub enum SecretsError {
    /// The user dismissed the prompt, or the daemon canceled the request
    #[error("User canceled the secrets request")]
    UserCanceled,

    /// The profile lacks a required setting, id or type
    #[error("Invalid connection: {0}")]
    InvalidConnection(String),

    /// Unexpected failure, with the failing subsystem's diagnostic code
    #[error("Internal error {code}: {reason}")]
    InternalError {
        /// Diagnostic code of the failing subsystem.
        code: u32,
        /// What went wrong.
        reason: String,
    },

    /// The secret store failed with something other than a cancel or an
    /// empty result
    #[error("Keyring error: {0}")]
    Keyring(#[from] KeyringError),
}

impl SecretsError {
    /// Diagnostic code: the failing subsystem's code for internal and
    /// keyring errors, 0 otherwise.
    pub fn code(&self) -> u32 {
        match self {
            Self::InternalError { code, .. } => *code,
            Self::Keyring(e) => e.code(),
            Self::UserCanceled | Self::InvalidConnection(_) => 0,
        }
    }

    /// Whether this is a cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::UserCanceled)
    }
}
