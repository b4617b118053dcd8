/// Secret store failures
///
/// Every variant except `Dbus` carries the numeric result code the keyring
/// daemon reports, which is surfaced in diagnostics.
#[derive(thiserror::Error, Debug)]
pub enum KeyringError {
    /// Access to the keyring was refused
    #[error("Keyring access denied")]
    Denied,

    /// No keyring daemon is running on the session bus
    #[error("No keyring daemon is available")]
    NoKeyringDaemon,

    /// The keyring was already unlocked
    #[error("Keyring is already unlocked")]
    AlreadyUnlocked,

    /// The requested keyring or collection does not exist
    #[error("No such keyring: {0}")]
    NoSuchKeyring(String),

    /// The request was malformed
    #[error("Bad keyring arguments: {0}")]
    BadArguments(String),

    /// The keyring daemon failed to read or write its storage
    #[error("Keyring I/O error: {0}")]
    IoError(String),

    /// The call was canceled, by the user at an unlock prompt or by the agent
    #[error("Keyring operation canceled")]
    Canceled,

    /// A keyring with that name already exists
    #[error("Keyring already exists")]
    KeyringAlreadyExists,

    /// No item matched the requested attributes
    #[error("No matching keyring item")]
    NoMatch,

    /// Transport failure talking to the keyring daemon
    #[error("Keyring D-Bus call failed: {0}")]
    Dbus(#[from] zbus::Error),
}

impl KeyringError {
    /// Numeric result code, as reported in `InternalError` replies.
    ///
    /// Transport failures have no keyring code and report as I/O errors.
    pub fn code(&self) -> u32 {
        match self {
            Self::Denied => 1,
            Self::NoKeyringDaemon => 2,
            Self::AlreadyUnlocked => 3,
            Self::NoSuchKeyring(_) => 4,
            Self::BadArguments(_) => 5,
            Self::IoError(_) | Self::Dbus(_) => 6,
            Self::Canceled => 7,
            Self::KeyringAlreadyExists => 8,
            Self::NoMatch => 9,
        }
    }

    /// Whether the keyring simply had nothing to return.
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }
}
