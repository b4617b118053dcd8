use std::{fmt, path::Path};

use openssl::{pkcs12::Pkcs12, pkey::PKey};
use tracing::debug;
use zeroize::Zeroizing;

use crate::services::network_manager::connection::names::{
    PATH_PHASE2_PRIVATE_KEY_TAG, PATH_PRIVATE_KEY_TAG, PHASE2_PRIVATE_KEY_PASSWORD_TAG,
    PRIVATE_KEY_PASSWORD_TAG,
};

/// Private key loading failures
#[derive(thiserror::Error, Debug)]
pub enum PrivateKeyError {
    /// The key file could not be read
    #[error("Cannot read private key: {0}")]
    Io(#[from] std::io::Error),

    /// The key could not be decrypted with the stored password
    #[error("Cannot decrypt private key: {0}")]
    Decrypt(#[from] openssl::error::ErrorStack),
}

impl PrivateKeyError {
    /// Diagnostic code: the OS error for I/O failures, the first openssl
    /// error code for decryption failures.
    pub fn code(&self) -> u32 {
        match self {
            Self::Io(e) => e.raw_os_error().map_or(0, i32::unsigned_abs),
            Self::Decrypt(stack) => stack
                .errors()
                .first()
                .map_or(0, |e| u32::try_from(e.code()).unwrap_or(u32::MAX)),
        }
    }
}

/// Encoding of a loaded key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateKeyFormat {
    /// Decrypted PKCS#8 PEM.
    Pkcs8Pem,
    /// A PKCS#12 bundle, forwarded as-is; the daemon decrypts it with the
    /// password sent alongside.
    Pkcs12,
}

/// A private key ready to hand to the daemon.
pub struct LoadedPrivateKey {
    /// Encoding of `data`.
    pub format: PrivateKeyFormat,
    /// Key bytes, wiped on drop.
    pub data: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for LoadedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPrivateKey")
            .field("format", &self.format)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Turns a stored private key password back into key material.
pub trait PrivateKeyLoader: Send + Sync {
    /// Load and decrypt the key at `path`.
    ///
    /// # Errors
    ///
    /// Returns `PrivateKeyError` if the file is unreadable or the password
    /// does not decrypt it.
    fn load(&self, path: &Path, password: &str) -> Result<LoadedPrivateKey, PrivateKeyError>;
}

/// Loads PEM, DER PKCS#8 and PKCS#12 keys from disk with openssl.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilePrivateKeyLoader;

impl PrivateKeyLoader for FilePrivateKeyLoader {
    fn load(&self, path: &Path, password: &str) -> Result<LoadedPrivateKey, PrivateKeyError> {
        let raw = Zeroizing::new(std::fs::read(path)?);

        if let Ok(bundle) = Pkcs12::from_der(&raw) {
            bundle.parse2(password)?;
            debug!(path = %path.display(), "Validated PKCS#12 bundle");
            return Ok(LoadedPrivateKey {
                format: PrivateKeyFormat::Pkcs12,
                data: raw,
            });
        }

        let key = if raw.starts_with(b"-----") {
            PKey::private_key_from_pem_passphrase(&raw, password.as_bytes())?
        } else {
            PKey::private_key_from_pkcs8_passphrase(&raw, password.as_bytes())?
        };

        debug!(path = %path.display(), "Decrypted private key");
        Ok(LoadedPrivateKey {
            format: PrivateKeyFormat::Pkcs8Pem,
            data: Zeroizing::new(key.private_key_to_pem_pkcs8()?),
        })
    }
}

/// Where a private key password stored in the keyring belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivateKeySlot {
    /// Keyring key the password is stored under.
    pub password_tag: &'static str,
    /// Applet-private tag holding the key file path.
    pub path_tag: &'static str,
    /// 802.1x property the key bytes are sent in.
    pub key_property: &'static str,
    /// 802.1x property the password is sent in.
    pub password_property: &'static str,
}

const SLOTS: [PrivateKeySlot; 2] = [
    PrivateKeySlot {
        password_tag: PRIVATE_KEY_PASSWORD_TAG,
        path_tag: PATH_PRIVATE_KEY_TAG,
        key_property: "private-key",
        password_property: "private-key-password",
    },
    PrivateKeySlot {
        password_tag: PHASE2_PRIVATE_KEY_PASSWORD_TAG,
        path_tag: PATH_PHASE2_PRIVATE_KEY_TAG,
        key_property: "phase2-private-key",
        password_property: "phase2-private-key-password",
    },
];

/// The slot a keyring key names, if it is a private key password tag.
pub fn slot_for_password_tag(tag: &str) -> Option<PrivateKeySlot> {
    SLOTS.into_iter().find(|slot| slot.password_tag == tag)
}

/// The slot an 802.1x password property belongs to.
pub fn slot_for_password_property(property: &str) -> Option<PrivateKeySlot> {
    SLOTS
        .into_iter()
        .find(|slot| slot.password_property == property)
}
