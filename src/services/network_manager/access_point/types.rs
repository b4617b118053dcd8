use std::fmt::{self, Display};

/// Raw 802.11 network identifier.
///
/// Wraps raw bytes since 802.11 allows non-UTF8 identifiers and embedded NULs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NetworkIdentifier(Vec<u8>);

/// Service Set Identifier - the network name.
pub type SSID = NetworkIdentifier;

impl NetworkIdentifier {
    /// Creates a new identifier from raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the identifier as a UTF-8 string.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn as_str(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the cell hides its name.
    ///
    /// Hidden networks beacon either an empty SSID or one made of NUL bytes.
    pub fn is_hidden(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl Display for NetworkIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Vec<u8>> for NetworkIdentifier {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for NetworkIdentifier {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for NetworkIdentifier {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}
