use std::fmt::{self, Display};

use sha2::{Digest, Sha256};

use crate::services::network_manager::{NM80211ApFlags, NM80211ApSecurityFlags, NM80211Mode};

/// Longest SSID 802.11 allows, in octets.
pub const MAX_SSID_LEN: usize = 32;

const CLASS_BYTE: usize = MAX_SSID_LEN;
const BUFFER_LEN: usize = MAX_SSID_LEN + 1;

/// Size of a fingerprint in bytes.
pub const FINGERPRINT_LEN: usize = 16;

/// Operating mode class folded into a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeClass {
    /// Infrastructure network.
    Infrastructure,
    /// Ad hoc network.
    AdHoc,
    /// Any other or unknown mode.
    Other,
}

impl ModeClass {
    const fn bit(self) -> u8 {
        match self {
            Self::Infrastructure => 1 << 0,
            Self::AdHoc => 1 << 1,
            Self::Other => 1 << 2,
        }
    }
}

impl From<NM80211Mode> for ModeClass {
    fn from(mode: NM80211Mode) -> Self {
        match mode {
            NM80211Mode::Infra => Self::Infrastructure,
            NM80211Mode::Adhoc => Self::AdHoc,
            _ => Self::Other,
        }
    }
}

/// Security class folded into a fingerprint.
///
/// Every WPA and RSN variant collapses into `WpaCapable`, so a network keeps
/// one menu identity whichever flavour a given cell advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityClass {
    /// No privacy bit and no WPA/RSN information elements.
    Open,
    /// Privacy bit without WPA/RSN information elements (WEP or LEAP).
    PrivacyOnly,
    /// WPA and RSN elements present without the privacy bit.
    UnprivilegedWpa,
    /// Any other WPA/RSN capable cell.
    WpaCapable,
}

impl SecurityClass {
    /// Classify an access point from its capability flags.
    pub fn classify(
        flags: NM80211ApFlags,
        wpa_flags: NM80211ApSecurityFlags,
        rsn_flags: NM80211ApSecurityFlags,
    ) -> Self {
        let privacy = flags.contains(NM80211ApFlags::PRIVACY);
        let no_elements = wpa_flags.is_empty() && rsn_flags.is_empty();

        if !privacy && no_elements {
            Self::Open
        } else if privacy && no_elements {
            Self::PrivacyOnly
        } else if !privacy && !wpa_flags.is_empty() && !rsn_flags.is_empty() {
            Self::UnprivilegedWpa
        } else {
            Self::WpaCapable
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Open => 1 << 3,
            Self::PrivacyOnly => 1 << 4,
            Self::UnprivilegedWpa => 1 << 5,
            Self::WpaCapable => 1 << 6,
        }
    }
}

/// Stable 16-byte identity of a logical network.
///
/// Two access points with equal fingerprints are shown as one menu entry.
/// Signal strength never takes part in the computation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Compute the fingerprint of an access point.
    ///
    /// A missing SSID hashes as 32 zero bytes; SSIDs longer than 32 bytes are
    /// truncated.
    pub fn compute(
        ssid: Option<&[u8]>,
        mode: ModeClass,
        flags: NM80211ApFlags,
        wpa_flags: NM80211ApSecurityFlags,
        rsn_flags: NM80211ApSecurityFlags,
    ) -> Self {
        let security = SecurityClass::classify(flags, wpa_flags, rsn_flags);
        Self::from_classes(ssid, mode, security)
    }

    /// Compute a fingerprint from already classified inputs.
    pub fn from_classes(ssid: Option<&[u8]>, mode: ModeClass, security: SecurityClass) -> Self {
        let mut buffer = [0u8; BUFFER_LEN];

        if let Some(ssid) = ssid {
            let len = ssid.len().min(MAX_SSID_LEN);
            buffer[..len].copy_from_slice(&ssid[..len]);
        }
        buffer[CLASS_BYTE] = mode.bit() | security.bit();

        let mut hasher = Sha256::new();
        hasher.update(buffer);
        hasher.update(buffer);
        let digest = hasher.finalize();

        let mut fingerprint = [0u8; FINGERPRINT_LEN];
        fingerprint.copy_from_slice(&digest[..FINGERPRINT_LEN]);
        Self(fingerprint)
    }

    /// Raw fingerprint bytes.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}
