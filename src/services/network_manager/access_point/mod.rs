//! Access point snapshots, their dedup fingerprint, and the change events the
//! daemon delivers for them.

mod fingerprint;
mod monitoring;
mod types;

#[cfg(test)]
mod tests;

use tracing::instrument;
use zbus::{Connection, zvariant::OwnedObjectPath};

pub use fingerprint::{FINGERPRINT_LEN, Fingerprint, MAX_SSID_LEN, ModeClass, SecurityClass};
pub use monitoring::{AccessPointMonitor, ApUpdate};
pub use types::{NetworkIdentifier, SSID};

use crate::{
    services::{
        common::ObjectPath,
        network_manager::{
            AccessPointProxy, NM80211ApFlags, NM80211ApSecurityFlags, NM80211Mode, NetworkError,
        },
    },
    unwrap_property, unwrap_property_or,
};

/// A change to one access point property, in daemon delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApChange {
    /// Signal quality in percent.
    Strength(u8),
    /// New SSID bytes.
    Ssid(Vec<u8>),
    /// New capability flags.
    Flags(NM80211ApFlags),
    /// New WPA element flags.
    WpaFlags(NM80211ApSecurityFlags),
    /// New RSN element flags.
    RsnFlags(NM80211ApSecurityFlags),
    /// New channel frequency in MHz.
    Frequency(u32),
    /// New operating mode.
    Mode(NM80211Mode),
    /// New hardware address.
    HwAddress(String),
}

impl ApChange {
    /// Whether the change requires recomputing the fingerprint.
    pub fn affects_fingerprint(&self) -> bool {
        !matches!(self, Self::Strength(_) | Self::HwAddress(_))
    }
}

/// One radio-visible network cell.
///
/// The fingerprint is cached and kept in step with the SSID, mode and
/// security flags by every mutator.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessPointRecord {
    path: ObjectPath,
    ssid: Option<SSID>,
    mode: NM80211Mode,
    flags: NM80211ApFlags,
    wpa_flags: NM80211ApSecurityFlags,
    rsn_flags: NM80211ApSecurityFlags,
    frequency: u32,
    strength: u8,
    hw_address: Option<String>,
    fingerprint: Fingerprint,
}

impl AccessPointRecord {
    /// Create an open infrastructure AP with the given identity and SSID.
    pub fn new(path: impl Into<ObjectPath>, ssid: Option<SSID>) -> Self {
        let mut record = Self {
            path: path.into(),
            ssid,
            mode: NM80211Mode::Infra,
            flags: NM80211ApFlags::NONE,
            wpa_flags: NM80211ApSecurityFlags::NONE,
            rsn_flags: NM80211ApSecurityFlags::NONE,
            frequency: 0,
            strength: 0,
            hw_address: None,
            fingerprint: Fingerprint::from_classes(None, ModeClass::Other, SecurityClass::Open),
        };
        record.refresh_fingerprint();
        record
    }

    /// Set the operating mode.
    #[must_use]
    pub fn with_mode(mut self, mode: NM80211Mode) -> Self {
        self.mode = mode;
        self.refresh_fingerprint();
        self
    }

    /// Set the capability and security element flags.
    #[must_use]
    pub fn with_security(
        mut self,
        flags: NM80211ApFlags,
        wpa_flags: NM80211ApSecurityFlags,
        rsn_flags: NM80211ApSecurityFlags,
    ) -> Self {
        self.flags = flags;
        self.wpa_flags = wpa_flags;
        self.rsn_flags = rsn_flags;
        self.refresh_fingerprint();
        self
    }

    /// Set the signal strength.
    #[must_use]
    pub fn with_strength(mut self, strength: u8) -> Self {
        self.strength = strength.min(100);
        self
    }

    /// Set the channel frequency.
    #[must_use]
    pub fn with_frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set the hardware address.
    #[must_use]
    pub fn with_hw_address(mut self, hw_address: impl Into<String>) -> Self {
        let hw_address = hw_address.into();
        self.hw_address = (!hw_address.is_empty()).then_some(hw_address);
        self
    }

    /// Load a snapshot of an access point from the daemon.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::ObjectNotFound` if the access point is gone.
    /// Returns `NetworkError::DbusError` if the proxy cannot be created.
    #[instrument(skip(connection), fields(ap = %path))]
    pub async fn from_path(
        connection: &Connection,
        path: OwnedObjectPath,
    ) -> Result<Self, NetworkError> {
        let ap_proxy = AccessPointProxy::new(connection, path.clone())
            .await
            .map_err(NetworkError::DbusError)?;

        if ap_proxy.strength().await.is_err() {
            return Err(NetworkError::ObjectNotFound(path.to_string()));
        }

        let (flags, wpa_flags, rsn_flags, ssid, frequency, hw_address, mode, strength) = tokio::join!(
            ap_proxy.flags(),
            ap_proxy.wpa_flags(),
            ap_proxy.rsn_flags(),
            ap_proxy.ssid(),
            ap_proxy.frequency(),
            ap_proxy.hw_address(),
            ap_proxy.mode(),
            ap_proxy.strength(),
        );

        let flags = NM80211ApFlags::from_bits_truncate(unwrap_property!(flags, "Flags", path));
        let wpa_flags =
            NM80211ApSecurityFlags::from_bits_truncate(unwrap_property!(wpa_flags, "WpaFlags", path));
        let rsn_flags =
            NM80211ApSecurityFlags::from_bits_truncate(unwrap_property!(rsn_flags, "RsnFlags", path));
        let ssid: Vec<u8> = unwrap_property!(ssid, "Ssid", path);
        let frequency = unwrap_property!(frequency, "Frequency", path);
        let hw_address: String = unwrap_property!(hw_address, "HwAddress", path);
        let mode = NM80211Mode::from_u32(unwrap_property_or!(mode, "Mode", path, 0));
        let strength = unwrap_property!(strength, "Strength", path);

        let ssid = (!ssid.is_empty()).then(|| SSID::new(ssid));

        Ok(Self::new(path.to_string(), ssid)
            .with_mode(mode)
            .with_security(flags, wpa_flags, rsn_flags)
            .with_frequency(frequency)
            .with_strength(strength)
            .with_hw_address(hw_address))
    }

    /// Opaque identity of the AP (its object path).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// SSID, if the cell broadcasts one.
    pub fn ssid(&self) -> Option<&SSID> {
        self.ssid.as_ref()
    }

    /// Whether the cell hides its SSID.
    pub fn is_hidden(&self) -> bool {
        self.ssid.as_ref().is_none_or(SSID::is_hidden)
    }

    /// Operating mode.
    pub fn mode(&self) -> NM80211Mode {
        self.mode
    }

    /// Capability flags.
    pub fn flags(&self) -> NM80211ApFlags {
        self.flags
    }

    /// WPA element flags.
    pub fn wpa_flags(&self) -> NM80211ApSecurityFlags {
        self.wpa_flags
    }

    /// RSN element flags.
    pub fn rsn_flags(&self) -> NM80211ApSecurityFlags {
        self.rsn_flags
    }

    /// Channel frequency in MHz.
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Signal strength in percent.
    pub fn strength(&self) -> u8 {
        self.strength
    }

    /// Hardware address (BSSID).
    pub fn hw_address(&self) -> Option<&str> {
        self.hw_address.as_deref()
    }

    /// Cached fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Apply a property change.
    ///
    /// Returns `true` if the fingerprint was recomputed.
    pub fn apply(&mut self, change: ApChange) -> bool {
        let recompute = change.affects_fingerprint();

        match change {
            ApChange::Strength(strength) => self.strength = strength.min(100),
            ApChange::Ssid(ssid) => self.ssid = (!ssid.is_empty()).then(|| SSID::new(ssid)),
            ApChange::Flags(flags) => self.flags = flags,
            ApChange::WpaFlags(flags) => self.wpa_flags = flags,
            ApChange::RsnFlags(flags) => self.rsn_flags = flags,
            ApChange::Frequency(frequency) => self.frequency = frequency,
            ApChange::Mode(mode) => self.mode = mode,
            ApChange::HwAddress(hw_address) => {
                self.hw_address = (!hw_address.is_empty()).then_some(hw_address);
            }
        }

        if recompute {
            self.refresh_fingerprint();
        }
        recompute
    }

    fn refresh_fingerprint(&mut self) {
        self.fingerprint = Fingerprint::compute(
            self.ssid.as_ref().map(SSID::as_bytes),
            ModeClass::from(self.mode),
            self.flags,
            self.wpa_flags,
            self.rsn_flags,
        );
    }
}
