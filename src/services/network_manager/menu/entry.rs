use std::collections::BTreeSet;

use crate::services::{
    common::ObjectPath,
    network_manager::{
        NM80211Mode,
        access_point::{AccessPointRecord, Fingerprint, SSID},
        connection::Connection,
    },
};

/// One menu row: every visible cell of the same logical network.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedNetworkEntry {
    fingerprint: Fingerprint,
    ssid: SSID,
    mode: NM80211Mode,
    best_strength: u8,
    members: BTreeSet<ObjectPath>,
    profiles: Vec<Connection>,
}

impl MergedNetworkEntry {
    pub(super) fn new(ap: &AccessPointRecord, profiles: Vec<Connection>) -> Self {
        Self {
            fingerprint: ap.fingerprint(),
            ssid: ap.ssid().cloned().unwrap_or_default(),
            mode: ap.mode(),
            best_strength: ap.strength(),
            members: BTreeSet::from([ap.path().to_owned()]),
            profiles,
        }
    }

    /// Fingerprint shared by the members.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Raw SSID of the network.
    pub fn ssid(&self) -> &SSID {
        &self.ssid
    }

    /// SSID rendered for display.
    pub fn display_ssid(&self) -> String {
        self.ssid.as_str()
    }

    /// Operating mode of the first member.
    pub fn mode(&self) -> NM80211Mode {
        self.mode
    }

    /// Strongest signal seen among the members.
    pub fn best_strength(&self) -> u8 {
        self.best_strength
    }

    /// Identities of the member access points.
    pub fn members(&self) -> &BTreeSet<ObjectPath> {
        &self.members
    }

    /// Whether the entry contains the AP.
    pub fn contains(&self, ap: &str) -> bool {
        self.members.contains(ap)
    }

    /// Saved profiles usable for this network, in store order.
    pub fn profiles(&self) -> &[Connection] {
        &self.profiles
    }

    pub(super) fn add_member(&mut self, ap: &AccessPointRecord) {
        self.members.insert(ap.path().to_owned());
        self.raise_strength(ap.strength());
    }

    /// Raise the best strength; never lowers it.
    pub(super) fn raise_strength(&mut self, strength: u8) -> bool {
        if strength > self.best_strength {
            self.best_strength = strength;
            return true;
        }
        false
    }

    pub(super) fn remove_member(&mut self, ap: &str) -> bool {
        self.members.remove(ap)
    }

    pub(super) fn set_best_strength(&mut self, strength: u8) {
        self.best_strength = strength;
    }
}
