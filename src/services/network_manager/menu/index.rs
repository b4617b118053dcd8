use std::collections::HashMap;

use tracing::{debug, warn};

use super::{MergedNetworkEntry, sort_for_display};
use crate::services::{
    common::ObjectPath,
    network_manager::{
        DeviceInfo,
        access_point::{AccessPointRecord, ApChange},
        connection::{Connection, profile_applies_to},
    },
};

/// What an event did to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexUpdate {
    /// The visible entries changed.
    pub changed: bool,
    /// The device's active AP went away and the view must be rebuilt.
    pub refresh_needed: bool,
}

impl IndexUpdate {
    const UNCHANGED: Self = Self {
        changed: false,
        refresh_needed: false,
    };

    const CHANGED: Self = Self {
        changed: true,
        refresh_needed: false,
    };
}

#[derive(Debug)]
struct DeviceNetworks {
    device: DeviceInfo,
    entries: Vec<MergedNetworkEntry>,
    aps: HashMap<ObjectPath, AccessPointRecord>,
    active_ap: Option<ObjectPath>,
}

impl DeviceNetworks {
    fn new(device: DeviceInfo) -> Self {
        Self {
            device,
            entries: Vec::new(),
            aps: HashMap::new(),
            active_ap: None,
        }
    }

    fn entry_index_of(&self, ap: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.contains(ap))
    }

    /// Merge a visible AP into the entry sharing its fingerprint, or open a
    /// new one.
    fn place(&mut self, ap: &AccessPointRecord, profiles: &[Connection]) {
        let fingerprint = ap.fingerprint();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.fingerprint() == fingerprint)
        {
            Some(entry) => entry.add_member(ap),
            None => {
                let applicable = profiles
                    .iter()
                    .filter(|profile| profile_applies_to(profile, &self.device, Some(ap)))
                    .cloned()
                    .collect();
                self.entries.push(MergedNetworkEntry::new(ap, applicable));
            }
        }
    }
}

/// Deduplicated visible networks, per device.
///
/// Access points whose fingerprints match are merged into one
/// `MergedNetworkEntry`. Events for one device must be applied in delivery
/// order; devices are independent of each other.
#[derive(Debug, Default)]
pub struct ApMergeIndex {
    devices: HashMap<ObjectPath, DeviceNetworks>,
}

impl ApMergeIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a device, or refresh its description.
    pub fn add_device(&mut self, device: DeviceInfo) {
        match self.devices.get_mut(&device.path) {
            Some(networks) => networks.device = device,
            None => {
                self.devices
                    .insert(device.path.clone(), DeviceNetworks::new(device));
            }
        }
    }

    /// Stop tracking a device and drop its entries.
    pub fn remove_device(&mut self, device: &str) -> bool {
        self.devices.remove(device).is_some()
    }

    /// Index a newly visible access point.
    ///
    /// Hidden networks are remembered but never shown. `profiles` is every
    /// saved profile; the ones applying to this device and AP are attached to
    /// a newly created entry.
    pub fn on_ap_added(
        &mut self,
        device: &DeviceInfo,
        ap: AccessPointRecord,
        profiles: &[Connection],
    ) -> IndexUpdate {
        let networks = self
            .devices
            .entry(device.path.clone())
            .or_insert_with(|| DeviceNetworks::new(device.clone()));

        if networks.aps.contains_key(ap.path()) {
            debug!(device = %device.path, ap = %ap.path(), "Access point already indexed");
            return IndexUpdate::UNCHANGED;
        }

        let path = ap.path().to_owned();

        if ap.is_hidden() {
            debug!(device = %device.path, ap = %path, "Skipping hidden network");
            networks.aps.insert(path, ap);
            return IndexUpdate::UNCHANGED;
        }

        networks.place(&ap, profiles);
        networks.aps.insert(path, ap);
        IndexUpdate::CHANGED
    }

    /// Show a hidden AP whose SSID has since become known.
    ///
    /// Only APs that are indexed but not yet merged into an entry are placed;
    /// an AP already shown stays in its entry.
    pub fn on_ap_revealed(&mut self, device: &str, ap: &str, profiles: &[Connection]) -> IndexUpdate {
        let Some(networks) = self.devices.get_mut(device) else {
            return IndexUpdate::UNCHANGED;
        };
        if networks.entry_index_of(ap).is_some() {
            return IndexUpdate::UNCHANGED;
        }
        let Some(record) = networks.aps.get(ap).filter(|record| !record.is_hidden()) else {
            return IndexUpdate::UNCHANGED;
        };

        let record = record.clone();
        debug!(device, ap, "Hidden network revealed its SSID");
        networks.place(&record, profiles);
        IndexUpdate::CHANGED
    }

    /// Record a new signal strength for an AP.
    ///
    /// The owning entry's best strength is only ever raised here.
    pub fn on_ap_strength_changed(&mut self, device: &str, ap: &str, strength: u8) -> IndexUpdate {
        let Some(networks) = self.devices.get_mut(device) else {
            warn!(device, ap, "Strength change for unknown device");
            return IndexUpdate::UNCHANGED;
        };
        let Some(record) = networks.aps.get_mut(ap) else {
            warn!(device, ap, "Strength change for unknown access point");
            return IndexUpdate::UNCHANGED;
        };
        record.apply(ApChange::Strength(strength));
        let strength = record.strength();

        let Some(index) = networks.entry_index_of(ap) else {
            return IndexUpdate::UNCHANGED;
        };

        IndexUpdate {
            changed: networks.entries[index].raise_strength(strength),
            refresh_needed: false,
        }
    }

    /// Forget an access point that went out of range.
    ///
    /// The owning entry loses the member and its best strength is recomputed
    /// from the remaining members; an entry left without members is dropped.
    pub fn on_ap_removed(&mut self, device: &str, ap: &str) -> IndexUpdate {
        let Some(networks) = self.devices.get_mut(device) else {
            warn!(device, ap, "Removal for unknown device");
            return IndexUpdate::UNCHANGED;
        };
        if networks.aps.remove(ap).is_none() {
            warn!(device, ap, "Removal of unknown access point");
            return IndexUpdate::UNCHANGED;
        }

        let mut update = IndexUpdate::UNCHANGED;

        if let Some(index) = networks.entry_index_of(ap) {
            let entry = &mut networks.entries[index];
            entry.remove_member(ap);

            if entry.members().is_empty() {
                networks.entries.remove(index);
            } else {
                let best = entry
                    .members()
                    .iter()
                    .filter_map(|member| networks.aps.get(member))
                    .map(AccessPointRecord::strength)
                    .max()
                    .unwrap_or_default();
                entry.set_best_strength(best);
            }
            update.changed = true;
        }

        if networks.active_ap.as_deref() == Some(ap) {
            networks.active_ap = None;
            update.refresh_needed = true;
        }

        update
    }

    /// Apply a property change to an AP.
    ///
    /// Changes to the SSID, mode, frequency or security flags recompute the
    /// cached fingerprint but leave the AP in the entry it was merged into.
    pub fn on_ap_property_changed(&mut self, device: &str, ap: &str, change: ApChange) -> IndexUpdate {
        if let ApChange::Strength(strength) = change {
            return self.on_ap_strength_changed(device, ap, strength);
        }

        let Some(record) = self
            .devices
            .get_mut(device)
            .and_then(|networks| networks.aps.get_mut(ap))
        else {
            warn!(device, ap, "Property change for unknown access point");
            return IndexUpdate::UNCHANGED;
        };

        if record.apply(change) {
            debug!(device, ap, fingerprint = %record.fingerprint(), "Recomputed fingerprint");
        }
        IndexUpdate::UNCHANGED
    }

    /// Mark the AP the device is associated with.
    pub fn set_active_ap(&mut self, device: &str, ap: Option<&str>) {
        if let Some(networks) = self.devices.get_mut(device) {
            networks.active_ap = ap.filter(|ap| *ap != "/").map(str::to_owned);
        }
    }

    /// The AP the device is associated with.
    pub fn active_ap(&self, device: &str) -> Option<&str> {
        self.devices.get(device)?.active_ap.as_deref()
    }

    /// Re-attach applicable profiles to every entry of a device.
    pub fn refresh_profiles(&mut self, device: &str, profiles: &[Connection]) -> IndexUpdate {
        let Some(networks) = self.devices.get_mut(device) else {
            return IndexUpdate::UNCHANGED;
        };

        let mut rebuilt = Vec::with_capacity(networks.entries.len());
        for entry in &networks.entries {
            let Some(first) = entry.members().iter().find_map(|m| networks.aps.get(m)) else {
                rebuilt.push(entry.clone());
                continue;
            };
            let applicable = profiles
                .iter()
                .filter(|profile| profile_applies_to(profile, &networks.device, Some(first)))
                .cloned()
                .collect();

            let mut refreshed = MergedNetworkEntry::new(first, applicable);
            for member in entry.members() {
                if let Some(record) = networks.aps.get(member) {
                    refreshed.add_member(record);
                }
            }
            refreshed.set_best_strength(entry.best_strength().max(refreshed.best_strength()));
            rebuilt.push(refreshed);
        }

        let changed = rebuilt != networks.entries;
        networks.entries = rebuilt;
        IndexUpdate {
            changed,
            refresh_needed: false,
        }
    }

    /// The device's entries in menu order.
    pub fn current_entries(&self, device: &str) -> Vec<MergedNetworkEntry> {
        let mut entries = self
            .devices
            .get(device)
            .map(|networks| networks.entries.clone())
            .unwrap_or_default();
        sort_for_display(&mut entries);
        entries
    }

    /// The entry an AP was merged into.
    pub fn find_entry_containing(&self, device: &str, ap: &str) -> Option<&MergedNetworkEntry> {
        let networks = self.devices.get(device)?;
        networks.entries.iter().find(|entry| entry.contains(ap))
    }

    /// Every AP indexed for a device, hidden networks included.
    pub fn access_points_of(&self, device: &str) -> Vec<ObjectPath> {
        self.devices
            .get(device)
            .map(|networks| networks.aps.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The indexed record of an AP.
    pub fn access_point(&self, device: &str, ap: &str) -> Option<&AccessPointRecord> {
        self.devices.get(device)?.aps.get(ap)
    }
}
