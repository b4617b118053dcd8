use std::{collections::HashMap, sync::Arc};

use futures::StreamExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, instrument, warn};
use zbus::{Connection, zvariant::OwnedObjectPath};

use super::{ApMergeIndex, IndexUpdate, MergedNetworkEntry};
use crate::services::{
    common::{ObjectPath, Property},
    network_manager::{
        DeviceInfo, DeviceWirelessProxy, NetworkError,
        access_point::{AccessPointMonitor, AccessPointRecord, ApChange, ApUpdate},
        connection::{Connection as Profile, ConnectionStore},
    },
};

/// An event for one device's menu, in daemon delivery order.
#[derive(Debug, Clone)]
pub enum MenuEvent {
    /// An access point became visible.
    Added(AccessPointRecord),
    /// An access point went out of range.
    Removed(ObjectPath),
    /// A property of an access point changed.
    Changed(ApUpdate),
    /// The device associated with another AP, or none.
    ActiveChanged(Option<ObjectPath>),
    /// The saved profiles changed.
    ProfilesChanged(Vec<Profile>),
}

/// The deduplicated network menu of one Wi-Fi device.
///
/// Entries are republished in menu order after every event that changes
/// them.
#[derive(Debug)]
pub struct NetworkMenu {
    device: DeviceInfo,
    index: ApMergeIndex,
    profiles: Vec<Profile>,
    /// Entries in menu order.
    pub entries: Property<Vec<MergedNetworkEntry>>,
    /// Bumped whenever the active AP disappears and the view must be rebuilt.
    pub refresh_requests: Property<u64>,
}

impl NetworkMenu {
    /// Create an empty menu for a device.
    pub fn new(device: DeviceInfo, profiles: Vec<Profile>) -> Self {
        let mut index = ApMergeIndex::new();
        index.add_device(device.clone());

        Self {
            device,
            index,
            profiles,
            entries: Property::new(Vec::new()),
            refresh_requests: Property::new(0),
        }
    }

    /// The device this menu belongs to.
    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    /// The underlying merge index.
    pub fn index(&self) -> &ApMergeIndex {
        &self.index
    }

    /// The entry an AP was merged into.
    pub fn find_entry_containing(&self, ap: &str) -> Option<&MergedNetworkEntry> {
        self.index.find_entry_containing(&self.device.path, ap)
    }

    /// Apply one event and republish the entries if they changed.
    pub fn apply(&mut self, event: MenuEvent) -> IndexUpdate {
        let device = self.device.path.as_str();

        let update = match event {
            MenuEvent::Added(ap) => self.index.on_ap_added(&self.device, ap, &self.profiles),
            MenuEvent::Removed(ap) => self.index.on_ap_removed(device, &ap),
            MenuEvent::Changed(ApUpdate { path, change }) => {
                let ssid_changed = matches!(change, ApChange::Ssid(_));
                let mut update = self.index.on_ap_property_changed(device, &path, change);
                if ssid_changed {
                    update.changed |= self
                        .index
                        .on_ap_revealed(device, &path, &self.profiles)
                        .changed;
                }
                update
            }
            MenuEvent::ActiveChanged(ap) => {
                self.index.set_active_ap(device, ap.as_deref());
                IndexUpdate::default()
            }
            MenuEvent::ProfilesChanged(profiles) => {
                self.profiles = profiles;
                self.index.refresh_profiles(device, &self.profiles)
            }
        };

        if update.changed {
            self.entries.set(self.index.current_entries(device));
        }
        if update.refresh_needed {
            debug!(device, "Active access point vanished, requesting refresh");
            self.refresh_requests.set(self.refresh_requests.get().wrapping_add(1));
        }

        update
    }

    /// Build a menu from the device's currently visible access points.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::DbusError` if the device cannot be queried, or
    /// any error from listing saved profiles.
    #[instrument(skip(connection, store), fields(device = %device_path))]
    pub async fn load(
        connection: &Connection,
        device_path: OwnedObjectPath,
        store: &dyn ConnectionStore,
    ) -> Result<Self, NetworkError> {
        let device = DeviceInfo::from_path(connection, device_path.clone()).await?;
        let profiles = store.list().await?;
        let mut menu = Self::new(device, profiles);

        let wireless = DeviceWirelessProxy::new(connection, device_path).await?;
        for path in wireless.get_all_access_points().await? {
            match AccessPointRecord::from_path(connection, path.clone()).await {
                Ok(ap) => {
                    menu.apply(MenuEvent::Added(ap));
                }
                Err(e) => debug!(ap = %path, error = %e, "Skipping vanished access point"),
            }
        }

        if let Ok(active) = wireless.active_access_point().await {
            menu.apply(MenuEvent::ActiveChanged(Some(active.to_string())));
        }

        info!(entries = menu.entries.get().len(), "Network menu loaded");
        Ok(menu)
    }

    /// Apply events until every sender is dropped, then hand the menu back.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<MenuEvent>) -> Self {
        while let Some(event) = events.recv().await {
            self.apply(event);
        }
        debug!(device = %self.device.path, "Menu event channel closed");
        self
    }

    /// Keep the menu in step with the daemon until the handle is dropped.
    ///
    /// Every indexed AP is monitored, hidden networks included, so one that
    /// later broadcasts its SSID shows up in the menu.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::DbusError` if the device signals cannot be
    /// subscribed to.
    pub async fn watch(self, connection: Connection) -> Result<NetworkMenuHandle, NetworkError> {
        let device = self.device.path.clone();
        let wireless = DeviceWirelessProxy::new(&connection, device.clone()).await?;
        let mut ap_added = wireless.receive_access_point_added().await?;
        let mut ap_removed = wireless.receive_access_point_removed().await?;
        let mut active_changes = wireless.receive_active_access_point_changed().await;

        let (updates_tx, mut updates_rx) = mpsc::unbounded_channel::<ApUpdate>();
        let mut monitors: HashMap<ObjectPath, JoinHandle<()>> = HashMap::new();
        for ap in self.index.access_points_of(&device) {
            let Ok(path) = OwnedObjectPath::try_from(ap.as_str()) else {
                continue;
            };
            if let Some(handle) =
                AccessPointMonitor::start(&connection, path, updates_tx.clone()).await
            {
                monitors.insert(ap, handle);
            }
        }

        let entries = self.entries.clone();
        let refresh_requests = self.refresh_requests.clone();
        let (events_tx, events_rx) = mpsc::unbounded_channel::<MenuEvent>();
        let menu = tokio::spawn(async move {
            self.run(events_rx).await;
        });

        let signals = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    Some(added) = ap_added.next() => {
                        let Ok(args) = added.args() else { continue };
                        let path = args.access_point.clone();
                        let ap = match AccessPointRecord::from_path(&connection, path.clone()).await {
                            Ok(ap) => ap,
                            Err(e) => {
                                debug!(ap = %path, error = %e, "Added access point vanished");
                                continue;
                            }
                        };
                        if let Some(handle) =
                            AccessPointMonitor::start(&connection, path.clone(), updates_tx.clone()).await
                        {
                            monitors.insert(path.to_string(), handle);
                        }
                        MenuEvent::Added(ap)
                    }
                    Some(removed) = ap_removed.next() => {
                        let Ok(args) = removed.args() else { continue };
                        let path = args.access_point.to_string();
                        if let Some(handle) = monitors.remove(&path) {
                            handle.abort();
                        }
                        MenuEvent::Removed(path)
                    }
                    Some(change) = active_changes.next() => {
                        let Ok(active) = change.get().await else { continue };
                        MenuEvent::ActiveChanged(Some(active.to_string()))
                    }
                    Some(update) = updates_rx.recv() => MenuEvent::Changed(update),
                    else => {
                        warn!(device = %device, "Device signal streams ended");
                        break;
                    }
                };

                if events_tx.send(event).is_err() {
                    debug!(device = %device, "Menu stopped, dropping device signals");
                    break;
                }
            }

            for (_, handle) in monitors {
                handle.abort();
            }
        });

        Ok(NetworkMenuHandle {
            entries,
            refresh_requests,
            tasks: Arc::new([signals, menu]),
        })
    }
}

/// A live network menu. Monitoring stops when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct NetworkMenuHandle {
    /// Entries in menu order.
    pub entries: Property<Vec<MergedNetworkEntry>>,
    /// Bumped whenever the active AP disappears and the view must be rebuilt.
    pub refresh_requests: Property<u64>,
    tasks: Arc<[JoinHandle<()>; 2]>,
}

impl Drop for NetworkMenuHandle {
    fn drop(&mut self) {
        if Arc::strong_count(&self.tasks) == 1 {
            self.tasks.iter().for_each(JoinHandle::abort);
        }
    }
}
