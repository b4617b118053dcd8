use futures::StreamExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;
use zbus::{Connection, zvariant::OwnedObjectPath};

use super::ApChange;
use crate::services::{
    common::ObjectPath,
    network_manager::{AccessPointProxy, NM80211ApFlags, NM80211ApSecurityFlags, NM80211Mode},
};

/// A property change observed on one access point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApUpdate {
    /// Identity of the access point.
    pub path: ObjectPath,
    /// What changed.
    pub change: ApChange,
}

/// Forwards an access point's D-Bus property changes as `ApUpdate` events.
///
/// All changes of one AP are delivered through a single task, so they reach
/// the receiver in the order the daemon emitted them.
pub struct AccessPointMonitor;

impl AccessPointMonitor {
    /// Start monitoring the AP at `path`.
    ///
    /// The task ends when the receiver is dropped, when the AP's property
    /// streams end, or when the returned handle is aborted.
    pub async fn start(
        connection: &Connection,
        path: OwnedObjectPath,
        sender: mpsc::UnboundedSender<ApUpdate>,
    ) -> Option<JoinHandle<()>> {
        let Ok(proxy) = AccessPointProxy::new(connection, path.clone()).await else {
            debug!(ap = %path, "Failed to create proxy for access point monitoring");
            return None;
        };

        Some(tokio::spawn(async move {
            Self::monitor(path.to_string(), proxy, sender).await;
        }))
    }

    #[allow(clippy::cognitive_complexity)]
    async fn monitor(
        path: ObjectPath,
        proxy: AccessPointProxy<'static>,
        sender: mpsc::UnboundedSender<ApUpdate>,
    ) {
        let mut flag_changes = proxy.receive_flags_changed().await;
        let mut wpa_flags_changes = proxy.receive_wpa_flags_changed().await;
        let mut rsn_flags_changes = proxy.receive_rsn_flags_changed().await;
        let mut ssid_changes = proxy.receive_ssid_changed().await;
        let mut frequency_changes = proxy.receive_frequency_changed().await;
        let mut hw_address_changes = proxy.receive_hw_address_changed().await;
        let mut mode_changes = proxy.receive_mode_changed().await;
        let mut strength_changes = proxy.receive_strength_changed().await;

        loop {
            let change = tokio::select! {
                Some(change) = flag_changes.next() => {
                    change.get().await.ok().map(|raw| ApChange::Flags(NM80211ApFlags::from_bits_truncate(raw)))
                }
                Some(change) = wpa_flags_changes.next() => {
                    change.get().await.ok().map(|raw| ApChange::WpaFlags(NM80211ApSecurityFlags::from_bits_truncate(raw)))
                }
                Some(change) = rsn_flags_changes.next() => {
                    change.get().await.ok().map(|raw| ApChange::RsnFlags(NM80211ApSecurityFlags::from_bits_truncate(raw)))
                }
                Some(change) = ssid_changes.next() => {
                    change.get().await.ok().map(ApChange::Ssid)
                }
                Some(change) = frequency_changes.next() => {
                    change.get().await.ok().map(ApChange::Frequency)
                }
                Some(change) = hw_address_changes.next() => {
                    change.get().await.ok().map(ApChange::HwAddress)
                }
                Some(change) = mode_changes.next() => {
                    change.get().await.ok().map(|raw| ApChange::Mode(NM80211Mode::from_u32(raw)))
                }
                Some(change) = strength_changes.next() => {
                    change.get().await.ok().map(ApChange::Strength)
                }
                else => {
                    debug!(ap = %path, "All property streams ended for access point");
                    break;
                }
            };

            let Some(change) = change else {
                continue;
            };

            let update = ApUpdate {
                path: path.clone(),
                change,
            };
            if sender.send(update).is_err() {
                debug!(ap = %path, "Receiver dropped, stopping access point monitor");
                return;
            }
        }

        debug!(ap = %path, "Property monitoring ended for access point");
    }
}
