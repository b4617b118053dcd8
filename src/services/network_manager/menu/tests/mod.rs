//! Unit tests for the merge index and menu ordering
//!
//! Drives the index with synthetic events; no bus access.

#![allow(clippy::panic)]

use tokio::sync::mpsc;

use crate::services::network_manager::{
    DeviceInfo, NM80211ApFlags, NM80211ApSecurityFlags, NM80211Mode, NMDeviceWifiCapabilities,
    access_point::{AccessPointRecord, ApChange, ApUpdate, SSID},
    connection::{Connection, SettingValue, names::WIRELESS},
    menu::{ApMergeIndex, MenuEvent, NetworkMenu, sort_for_display},
};

const DEVICE: &str = "/org/freedesktop/NetworkManager/Devices/3";

fn device() -> DeviceInfo {
    DeviceInfo::wifi(
        DEVICE,
        Some("00:11:22:33:44:55"),
        NMDeviceWifiCapabilities::WPA | NMDeviceWifiCapabilities::CIPHER_TKIP,
    )
}

fn ap(path: &str, ssid: &str, strength: u8) -> AccessPointRecord {
    AccessPointRecord::new(path, Some(SSID::from(ssid))).with_strength(strength)
}

fn wpa_ap(path: &str, ssid: &str, strength: u8) -> AccessPointRecord {
    ap(path, ssid, strength).with_security(
        NM80211ApFlags::PRIVACY,
        NM80211ApSecurityFlags::KEY_MGMT_PSK,
        NM80211ApSecurityFlags::NONE,
    )
}

fn open_profile(uuid: &str, ssid: &str) -> Connection {
    let mut connection = Connection::with_identity(uuid, ssid, WIRELESS);
    connection.set(WIRELESS, "ssid", SettingValue::from(ssid.as_bytes().to_vec()));
    connection
}

#[test]
fn same_fingerprint_merges_in_either_order() {
    for order in [[0usize, 1], [1, 0]] {
        let aps = [ap("/ap/1", "cafe", 30), ap("/ap/2", "cafe", 70)];
        let mut index = ApMergeIndex::new();

        for i in order {
            index.on_ap_added(&device(), aps[i].clone(), &[]);
        }

        let entries = index.current_entries(DEVICE);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].members().len(), 2);
        assert_eq!(entries[0].best_strength(), 70);
    }
}

#[test]
fn different_security_makes_separate_entries() {
    let mut index = ApMergeIndex::new();
    index.on_ap_added(&device(), ap("/ap/1", "cafe", 30), &[]);
    index.on_ap_added(&device(), wpa_ap("/ap/2", "cafe", 30), &[]);

    assert_eq!(index.current_entries(DEVICE).len(), 2);
}

#[test]
fn removing_members_shrinks_then_destroys_entry() {
    let mut index = ApMergeIndex::new();
    index.on_ap_added(&device(), ap("/ap/1", "cafe", 30), &[]);
    index.on_ap_added(&device(), ap("/ap/2", "cafe", 70), &[]);

    let update = index.on_ap_removed(DEVICE, "/ap/2");
    assert!(update.changed);
    let entries = index.current_entries(DEVICE);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].members().len(), 1);
    assert_eq!(entries[0].best_strength(), 30, "recomputed from remaining members");

    index.on_ap_removed(DEVICE, "/ap/1");
    assert!(index.current_entries(DEVICE).is_empty());
    assert!(index.find_entry_containing(DEVICE, "/ap/1").is_none());
}

#[test]
fn strength_updates_only_raise() {
    let mut index = ApMergeIndex::new();
    index.on_ap_added(&device(), ap("/ap/1", "cafe", 50), &[]);

    assert!(!index.on_ap_strength_changed(DEVICE, "/ap/1", 20).changed);
    assert_eq!(index.current_entries(DEVICE)[0].best_strength(), 50);
    assert_eq!(index.access_point(DEVICE, "/ap/1").map(AccessPointRecord::strength), Some(20));

    assert!(index.on_ap_strength_changed(DEVICE, "/ap/1", 90).changed);
    assert_eq!(index.current_entries(DEVICE)[0].best_strength(), 90);
}

#[test]
fn hidden_networks_are_not_indexed() {
    let mut index = ApMergeIndex::new();
    let update = index.on_ap_added(&device(), AccessPointRecord::new("/ap/h", None), &[]);

    assert!(!update.changed);
    assert!(index.current_entries(DEVICE).is_empty());
    assert!(!index.on_ap_removed(DEVICE, "/ap/h").changed);
}

#[test]
fn unknown_device_and_ap_are_ignored() {
    let mut index = ApMergeIndex::new();
    index.on_ap_added(&device(), ap("/ap/1", "cafe", 50), &[]);

    assert_eq!(index.on_ap_removed("/nope", "/ap/1"), Default::default());
    assert_eq!(index.on_ap_removed(DEVICE, "/ap/404"), Default::default());
    assert_eq!(
        index.on_ap_property_changed(DEVICE, "/ap/404", ApChange::Frequency(2412)),
        Default::default()
    );
    assert_eq!(index.current_entries(DEVICE).len(), 1);
}

#[test]
fn removing_active_ap_requests_refresh() {
    let mut index = ApMergeIndex::new();
    index.on_ap_added(&device(), ap("/ap/1", "cafe", 50), &[]);
    index.set_active_ap(DEVICE, Some("/ap/1"));

    let update = index.on_ap_removed(DEVICE, "/ap/1");

    assert!(update.refresh_needed);
    assert_eq!(index.active_ap(DEVICE), None);
}

#[test]
fn fingerprint_change_does_not_move_member() {
    let mut index = ApMergeIndex::new();
    index.on_ap_added(&device(), ap("/ap/1", "cafe", 50), &[]);
    let merged_under = index.current_entries(DEVICE)[0].fingerprint();

    index.on_ap_property_changed(DEVICE, "/ap/1", ApChange::Flags(NM80211ApFlags::PRIVACY));

    let recomputed = index
        .access_point(DEVICE, "/ap/1")
        .map(AccessPointRecord::fingerprint);
    assert_ne!(recomputed, Some(merged_under));
    let entry = index.find_entry_containing(DEVICE, "/ap/1");
    assert_eq!(entry.map(|e| e.fingerprint()), Some(merged_under));
}

#[test]
fn new_entries_carry_applicable_profiles() {
    let profiles = vec![open_profile("a", "cafe"), open_profile("b", "library")];
    let mut index = ApMergeIndex::new();

    index.on_ap_added(&device(), ap("/ap/1", "cafe", 50), &profiles);

    let entries = index.current_entries(DEVICE);
    let uuids: Vec<_> = entries[0].profiles().iter().filter_map(Connection::uuid).collect();
    assert_eq!(uuids, vec!["a"]);
}

#[test]
fn display_order() {
    let mut index = ApMergeIndex::new();
    index.on_ap_added(&device(), ap("/ap/1", "beta", 10), &[]);
    index.on_ap_added(&device(), ap("/ap/2", "Alpha", 10), &[]);
    index.on_ap_added(&device(), ap("/ap/3", "alp", 10), &[]);
    index.on_ap_added(
        &device(),
        ap("/ap/4", "beta", 10).with_mode(NM80211Mode::Adhoc),
        &[],
    );

    let order: Vec<_> = index
        .current_entries(DEVICE)
        .iter()
        .map(|e| (e.display_ssid(), e.mode()))
        .collect();

    assert_eq!(
        order,
        vec![
            ("alp".to_string(), NM80211Mode::Infra),
            ("Alpha".to_string(), NM80211Mode::Infra),
            ("beta".to_string(), NM80211Mode::Adhoc),
            ("beta".to_string(), NM80211Mode::Infra),
        ]
    );
}

#[test]
fn sort_is_case_insensitive_on_bytes() {
    let mut index = ApMergeIndex::new();
    index.on_ap_added(&device(), ap("/ap/1", "b", 10), &[]);
    index.on_ap_added(&device(), ap("/ap/2", "A", 10), &[]);

    let mut entries = index.current_entries(DEVICE);
    entries.reverse();
    sort_for_display(&mut entries);

    assert_eq!(entries[0].display_ssid(), "A");
}

#[test]
fn menu_publishes_entries() {
    let mut menu = NetworkMenu::new(device(), vec![open_profile("a", "cafe")]);

    menu.apply(MenuEvent::Added(ap("/ap/1", "cafe", 40)));
    menu.apply(MenuEvent::Changed(ApUpdate {
        path: "/ap/1".to_string(),
        change: ApChange::Strength(80),
    }));

    let entries = menu.entries.get();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].best_strength(), 80);
    assert_eq!(entries[0].profiles().len(), 1);
    assert!(menu.find_entry_containing("/ap/1").is_some());
}

#[test]
fn menu_counts_refresh_requests() {
    let mut menu = NetworkMenu::new(device(), Vec::new());
    menu.apply(MenuEvent::Added(ap("/ap/1", "cafe", 40)));
    menu.apply(MenuEvent::ActiveChanged(Some("/ap/1".to_string())));

    menu.apply(MenuEvent::Removed("/ap/1".to_string()));

    assert_eq!(menu.refresh_requests.get(), 1);
    assert!(menu.entries.get().is_empty());
}

#[test]
fn menu_reattaches_profiles() {
    let mut menu = NetworkMenu::new(device(), Vec::new());
    menu.apply(MenuEvent::Added(ap("/ap/1", "cafe", 40)));
    assert!(menu.entries.get()[0].profiles().is_empty());

    let update = menu.apply(MenuEvent::ProfilesChanged(vec![open_profile("a", "cafe")]));

    assert!(update.changed);
    assert_eq!(menu.entries.get()[0].profiles().len(), 1);
    assert_eq!(menu.entries.get()[0].best_strength(), 40);
}

#[test]
fn hidden_networks_stay_listed_for_monitoring() {
    let mut index = ApMergeIndex::new();
    index.on_ap_added(&device(), ap("/ap/1", "cafe", 50), &[]);
    index.on_ap_added(&device(), AccessPointRecord::new("/ap/h", None), &[]);

    let mut paths = index.access_points_of(DEVICE);
    paths.sort();
    assert_eq!(paths, vec!["/ap/1".to_owned(), "/ap/h".to_owned()]);
    assert!(index.access_points_of("/org/freedesktop/NetworkManager/Devices/99").is_empty());
}

#[test]
fn revealed_ssid_merges_into_matching_entry() {
    let mut index = ApMergeIndex::new();
    index.on_ap_added(&device(), ap("/ap/1", "cafe", 50), &[]);
    index.on_ap_added(&device(), AccessPointRecord::new("/ap/h", None), &[]);

    index.on_ap_property_changed(DEVICE, "/ap/h", ApChange::Ssid(b"cafe".to_vec()));
    assert!(index.on_ap_revealed(DEVICE, "/ap/h", &[]).changed);

    let entries = index.current_entries(DEVICE);
    assert_eq!(entries.len(), 1);
    assert!(entries[0].contains("/ap/h"));
    assert!(!index.on_ap_revealed(DEVICE, "/ap/h", &[]).changed);
}

#[tokio::test]
async fn run_shows_hidden_network_once_its_ssid_arrives() {
    let menu = NetworkMenu::new(device(), vec![open_profile("a", "attic")]);
    let entries = menu.entries.clone();
    let (events, rx) = mpsc::unbounded_channel();

    events
        .send(MenuEvent::Added(AccessPointRecord::new("/ap/h", None).with_strength(30)))
        .unwrap();
    events
        .send(MenuEvent::Added(ap("/ap/1", "cafe", 60)))
        .unwrap();
    events
        .send(MenuEvent::Changed(ApUpdate {
            path: "/ap/h".to_owned(),
            change: ApChange::Ssid(b"attic".to_vec()),
        }))
        .unwrap();
    events
        .send(MenuEvent::Changed(ApUpdate {
            path: "/ap/h".to_owned(),
            change: ApChange::Strength(70),
        }))
        .unwrap();
    drop(events);

    let menu = menu.run(rx).await;

    let shown = entries.get();
    assert_eq!(shown.len(), 2);
    assert_eq!(shown[0].display_ssid(), "attic");
    assert_eq!(shown[0].best_strength(), 70);
    assert_eq!(shown[0].profiles().len(), 1);
    assert!(menu.find_entry_containing("/ap/h").is_some());
}

#[tokio::test]
async fn run_stops_when_senders_are_dropped() {
    let menu = NetworkMenu::new(device(), Vec::new());
    let (events, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(menu.run(rx));

    events.send(MenuEvent::Added(ap("/ap/1", "cafe", 40))).unwrap();
    events.send(MenuEvent::Removed("/ap/1".to_owned())).unwrap();
    drop(events);

    let menu = task.await.unwrap();
    assert!(menu.entries.get().is_empty());
    assert!(menu.index().access_points_of(DEVICE).is_empty());
}
