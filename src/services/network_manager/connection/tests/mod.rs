//! Unit tests for connection profiles
//!
//! Covers secret flag lookup, secret extraction and staging, wire
//! marshalling, profile matching and the in-memory store.

#![allow(clippy::panic)]

use std::collections::BTreeMap;

use crate::services::network_manager::{
    DeviceInfo, NM80211ApFlags, NM80211ApSecurityFlags, NM80211Mode, NMDeviceWifiCapabilities,
    NMSettingSecretFlags,
    access_point::{AccessPointRecord, SSID},
    connection::{
        Connection, ConnectionSecrets, ConnectionStore, MemoryConnectionStore, SecretsMap,
        SettingValue, matching::parse_mac,
        names::{IEEE_8021X, PATH_PRIVATE_KEY_TAG, VPN, WIRELESS, WIRELESS_SECURITY},
        profile_applies_to, wipe_secrets,
    },
};

fn wifi_profile(ssid: &str) -> Connection {
    let mut connection = Connection::with_identity("uuid-1", "Home", WIRELESS);
    connection.set(WIRELESS, "ssid", SettingValue::from(ssid.as_bytes().to_vec()));
    connection
}

fn psk_profile(ssid: &str, psk: &str, flags: NMSettingSecretFlags) -> Connection {
    let mut connection = wifi_profile(ssid);
    connection.set(WIRELESS, "security", SettingValue::from(WIRELESS_SECURITY));
    connection.set(WIRELESS_SECURITY, "key-mgmt", SettingValue::from("wpa-psk"));
    connection.set(WIRELESS_SECURITY, "psk", SettingValue::from(psk));
    connection.set(WIRELESS_SECURITY, "psk-flags", SettingValue::from(flags.bits()));
    connection
}

fn vpn_profile() -> Connection {
    let mut connection = Connection::with_identity("uuid-vpn", "Office", VPN);
    connection.set(
        VPN,
        "service-type",
        SettingValue::from("org.freedesktop.NetworkManager.openvpn"),
    );
    connection.set(
        VPN,
        "data",
        SettingValue::from(BTreeMap::from([
            ("password-flags".to_string(), "1".to_string()),
            ("otp-flags".to_string(), "2".to_string()),
        ])),
    );
    connection.set(
        VPN,
        "secrets",
        SettingValue::from(BTreeMap::from([("password".to_string(), "hunter2".to_string())])),
    );
    connection
}

fn wifi_device() -> DeviceInfo {
    DeviceInfo::wifi(
        "/dev/wlan0",
        Some("00:11:22:33:44:55"),
        NMDeviceWifiCapabilities::WPA
            | NMDeviceWifiCapabilities::RSN
            | NMDeviceWifiCapabilities::CIPHER_TKIP
            | NMDeviceWifiCapabilities::CIPHER_CCMP,
    )
}

fn psk_ap(ssid: &str) -> AccessPointRecord {
    AccessPointRecord::new("/ap/1", Some(SSID::from(ssid)))
        .with_security(
            NM80211ApFlags::PRIVACY,
            NM80211ApSecurityFlags::NONE,
            NM80211ApSecurityFlags::KEY_MGMT_PSK | NM80211ApSecurityFlags::PAIR_CCMP,
        )
        .with_frequency(2437)
        .with_hw_address("AA:BB:CC:DD:EE:FF")
}

#[test]
fn identity_accessors() {
    let connection = Connection::with_identity("abc", "Cafe", WIRELESS);

    assert_eq!(connection.uuid(), Some("abc"));
    assert_eq!(connection.id(), Some("Cafe"));
    assert_eq!(connection.connection_type(), Some(WIRELESS));
    assert!(!connection.is_vpn());
    assert!(vpn_profile().is_vpn());
    assert_eq!(
        vpn_profile().vpn_service_type(),
        Some("org.freedesktop.NetworkManager.openvpn")
    );
}

#[test]
fn missing_flags_mean_system_owned() {
    let mut connection = wifi_profile("home");
    connection.set(WIRELESS_SECURITY, "psk", SettingValue::from("secret"));

    assert_eq!(
        connection.secret_flags(WIRELESS_SECURITY, "psk"),
        NMSettingSecretFlags::NONE
    );
}

#[test]
fn wep_keys_share_one_flags_property() {
    let mut connection = wifi_profile("home");
    connection.set(
        WIRELESS_SECURITY,
        "wep-key-flags",
        SettingValue::from(NMSettingSecretFlags::AGENT_OWNED.bits()),
    );

    assert_eq!(
        connection.secret_flags(WIRELESS_SECURITY, "wep-key2"),
        NMSettingSecretFlags::AGENT_OWNED
    );
}

#[test]
fn vpn_flags_come_from_data_map() {
    let connection = vpn_profile();

    assert_eq!(
        connection.secret_flags(VPN, "password"),
        NMSettingSecretFlags::AGENT_OWNED
    );
    assert_eq!(connection.secret_flags(VPN, "otp"), NMSettingSecretFlags::NOT_SAVED);
    assert!(connection.is_always_ask(VPN));
}

#[test]
fn always_ask_requires_not_saved_flag() {
    let agent = psk_profile("home", "pw", NMSettingSecretFlags::AGENT_OWNED);
    let not_saved = psk_profile("home", "", NMSettingSecretFlags::NOT_SAVED);

    assert!(!agent.is_always_ask(WIRELESS_SECURITY));
    assert!(not_saved.is_always_ask(WIRELESS_SECURITY));
    assert!(!not_saved.is_always_ask(IEEE_8021X));
}

#[test]
fn secret_entries_skip_empty_values() {
    let mut connection = psk_profile("home", "pw", NMSettingSecretFlags::AGENT_OWNED);
    connection.set(WIRELESS_SECURITY, "leap-password", SettingValue::from(""));

    let entries = connection.secret_entries();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].setting, WIRELESS_SECURITY);
    assert_eq!(entries[0].key, "psk");
    assert_eq!(entries[0].value, "pw");
    assert_eq!(entries[0].flags, NMSettingSecretFlags::AGENT_OWNED);
}

#[test]
fn vpn_secret_entries_are_per_key() {
    let entries_owner = vpn_profile();
    let entries = entries_owner.secret_entries();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "password");
    assert_eq!(entries[0].flags, NMSettingSecretFlags::AGENT_OWNED);
}

#[test]
fn secrets_for_returns_only_secret_properties() {
    let connection = psk_profile("home", "pw", NMSettingSecretFlags::AGENT_OWNED);

    let secrets = connection.secrets_for(WIRELESS_SECURITY);

    assert_eq!(secrets.len(), 1);
    assert_eq!(secrets.get("psk").and_then(SettingValue::as_str), Some("pw"));
    assert!(connection.secrets_for(IEEE_8021X).is_empty());
}

#[test]
fn stage_secrets_merges_vpn_map() {
    let mut connection = vpn_profile();
    let staged = SecretsMap::from([("otp".to_string(), SettingValue::from("123456"))]);

    connection.stage_secrets(VPN, &staged);

    let secrets = connection
        .get(VPN, "secrets")
        .and_then(SettingValue::as_str_map)
        .cloned()
        .unwrap_or_default();
    assert_eq!(secrets.get("password").map(String::as_str), Some("hunter2"));
    assert_eq!(secrets.get("otp").map(String::as_str), Some("123456"));
}

#[test]
fn without_secrets_strips_values_and_keeps_flags() {
    let connection = psk_profile("home", "pw", NMSettingSecretFlags::AGENT_OWNED);

    let stripped = connection.without_secrets();

    assert!(stripped.get(WIRELESS_SECURITY, "psk").is_none());
    assert_eq!(
        stripped.secret_flags(WIRELESS_SECURITY, "psk"),
        NMSettingSecretFlags::AGENT_OWNED
    );
    assert_eq!(
        connection.string(WIRELESS_SECURITY, "psk"),
        Some("pw"),
        "original keeps its secrets"
    );
    assert!(vpn_profile().without_secrets().get(VPN, "secrets").is_none());
}

#[test]
fn debug_output_redacts_secrets() {
    let connection = psk_profile("home", "supersecret", NMSettingSecretFlags::AGENT_OWNED);

    let rendered = format!("{connection:?}");

    assert!(!rendered.contains("supersecret"));
    assert!(format!("{:?}", SettingValue::from("supersecret")).contains(".."));
}

#[test]
fn wipe_clears_value() {
    let mut value = SettingValue::from("secret");
    value.wipe();
    assert!(value.is_empty());

    let mut map = SettingValue::from(BTreeMap::from([("k".to_string(), "v".to_string())]));
    map.wipe();
    assert!(map.is_empty());
}

#[test]
fn dbus_round_trip_keeps_typed_values() {
    let connection = psk_profile("home", "pw", NMSettingSecretFlags::AGENT_OWNED);

    let wire = connection.to_dbus().unwrap();
    let back = Connection::from_dbus(Some("/settings/1".to_string()), wire);

    assert_eq!(back.path(), Some("/settings/1"));
    assert_eq!(back.uuid(), Some("uuid-1"));
    assert_eq!(
        back.get(WIRELESS, "ssid").and_then(SettingValue::as_bytes),
        Some(b"home".as_slice())
    );
    assert_eq!(
        back.secret_flags(WIRELESS_SECURITY, "psk"),
        NMSettingSecretFlags::AGENT_OWNED
    );
    assert_eq!(back.string(WIRELESS_SECURITY, "psk"), Some("pw"));
}

#[test]
fn path_scheme_private_key_becomes_tag() {
    let mut connection = wifi_profile("corp");
    connection.set(
        IEEE_8021X,
        "private-key",
        SettingValue::from(b"file:///home/user/key.pem\0".to_vec()),
    );

    let back = Connection::from_dbus(None, connection.to_dbus().unwrap());

    assert_eq!(
        back.private_value(PATH_PRIVATE_KEY_TAG),
        Some("/home/user/key.pem")
    );
}

#[test]
fn mac_parsing() {
    assert_eq!(
        parse_mac("00:1a:2B:3c:4d:5E"),
        Some([0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e])
    );
    assert_eq!(parse_mac("00:11:22:33:44"), None);
    assert_eq!(parse_mac("00:11:22:33:44:55:66"), None);
    assert_eq!(parse_mac("zz:11:22:33:44:55"), None);
}

#[test]
fn psk_profile_applies_to_matching_ap() {
    let connection = psk_profile("home", "pw", NMSettingSecretFlags::AGENT_OWNED);

    assert!(profile_applies_to(&connection, &wifi_device(), Some(&psk_ap("home"))));
    assert!(!profile_applies_to(&connection, &wifi_device(), Some(&psk_ap("other"))));
}

#[test]
fn open_profile_rejects_secured_ap() {
    let connection = wifi_profile("home");
    let open_ap = AccessPointRecord::new("/ap/2", Some(SSID::from("home")));

    assert!(profile_applies_to(&connection, &wifi_device(), Some(&open_ap)));
    assert!(!profile_applies_to(&connection, &wifi_device(), Some(&psk_ap("home"))));
}

#[test]
fn locked_bssid_must_match() {
    let mut connection = psk_profile("home", "pw", NMSettingSecretFlags::AGENT_OWNED);
    connection.set(
        WIRELESS,
        "bssid",
        SettingValue::from(vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66]),
    );

    assert!(!profile_applies_to(&connection, &wifi_device(), Some(&psk_ap("home"))));

    connection.set(
        WIRELESS,
        "bssid",
        SettingValue::from(vec![0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
    );
    assert!(profile_applies_to(&connection, &wifi_device(), Some(&psk_ap("home"))));
}

#[test]
fn locked_device_mac_must_match() {
    let mut connection = wifi_profile("home");
    connection.set(
        WIRELESS,
        "mac-address",
        SettingValue::from(vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]),
    );

    assert!(!profile_applies_to(&connection, &wifi_device(), None));
}

#[test]
fn band_and_mode_restrictions() {
    let mut connection = psk_profile("home", "pw", NMSettingSecretFlags::AGENT_OWNED);
    connection.set(WIRELESS, "band", SettingValue::from("a"));
    assert!(!profile_applies_to(&connection, &wifi_device(), Some(&psk_ap("home"))));

    connection.set(WIRELESS, "band", SettingValue::from("bg"));
    assert!(profile_applies_to(&connection, &wifi_device(), Some(&psk_ap("home"))));

    connection.set(WIRELESS, "mode", SettingValue::from("adhoc"));
    assert!(!profile_applies_to(&connection, &wifi_device(), Some(&psk_ap("home"))));

    let adhoc = psk_ap("home").with_mode(NM80211Mode::Adhoc);
    assert!(profile_applies_to(&connection, &wifi_device(), Some(&adhoc)));
}

#[test]
fn wpa_requires_device_support() {
    let connection = psk_profile("home", "pw", NMSettingSecretFlags::AGENT_OWNED);
    let legacy = DeviceInfo::wifi("/dev/wlan1", None, NMDeviceWifiCapabilities::CIPHER_WEP104);

    assert!(!profile_applies_to(&connection, &legacy, None));
    assert!(profile_applies_to(&connection, &wifi_device(), None));
}

#[test]
fn wired_device_accepts_ethernet_and_pppoe() {
    let device = DeviceInfo::ethernet("/dev/eth0", Some("00:11:22:33:44:55"));

    let ethernet = Connection::with_identity("e", "Wired", "802-3-ethernet");
    let pppoe = Connection::with_identity("p", "DSL", "pppoe");

    assert!(profile_applies_to(&ethernet, &device, None));
    assert!(profile_applies_to(&pppoe, &device, None));
    assert!(!profile_applies_to(&wifi_profile("home"), &device, None));
}

#[tokio::test]
async fn memory_store_saves_without_secrets() {
    let store = MemoryConnectionStore::new();
    let connection = psk_profile("home", "pw", NMSettingSecretFlags::AGENT_OWNED);

    store.save(&connection).await.unwrap();

    let stored = store.get_by_uuid_or_path("uuid-1").await.unwrap().unwrap();
    assert!(stored.get(WIRELESS_SECURITY, "psk").is_none());
    assert_eq!(store.list().await.unwrap().len(), 1);

    store.save(&connection).await.unwrap();
    assert_eq!(store.list().await.unwrap().len(), 1, "save replaces by uuid");

    store.delete(&connection).await.unwrap();
    assert!(store.list().await.unwrap().is_empty());
    assert!(store.delete(&connection).await.is_err());
}

#[test]
fn wiping_a_reply_clears_every_secret() {
    let mut secrets = ConnectionSecrets::from([
        (
            IEEE_8021X.to_owned(),
            SecretsMap::from([
                ("private-key".to_owned(), SettingValue::from(b"DECRYPTED".to_vec())),
                ("password".to_owned(), SettingValue::from("hunter22")),
            ]),
        ),
        (
            VPN.to_owned(),
            SecretsMap::from([(
                "secrets".to_owned(),
                SettingValue::StrMap(BTreeMap::from([("password".to_owned(), "x".to_owned())])),
            )]),
        ),
    ]);

    wipe_secrets(&mut secrets);

    assert_eq!(secrets[IEEE_8021X]["private-key"], SettingValue::from(Vec::<u8>::new()));
    assert_eq!(secrets[IEEE_8021X]["password"], SettingValue::from(""));
    assert_eq!(secrets[VPN]["secrets"], SettingValue::StrMap(BTreeMap::new()));
}
