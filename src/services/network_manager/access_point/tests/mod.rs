//! Unit tests for access point records and fingerprints
//!
//! Pure computations only, no bus access.

use crate::services::network_manager::{
    NM80211ApFlags, NM80211ApSecurityFlags, NM80211Mode,
    access_point::{AccessPointRecord, ApChange, Fingerprint, ModeClass, SSID, SecurityClass},
};

const PSK: NM80211ApSecurityFlags = NM80211ApSecurityFlags::KEY_MGMT_PSK
    .union(NM80211ApSecurityFlags::PAIR_TKIP)
    .union(NM80211ApSecurityFlags::GROUP_TKIP);

const RSN_PSK: NM80211ApSecurityFlags = NM80211ApSecurityFlags::KEY_MGMT_PSK
    .union(NM80211ApSecurityFlags::PAIR_CCMP)
    .union(NM80211ApSecurityFlags::GROUP_CCMP);

fn infra(ssid: &str) -> AccessPointRecord {
    AccessPointRecord::new("/ap/1", Some(SSID::from(ssid)))
}

#[test]
fn fingerprint_is_deterministic() {
    let a = Fingerprint::compute(
        Some(b"home"),
        ModeClass::Infrastructure,
        NM80211ApFlags::PRIVACY,
        PSK,
        NM80211ApSecurityFlags::NONE,
    );
    let b = Fingerprint::compute(
        Some(b"home"),
        ModeClass::Infrastructure,
        NM80211ApFlags::PRIVACY,
        PSK,
        NM80211ApSecurityFlags::NONE,
    );

    assert_eq!(a, b);
    assert_eq!(a.as_bytes().len(), 16);
}

#[test]
fn wpa_variants_share_one_fingerprint() {
    let wpa = infra("cafe").with_security(NM80211ApFlags::PRIVACY, PSK, NM80211ApSecurityFlags::NONE);
    let wpa2 =
        infra("cafe").with_security(NM80211ApFlags::PRIVACY, NM80211ApSecurityFlags::NONE, RSN_PSK);
    let mixed = infra("cafe").with_security(NM80211ApFlags::PRIVACY, PSK, RSN_PSK);
    let enterprise = infra("cafe").with_security(
        NM80211ApFlags::PRIVACY,
        NM80211ApSecurityFlags::NONE,
        NM80211ApSecurityFlags::KEY_MGMT_802_1X,
    );

    assert_eq!(wpa.fingerprint(), wpa2.fingerprint());
    assert_eq!(wpa.fingerprint(), mixed.fingerprint());
    assert_eq!(wpa.fingerprint(), enterprise.fingerprint());
}

#[test]
fn wpa_differs_from_open_and_wep() {
    let wpa = infra("cafe").with_security(NM80211ApFlags::PRIVACY, PSK, RSN_PSK);
    let open = infra("cafe");
    let wep = infra("cafe").with_security(
        NM80211ApFlags::PRIVACY,
        NM80211ApSecurityFlags::NONE,
        NM80211ApSecurityFlags::NONE,
    );

    assert_ne!(wpa.fingerprint(), open.fingerprint());
    assert_ne!(wpa.fingerprint(), wep.fingerprint());
    assert_ne!(open.fingerprint(), wep.fingerprint());
}

#[test]
fn strength_does_not_change_fingerprint() {
    let mut ap = infra("cafe").with_strength(10);
    let before = ap.fingerprint();

    let recomputed = ap.apply(ApChange::Strength(95));

    assert!(!recomputed);
    assert_eq!(ap.strength(), 95);
    assert_eq!(ap.fingerprint(), before);
    assert_eq!(infra("cafe").with_strength(42).fingerprint(), before);
}

#[test]
fn mode_changes_fingerprint() {
    let infrastructure = infra("cafe").with_security(NM80211ApFlags::PRIVACY, PSK, RSN_PSK);
    let adhoc = infrastructure.clone().with_mode(NM80211Mode::Adhoc);

    assert_ne!(infrastructure.fingerprint(), adhoc.fingerprint());
}

#[test]
fn ssid_changes_fingerprint() {
    assert_ne!(infra("cafe").fingerprint(), infra("cafe2").fingerprint());
}

#[test]
fn missing_ssid_hashes_as_zero_bytes() {
    let missing = Fingerprint::from_classes(None, ModeClass::Infrastructure, SecurityClass::Open);
    let zeros = Fingerprint::from_classes(
        Some(&[0u8; 32]),
        ModeClass::Infrastructure,
        SecurityClass::Open,
    );

    assert_eq!(missing, zeros);
}

#[test]
fn overlong_ssid_is_truncated() {
    let exact = [b'x'; 32];
    let long = [b'x'; 40];

    assert_eq!(
        Fingerprint::from_classes(Some(&exact), ModeClass::AdHoc, SecurityClass::WpaCapable),
        Fingerprint::from_classes(Some(&long), ModeClass::AdHoc, SecurityClass::WpaCapable),
    );
}

#[test]
fn embedded_nul_bytes_are_significant() {
    let a = Fingerprint::from_classes(Some(b"a\0b"), ModeClass::Other, SecurityClass::Open);
    let b = Fingerprint::from_classes(Some(b"a\0c"), ModeClass::Other, SecurityClass::Open);

    assert_ne!(a, b);
}

#[test]
fn security_classification() {
    use NM80211ApSecurityFlags as S;

    assert_eq!(
        SecurityClass::classify(NM80211ApFlags::NONE, S::NONE, S::NONE),
        SecurityClass::Open
    );
    assert_eq!(
        SecurityClass::classify(NM80211ApFlags::PRIVACY, S::NONE, S::NONE),
        SecurityClass::PrivacyOnly
    );
    assert_eq!(
        SecurityClass::classify(NM80211ApFlags::NONE, PSK, RSN_PSK),
        SecurityClass::UnprivilegedWpa
    );
    assert_eq!(
        SecurityClass::classify(NM80211ApFlags::NONE, PSK, S::NONE),
        SecurityClass::WpaCapable
    );
    assert_eq!(
        SecurityClass::classify(NM80211ApFlags::PRIVACY, S::NONE, RSN_PSK),
        SecurityClass::WpaCapable
    );
}

#[test]
fn mode_classification() {
    assert_eq!(ModeClass::from(NM80211Mode::Infra), ModeClass::Infrastructure);
    assert_eq!(ModeClass::from(NM80211Mode::Adhoc), ModeClass::AdHoc);
    assert_eq!(ModeClass::from(NM80211Mode::Mesh), ModeClass::Other);
    assert_eq!(ModeClass::from(NM80211Mode::Unknown), ModeClass::Other);
}

#[test]
fn security_change_recomputes_fingerprint() {
    let mut ap = infra("cafe");
    let open = ap.fingerprint();

    assert!(ap.apply(ApChange::Flags(NM80211ApFlags::PRIVACY)));
    assert_ne!(ap.fingerprint(), open);

    assert!(ap.apply(ApChange::Flags(NM80211ApFlags::NONE)));
    assert_eq!(ap.fingerprint(), open);
}

#[test]
fn hidden_detection() {
    assert!(AccessPointRecord::new("/ap/1", None).is_hidden());
    assert!(AccessPointRecord::new("/ap/1", Some(SSID::new(vec![0, 0, 0]))).is_hidden());
    assert!(!infra("cafe").is_hidden());

    let mut ap = infra("cafe");
    ap.apply(ApChange::Ssid(Vec::new()));
    assert!(ap.is_hidden());
}

#[test]
fn fingerprint_displays_as_hex() {
    let rendered = infra("cafe").fingerprint().to_string();

    assert_eq!(rendered.len(), 32);
    assert!(rendered.chars().all(|c| c.is_ascii_hexdigit()));
}
