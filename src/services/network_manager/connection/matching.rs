use tracing::warn;

use super::{
    Connection, SettingValue,
    names::{CDMA, GSM, PPPOE, WIRED, WIRELESS, WIRELESS_SECURITY},
};
use crate::services::network_manager::{
    DeviceInfo, NM80211ApFlags, NM80211ApSecurityFlags, NM80211Mode, NMDeviceType,
    NMDeviceWifiCapabilities, access_point::AccessPointRecord,
};

const BAND_A: std::ops::RangeInclusive<u32> = 5170..=5825;
const BAND_BG: std::ops::RangeInclusive<u32> = 2412..=2472;

/// Whether a saved profile can be used on a device, optionally for a
/// specific access point.
pub fn profile_applies_to(
    connection: &Connection,
    device: &DeviceInfo,
    ap: Option<&AccessPointRecord>,
) -> bool {
    let Some(connection_type) = connection.connection_type() else {
        return false;
    };

    match device.kind {
        NMDeviceType::Ethernet => valid_for_wired(connection, connection_type, device),
        NMDeviceType::Wifi => valid_for_wireless(connection, connection_type, device, ap),
        NMDeviceType::Modem => connection_type == GSM || connection_type == CDMA,
        NMDeviceType::Unknown => {
            warn!(device = %device.path, "Unknown device type, no profile applies");
            false
        }
    }
}

fn valid_for_wired(connection: &Connection, connection_type: &str, device: &DeviceInfo) -> bool {
    if connection_type == PPPOE {
        return true;
    }
    if connection_type != WIRED {
        return false;
    }

    mac_matches(connection.get(WIRED, "mac-address"), device.hw_address.as_deref())
}

fn valid_for_wireless(
    connection: &Connection,
    connection_type: &str,
    device: &DeviceInfo,
    ap: Option<&AccessPointRecord>,
) -> bool {
    if connection_type != WIRELESS {
        return false;
    }

    if !mac_matches(connection.get(WIRELESS, "mac-address"), device.hw_address.as_deref()) {
        return false;
    }

    if ap.is_some_and(|ap| !ap_compatible(connection, ap)) {
        return false;
    }

    if connection.string(WIRELESS, "security") != Some(WIRELESS_SECURITY)
        || !connection.has_setting(WIRELESS_SECURITY)
    {
        return true;
    }

    match connection.string(WIRELESS_SECURITY, "key-mgmt") {
        Some("none" | "ieee8021x") | None => return true,
        Some(_) => {}
    }

    let caps = device.wifi_capabilities;
    if !caps.contains(NMDeviceWifiCapabilities::WPA | NMDeviceWifiCapabilities::CIPHER_TKIP) {
        return false;
    }

    let only = |key: &str, value: &str| {
        connection
            .get(WIRELESS_SECURITY, key)
            .and_then(SettingValue::as_str_list)
            .is_some_and(|list| list.len() == 1 && list[0] == value)
    };

    if only("proto", "rsn") && !caps.contains(NMDeviceWifiCapabilities::RSN) {
        return false;
    }
    if (only("pairwise", "ccmp") || only("group", "ccmp"))
        && !caps.contains(NMDeviceWifiCapabilities::CIPHER_CCMP)
    {
        return false;
    }

    true
}

fn ap_compatible(connection: &Connection, ap: &AccessPointRecord) -> bool {
    let Some(profile_ssid) = connection.get(WIRELESS, "ssid").and_then(SettingValue::as_bytes)
    else {
        return false;
    };
    let ap_ssid = ap.ssid().map(|ssid| ssid.as_bytes()).unwrap_or_default();
    if !same_ssid(profile_ssid, ap_ssid) {
        return false;
    }

    let bssid = connection.get(WIRELESS, "bssid").and_then(SettingValue::as_bytes);
    if let (Some(bssid), Some(ap_address)) = (bssid, ap.hw_address().and_then(parse_mac)) {
        if bssid != ap_address.as_slice() {
            return false;
        }
    }

    match connection.string(WIRELESS, "mode") {
        Some("infrastructure") if ap.mode() != NM80211Mode::Infra => return false,
        Some("adhoc") if ap.mode() != NM80211Mode::Adhoc => return false,
        _ => {}
    }

    match connection.string(WIRELESS, "band") {
        Some("a") if !BAND_A.contains(&ap.frequency()) => return false,
        Some("bg") if !BAND_BG.contains(&ap.frequency()) => return false,
        _ => {}
    }

    security_compatible(connection, ap)
}

fn security_compatible(connection: &Connection, ap: &AccessPointRecord) -> bool {
    let privacy = ap.flags().contains(NM80211ApFlags::PRIVACY);
    let wpa = ap.wpa_flags();
    let rsn = ap.rsn_flags();
    let any = wpa | rsn;

    let secured_profile = connection.string(WIRELESS, "security") == Some(WIRELESS_SECURITY)
        && connection.has_setting(WIRELESS_SECURITY);
    if !secured_profile {
        return !privacy && any.is_empty();
    }

    match connection.string(WIRELESS_SECURITY, "key-mgmt") {
        Some("none") => privacy && any.is_empty(),
        Some("ieee8021x") => {
            privacy && (any.is_empty() || any.contains(NM80211ApSecurityFlags::KEY_MGMT_802_1X))
        }
        Some("wpa-none") => ap.mode() == NM80211Mode::Adhoc && privacy,
        Some("wpa-psk") => any.contains(NM80211ApSecurityFlags::KEY_MGMT_PSK),
        Some("wpa-eap") => any.contains(NM80211ApSecurityFlags::KEY_MGMT_802_1X),
        Some("sae") => rsn.contains(NM80211ApSecurityFlags::KEY_MGMT_SAE),
        Some("owe") => rsn.intersects(
            NM80211ApSecurityFlags::KEY_MGMT_OWE | NM80211ApSecurityFlags::KEY_MGMT_OWE_TM,
        ),
        _ => false,
    }
}

/// SSIDs compare equal ignoring one trailing NUL on either side.
fn same_ssid(a: &[u8], b: &[u8]) -> bool {
    let trim = |s: &[u8]| -> usize {
        match s.last() {
            Some(0) => s.len() - 1,
            _ => s.len(),
        }
    };
    a[..trim(a)] == b[..trim(b)]
}

fn mac_matches(locked: Option<&SettingValue>, device_mac: Option<&str>) -> bool {
    let Some(locked) = locked.and_then(SettingValue::as_bytes) else {
        return true;
    };
    if locked.is_empty() {
        return true;
    }
    match device_mac.and_then(parse_mac) {
        Some(device_mac) => device_mac.as_slice() == locked,
        None => false,
    }
}

/// Parse a colon separated MAC address.
pub(crate) fn parse_mac(text: &str) -> Option<[u8; 6]> {
    let mut mac = [0u8; 6];
    let mut parts = text.split(':');

    for byte in mac.iter_mut() {
        *byte = u8::from_str_radix(parts.next()?, 16).ok()?;
    }

    parts.next().is_none().then_some(mac)
}
