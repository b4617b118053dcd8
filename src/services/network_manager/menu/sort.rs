use std::cmp::Ordering;

use super::MergedNetworkEntry;
use crate::services::network_manager::NM80211Mode;

/// Sort entries into menu order.
///
/// Named networks come first, ordered by SSID bytes compared ASCII
/// case-insensitively with a shorter common prefix first. Remaining ties put
/// ad hoc networks ahead of infrastructure ones.
pub fn sort_for_display(entries: &mut [MergedNetworkEntry]) {
    entries.sort_by(compare_for_display);
}

/// Menu ordering of two entries.
pub fn compare_for_display(a: &MergedNetworkEntry, b: &MergedNetworkEntry) -> Ordering {
    let a_ssid = a.ssid().as_bytes();
    let b_ssid = b.ssid().as_bytes();

    match (a_ssid.is_empty(), b_ssid.is_empty()) {
        (false, true) => return Ordering::Less,
        (true, false) => return Ordering::Greater,
        _ => {}
    }

    compare_ssid(a_ssid, b_ssid).then_with(|| mode_rank(a.mode()).cmp(&mode_rank(b.mode())))
}

fn compare_ssid(a: &[u8], b: &[u8]) -> Ordering {
    a.iter()
        .map(u8::to_ascii_lowercase)
        .cmp(b.iter().map(u8::to_ascii_lowercase))
}

fn mode_rank(mode: NM80211Mode) -> u8 {
    match mode {
        NM80211Mode::Adhoc => 0,
        NM80211Mode::Infra => 1,
        _ => 2,
    }
}
