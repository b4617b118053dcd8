//! Deduplicated network menu: access points sharing a fingerprint are shown
//! as one entry per device.

mod entry;
mod index;
mod service;
mod sort;

#[cfg(test)]
mod tests;

pub use entry::MergedNetworkEntry;
pub use index::{ApMergeIndex, IndexUpdate};
pub use service::{MenuEvent, NetworkMenu, NetworkMenuHandle};
pub use sort::{compare_for_display, sort_for_display};
