/// Access point records, fingerprints and change monitoring
pub mod access_point;
/// Connection profiles, their secrets and the profile store
pub mod connection;
/// Device descriptions used for profile matching
mod device;
/// Network service errors
mod error;
/// Deduplicated network menu
pub mod menu;
/// D-Bus proxy implementations for NetworkManager interfaces.
mod proxy;
/// Type definitions for NetworkManager enums and flags.
mod types;

pub use device::DeviceInfo;
pub use error::NetworkError;
pub use proxy::*;
pub use types::*;
