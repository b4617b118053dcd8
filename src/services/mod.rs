/// Shared reactive property and D-Bus helpers
pub mod common;
/// NetworkManager access points, profiles and the merged network menu
pub mod network_manager;
/// Secrets agent backed by the Secret Service keyring
pub mod secrets;
