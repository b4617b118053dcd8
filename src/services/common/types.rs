/// D-Bus object path reference.
///
/// Represents a D-Bus object path as a string (e.g. "/org/freedesktop/NetworkManager/AccessPoint/12").
/// Devices, access points and settings profiles are identified by these paths; the objects
/// themselves are fetched on demand.
pub type ObjectPath = String;
