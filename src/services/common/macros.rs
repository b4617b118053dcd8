/// Unwraps a D-Bus property read, logging the failure and falling back to
/// the type's default value.
///
/// # Example
/// ```ignore
/// let strength: u8 = unwrap_property!(proxy.strength().await, "Strength", path);
/// ```
#[macro_export]
macro_rules! unwrap_property {
    ($result:expr, $name:expr, $path:expr) => {
        $result.unwrap_or_else(|err| {
            ::tracing::warn!("Failed to fetch '{}' property for {:?}: {}", $name, $path, err);
            ::core::default::Default::default()
        })
    };
}

/// Unwraps a D-Bus property read with a custom fallback value.
#[macro_export]
macro_rules! unwrap_property_or {
    ($result:expr, $name:expr, $path:expr, $default:expr) => {
        $result.unwrap_or_else(|err| {
            ::tracing::warn!("Failed to fetch '{}' property for {:?}: {}", $name, $path, err);
            $default
        })
    };
}
