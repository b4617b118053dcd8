/// Network service errors
#[derive(thiserror::Error, Debug)]
pub enum NetworkError {
    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    DbusError(#[from] zbus::Error),

    /// Object not found at the specified D-Bus path
    #[error("Object not found at path: {0}")]
    ObjectNotFound(String),

    /// Device not found by identifier
    #[error("Device {0} not found")]
    DeviceNotFound(String),

    /// Connection profile not found by UUID or path
    #[error("Connection profile {0} not found")]
    ProfileNotFound(String),

    /// Network operation failed
    #[error("Network operation failed: {operation} - {reason}")]
    OperationFailed {
        /// The operation that failed
        operation: &'static str,
        /// The reason the operation failed
        reason: String,
    },

    /// Data conversion or parsing failed
    #[error("Failed to parse {data_type}: {reason}")]
    DataConversionFailed {
        /// Type of data that failed to convert.
        data_type: String,
        /// Reason for conversion failure.
        reason: String,
    },
}
