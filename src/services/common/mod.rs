//! Common utilities shared by the network and secrets services

/// Reactive property system for fine-grained state updates
pub mod property;
/// Shared type aliases
pub mod types;
// Service macros
#[macro_use]
mod macros;

pub use property::Property;
pub use types::ObjectPath;
