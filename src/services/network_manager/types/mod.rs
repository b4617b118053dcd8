mod device;
mod flags;
mod wifi;

pub use device::*;
pub use flags::*;
pub use wifi::*;
