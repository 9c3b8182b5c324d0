pub mod hal;

#[cfg(feature = "fram-i2c")]
pub mod fram_i2c;
#[cfg(feature = "rp2040")]
pub mod rp2040;

pub use hal::{AnalogSampler, MonotonicTimer, SoftwareTimer};
