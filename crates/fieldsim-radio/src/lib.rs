//! Binary radio protocol spoken between the host and the robots.
//!
//! Every frame starts with a one byte [`RadioResponseHeader`] whose tag
//! selects the robot generation, and with it the layout of the payload that
//! follows. All multi-byte fields are little-endian and bitfields are packed
//! starting at the least significant bit.

mod bits;
mod frame;
mod gen2012;
mod gen2014;
mod header;
pub mod transceiver;

pub use frame::*;
pub use gen2012::*;
pub use gen2014::*;
pub use header::*;
