//! Register files of the emulated bus peripherals.
//!
//! The protocol engine in `adb-bus` only ever talks to the [`DeviceSet`]: it asks which classes
//! want service, which class owns an address, and forwards talk/listen/flush requests. Host-side
//! data reaches the registers through an [`Ingest`] implementation that the engine polls from its
//! busy-wait loops; [`SerialIngest`] is the nibble-coded serial link used by the reference board.

mod arbitrary;
mod device;
mod error;
mod identity;
mod ingest;
mod keyboard;
mod mask;
mod mouse;
mod queue;
mod serial;
mod set;

pub use arbitrary::{Arbitrary, ARBITRARY_REG0_CAPACITY};
pub use device::{AdbDevice, Device, Payload, MAX_PAYLOAD};
pub use error::ConfigError;
pub use identity::{Identity, HANDLER_COLLISION_ACK, HANDLER_SELF_TEST, IDENTITY_REGISTER};
pub use ingest::{Ingest, NoIngest};
pub use keyboard::{Keyboard, Reg2High, Reg2Low, RESET_KEY};
pub use mask::{DeviceClass, DeviceMask};
pub use mouse::{Mouse, MOUSE_DELTA_MAX, MOUSE_DELTA_MIN};
pub use queue::{KeyQueue, KEY_QUEUE_CAPACITY, KEY_QUEUE_FILLER};
pub use serial::{ByteChannel, LoopbackChannel, SerialDecoder, SerialIngest};
pub use set::{DeviceConfig, DeviceSet};
