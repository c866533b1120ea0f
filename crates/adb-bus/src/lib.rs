//! Bus-side half of the device emulator: the open-drain line, the duration-coded bit transport
//! and the protocol engine that answers host transactions on behalf of a [`DeviceSet`].
//!
//! [`BusEngine::service`] runs at most one transaction and returns; callers loop on it forever.
//! All timing is measured by polling a [`BusPort`], so the engine runs unchanged against real
//! pins or against the deterministic [`sim::SimBus`].
//!
//! [`DeviceSet`]: adb_devices::DeviceSet

mod config;
mod engine;
mod error;
mod line;
pub mod sim;
mod transport;

pub use config::EngineConfig;
pub use engine::{BusEngine, Outcome};
pub use error::{BusError, Phase, ProtocolFault};
pub use line::{BusLine, BusPort};
pub use transport::BitTransport;
