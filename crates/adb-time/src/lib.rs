//! Tick-counter timing for the bus device.
//!
//! Every duration the protocol engine checks is measured with a free-running 8-bit counter that
//! runs at one of two resolutions: a fine one for bit cells and a coarse one for the long phases
//! (attention, service requests, turnaround). The thresholds live in a [`TimingTable`] picked
//! for the clock the device runs at, so a different clock only needs a different table.

mod counter;
mod speed;
mod table;

pub use counter::{TickCounter, TickTimer};
pub use speed::{Resolution, Speed, SpeedParseError};
pub use table::TimingTable;
