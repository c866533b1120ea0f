use adb_devices::{DeviceMask, Ingest};
use adb_time::Resolution;
use tracing::trace;

use super::BusEngine;
use crate::{BusError, BusPort, ProtocolFault};

impl<B: BusPort, I: Ingest> BusEngine<B, I> {
    /// Runs from the start of the command stop bit to the line floating high again.
    ///
    /// Returns the addressed class (empty when the command is for someone else). Any other
    /// class with pending data extends the stop bit to request service.
    pub(super) fn service_request(&mut self, command: u8) -> Result<DeviceMask, BusError> {
        let t = self.timing;
        self.bus.start_timer(Resolution::Coarse);
        self.poll_ingest();

        // The addressed class never requests service for this transaction.
        let target = self.devices.addressed(command >> 4);
        let srq = self.devices.needs_service().difference(target);

        if !srq.is_empty() {
            if !self.bus.is_asserted() {
                self.bus.stop_timer();
                return Err(ProtocolFault::SrqLineReleased.into());
            }
            self.bus.assert_line();
            loop {
                self.poll_ingest();
                if self.bus.read_ticks() >= t.srq_assert {
                    break;
                }
            }
            self.bus.release();
            trace!(?srq, "service request held");
        }

        while self.bus.is_asserted() && self.bus.read_ticks() < t.srq_max {
            self.poll_ingest();
        }
        if self.bus.stop_timer() >= t.srq_max {
            return Err(ProtocolFault::SrqNotReleased.into());
        }

        Ok(target)
    }
}
