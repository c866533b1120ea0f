use adb_time::{Resolution, TimingTable};

use crate::{BusError, BusPort, Phase, ProtocolFault};

/// Duration-coded bit I/O on top of a [`BusPort`].
///
/// Every bit is a low pulse followed by a high gap, and the value lives in the low length: a
/// short low is a 1, a long low is a 0. `yield_now` is the cooperative hook for the host data
/// feed; the long waits call it on every poll, bit-level loops call it once per half cell.
pub struct BitTransport<'a, B: ?Sized, Y> {
    bus: &'a mut B,
    timing: &'a TimingTable,
    yield_now: Y,
}

impl<'a, B, Y> BitTransport<'a, B, Y>
where
    B: BusPort + ?Sized,
    Y: FnMut(),
{
    pub fn new(bus: &'a mut B, timing: &'a TimingTable, yield_now: Y) -> Self {
        Self {
            bus,
            timing,
            yield_now,
        }
    }

    /// Drives one bit: low for the short (1) or long (0) period, then high for the complement.
    ///
    /// The line must be idle when we start; a low edge from anyone else during the high period
    /// is a collision.
    pub fn write_bit(&mut self, one: bool) -> Result<(), BusError> {
        let (low, high) = if one {
            (self.timing.pulse_short, self.timing.pulse_long)
        } else {
            (self.timing.pulse_long, self.timing.pulse_short)
        };

        if self.bus.is_asserted() {
            return Err(ProtocolFault::LineBusy.into());
        }

        self.bus.assert_line();
        self.bus.start_timer(Resolution::Fine);
        (self.yield_now)();
        while self.bus.read_ticks() < low {}
        self.bus.release();
        self.bus.stop_timer();

        self.bus.start_timer(Resolution::Fine);
        (self.yield_now)();
        while !self.bus.is_asserted() && self.bus.read_ticks() < high {}
        if self.bus.stop_timer() < high {
            return Err(BusError::Collision { phase: Phase::Talk });
        }
        Ok(())
    }

    /// Eight bits, MSB first. Stops at the first error.
    pub fn write_byte(&mut self, value: u8) -> Result<(), BusError> {
        for bit in (0..8).rev() {
            self.write_bit(value & (1 << bit) != 0)?;
        }
        Ok(())
    }

    /// A full response: start bit (1), the payload bytes, stop bit (0).
    pub fn write_frame(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        self.write_bit(true)?;
        for &b in bytes {
            self.write_byte(b)?;
        }
        self.write_bit(false)
    }

    /// Reads eight host-driven bits, MSB first.
    ///
    /// Entered with the line just pulled low for the first bit; returns once the line has been
    /// pulled low again after the eighth.
    pub fn read_byte(&mut self) -> Result<u8, BusError> {
        let t = *self.timing;
        let mut value = 0u8;

        for _ in 0..8 {
            self.bus.start_timer(Resolution::Fine);
            (self.yield_now)();
            while self.bus.is_asserted() && self.bus.read_ticks() < t.bit_long {}
            let low = self.bus.stop_timer();
            if low < t.bit_short || low >= t.bit_long {
                return Err(ProtocolFault::BitOutOfWindow { ticks: low }.into());
            }

            self.bus.start_timer(Resolution::Fine);
            value = (value << 1) | u8::from(low < t.bit_split);

            while !self.bus.is_asserted() && self.bus.read_ticks() < t.bit_long {}
            if self.bus.stop_timer() >= t.bit_long {
                return Err(ProtocolFault::BitHighOverrun.into());
            }
        }

        Ok(value)
    }

    /// Coarse wait for the line to go low. Returns the elapsed ticks; a value at or above
    /// `timeout` means it never did.
    pub fn wait_for_assertion(&mut self, timeout: u8) -> u8 {
        self.bus.start_timer(Resolution::Coarse);
        while !self.bus.is_asserted() && self.bus.read_ticks() < timeout {
            (self.yield_now)();
        }
        self.bus.stop_timer()
    }

    /// Coarse wait for the line to float high, same contract as [`Self::wait_for_assertion`].
    pub fn wait_for_line_free(&mut self, timeout: u8) -> u8 {
        self.bus.start_timer(Resolution::Coarse);
        while self.bus.is_asserted() && self.bus.read_ticks() < timeout {
            (self.yield_now)();
        }
        self.bus.stop_timer()
    }

    /// Fine wait for the next low edge while bit-synchronised with the host.
    ///
    /// Never yields: callers only use it for gaps of a few tens of microseconds.
    pub fn resync(&mut self, timeout: u8) -> u8 {
        self.bus.start_timer(Resolution::Fine);
        while !self.bus.is_asserted() && self.bus.read_ticks() < timeout {}
        self.bus.stop_timer()
    }
}
