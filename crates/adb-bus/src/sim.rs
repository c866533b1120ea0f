//! Deterministic simulated bus for tests and the CLI.
//!
//! [`SimBus`] keeps a virtual nanosecond clock that only moves when the device polls it: every
//! [`BusLine::is_asserted`] and [`TickTimer::read_ticks`] call advances it by a fixed step. The
//! host side of the wire follows a [`HostScript`]; everything the device drives is recorded as
//! [`Pulse`]s that [`decode_response`] turns back into bytes.

use adb_time::{Resolution, Speed, TickCounter, TickTimer};

use crate::BusLine;

/// Virtual time spent per line or timer poll.
pub const STEP_NS: u64 = 250;

const US: u64 = 1_000;

/// Nominal host timings, in microseconds.
pub const RESET_US: u64 = 3_000;
pub const ATTENTION_US: u64 = 800;
pub const SYNC_US: u64 = 65;
pub const BIT_SHORT_US: u64 = 35;
pub const BIT_LONG_US: u64 = 65;
pub const TLT_US: u64 = 200;

/// Device lows at least this long are service requests, not bits.
const SRQ_MIN_NS: u64 = 150 * US;
/// Device lows shorter than this are 1 bits.
const BIT_SPLIT_NS: u64 = 50 * US;

/// One segment of the host's side of the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStep {
    /// Host holds the line low for this many nanoseconds.
    Low(u64),
    /// Host lets go for this many nanoseconds.
    High(u64),
    /// Host lets go and waits until the device stops holding the line.
    AwaitRelease,
}

/// Builder for what the host does on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostScript {
    steps: Vec<HostStep>,
}

impl HostScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[HostStep] {
        &self.steps
    }

    pub fn step(mut self, step: HostStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn low_us(self, us: u64) -> Self {
        self.step(HostStep::Low(us * US))
    }

    pub fn high_us(self, us: u64) -> Self {
        self.step(HostStep::High(us * US))
    }

    /// Bus reset: the line held low for 3 ms, then a short idle gap.
    pub fn reset(self) -> Self {
        self.low_us(RESET_US).high_us(TLT_US)
    }

    pub fn attention(self) -> Self {
        self.low_us(ATTENTION_US)
    }

    pub fn sync(self) -> Self {
        self.high_us(SYNC_US)
    }

    /// The low `count` bits of `value`, MSB first, as 100 µs bit cells.
    pub fn bits(mut self, value: u8, count: u8) -> Self {
        for bit in (0..count.min(8)).rev() {
            self = if value & (1 << bit) != 0 {
                self.low_us(BIT_SHORT_US).high_us(BIT_LONG_US)
            } else {
                self.low_us(BIT_LONG_US).high_us(BIT_SHORT_US)
            };
        }
        self
    }

    /// Stop bit low period, after which the host waits out any service request.
    pub fn stop_bit(self) -> Self {
        self.low_us(BIT_LONG_US).step(HostStep::AwaitRelease)
    }

    /// Attention, sync, the command byte and its stop bit.
    pub fn command(self, command: u8) -> Self {
        self.attention().sync().bits(command, 8).stop_bit()
    }

    pub fn talk(self, address: u8, register: u8) -> Self {
        self.command(command_byte(address, 0b11, register))
            .high_us(12_000)
    }

    pub fn listen(self, address: u8, register: u8, payload: &[u8]) -> Self {
        self.command(command_byte(address, 0b10, register))
            .listen_payload(payload)
    }

    pub fn flush(self, address: u8) -> Self {
        self.command((address & 0x0F) << 4 | 0b0001)
            .high_us(TLT_US)
    }

    /// Turnaround gap, start bit, data bytes, stop bit.
    pub fn listen_payload(mut self, payload: &[u8]) -> Self {
        self = self.high_us(TLT_US).bits(1, 1);
        for &b in payload {
            self = self.bits(b, 8);
        }
        self.low_us(BIT_LONG_US).high_us(TLT_US)
    }
}

/// `address << 4 | kind << 2 | register`.
pub fn command_byte(address: u8, kind: u8, register: u8) -> u8 {
    (address & 0x0F) << 4 | (kind & 0b11) << 2 | (register & 0b11)
}

/// One low period driven by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub start_ns: u64,
    pub low_ns: u64,
}

impl Pulse {
    pub fn is_service_request(&self) -> bool {
        self.low_ns >= SRQ_MIN_NS
    }
}

/// Decodes the device's response frame (start bit, data bits, stop bit) from its pulses.
///
/// Service-request pulses are skipped. Trailing bits that do not fill a byte are dropped.
pub fn decode_response(pulses: &[Pulse]) -> Vec<u8> {
    let bits: Vec<bool> = pulses
        .iter()
        .filter(|p| !p.is_service_request())
        .map(|p| p.low_ns < BIT_SPLIT_NS)
        .collect();
    if bits.len() < 2 {
        return Vec::new();
    }
    bits[1..bits.len() - 1]
        .chunks_exact(8)
        .map(|byte| byte.iter().fold(0u8, |acc, &b| acc << 1 | u8::from(b)))
        .collect()
}

/// Simulated open-drain line with a scripted host and a virtual tick counter.
#[derive(Debug, Clone)]
pub struct SimBus {
    speed: Speed,
    now_ns: u64,
    counter: TickCounter,
    script: Vec<HostStep>,
    cursor: usize,
    step_start_ns: u64,
    device_low_since: Option<u64>,
    last_release_ns: u64,
    pulses: Vec<Pulse>,
}

impl SimBus {
    pub fn new(speed: Speed, script: HostScript) -> Self {
        Self {
            speed,
            now_ns: 0,
            counter: TickCounter::new(speed),
            script: script.steps,
            cursor: 0,
            step_start_ns: 0,
            device_low_since: None,
            last_release_ns: 0,
            pulses: Vec::new(),
        }
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn now_ns(&self) -> u64 {
        self.now_ns
    }

    /// Appends more host activity after whatever is still pending.
    pub fn extend_script(&mut self, script: HostScript) {
        if self.cursor >= self.script.len() {
            // The host has been idle since its last step ended.
            self.step_start_ns = self.now_ns;
        }
        self.script.extend(script.steps);
    }

    /// Whether the host has nothing left to do and the device has let go of the line.
    pub fn script_done(&mut self) -> bool {
        self.sync_host();
        self.cursor >= self.script.len() && self.device_low_since.is_none()
    }

    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    pub fn take_pulses(&mut self) -> Vec<Pulse> {
        std::mem::take(&mut self.pulses)
    }

    pub fn device_asserted(&self) -> bool {
        self.device_low_since.is_some()
    }

    fn tick(&mut self) {
        self.now_ns += STEP_NS;
        self.sync_host();
    }

    fn sync_host(&mut self) {
        while let Some(&step) = self.script.get(self.cursor) {
            match step {
                HostStep::Low(len) | HostStep::High(len) => {
                    if self.now_ns < self.step_start_ns + len {
                        break;
                    }
                    self.step_start_ns += len;
                }
                HostStep::AwaitRelease => {
                    if self.device_low_since.is_some() {
                        break;
                    }
                    self.step_start_ns = self.step_start_ns.max(self.last_release_ns);
                }
            }
            self.cursor += 1;
        }
    }

    fn host_asserted(&self) -> bool {
        matches!(self.script.get(self.cursor), Some(HostStep::Low(_)))
    }
}

impl BusLine for SimBus {
    fn is_asserted(&mut self) -> bool {
        self.tick();
        self.host_asserted() || self.device_low_since.is_some()
    }

    fn assert_line(&mut self) {
        if self.device_low_since.is_none() {
            self.device_low_since = Some(self.now_ns);
        }
    }

    fn release(&mut self) {
        if let Some(start_ns) = self.device_low_since.take() {
            self.pulses.push(Pulse {
                start_ns,
                low_ns: self.now_ns - start_ns,
            });
            self.last_release_ns = self.now_ns;
            self.sync_host();
        }
    }
}

impl TickTimer for SimBus {
    fn start_timer(&mut self, resolution: Resolution) {
        self.counter.start(resolution, self.now_ns);
    }

    fn read_ticks(&mut self) -> u8 {
        self.tick();
        self.counter.read(self.now_ns)
    }

    fn stop_timer(&mut self) -> u8 {
        self.counter.stop(self.now_ns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_until(bus: &mut SimBus, ns: u64) -> bool {
        let mut level = false;
        while bus.now_ns() < ns {
            level = bus.is_asserted();
        }
        level
    }

    #[test]
    fn host_steps_follow_virtual_time() {
        let mut bus = SimBus::new(Speed::Full, HostScript::new().low_us(10).high_us(10).low_us(5));
        assert!(poll_until(&mut bus, 9_000));
        assert!(!poll_until(&mut bus, 15_000));
        assert!(poll_until(&mut bus, 22_000));
        assert!(!poll_until(&mut bus, 30_000));
        assert!(bus.script_done());
    }

    #[test]
    fn await_release_waits_for_the_device() {
        let mut bus = SimBus::new(Speed::Full, HostScript::new().stop_bit().low_us(10));
        bus.assert_line();
        assert!(bus.device_asserted());
        assert!(poll_until(&mut bus, 200_000));
        assert!(!bus.script_done());
        bus.release();
        assert!(!bus.device_asserted());
        assert_eq!(bus.take_pulses(), vec![Pulse { start_ns: 0, low_ns: 200_000 }]);
        assert!(bus.pulses().is_empty());

        // The scripted low starts at the device release, not when the stop bit ended.
        assert!(poll_until(&mut bus, 205_000));
        assert!(!poll_until(&mut bus, 215_000));
    }

    #[test]
    fn timer_counts_virtual_time() {
        let mut bus = SimBus::new(Speed::Full, HostScript::new());
        bus.start_timer(Resolution::Coarse);
        while bus.read_ticks() < 10 {}
        assert_eq!(bus.stop_timer(), 10);
        assert!((40_000..40_500).contains(&bus.now_ns()));
        assert_eq!(bus.read_ticks(), 0);
    }

    #[test]
    fn decode_skips_service_requests() {
        let pulse = |low_us: u64| Pulse {
            start_ns: 0,
            low_ns: low_us * US,
        };
        let mut pulses = vec![pulse(235), pulse(35)];
        for bit in [0, 1, 0, 0, 0, 0, 0, 1] {
            pulses.push(pulse(if bit == 1 { 35 } else { 65 }));
        }
        pulses.push(pulse(65));
        assert_eq!(decode_response(&pulses), vec![0x41]);
        assert!(decode_response(&pulses[..1]).is_empty());
    }

    #[test]
    fn builders_emit_host_steps() {
        assert_eq!(
            HostScript::new().stop_bit().steps(),
            &[HostStep::Low(BIT_LONG_US * US), HostStep::AwaitRelease]
        );
        assert_eq!(
            HostScript::new().bits(0b10, 2).steps(),
            &[
                HostStep::Low(BIT_SHORT_US * US),
                HostStep::High((100 - BIT_SHORT_US) * US),
                HostStep::Low(BIT_LONG_US * US),
                HostStep::High((100 - BIT_LONG_US) * US),
            ]
        );
        // Attention, sync, eight bits and the stop bit.
        let command = HostScript::new().command(0x2C);
        assert_eq!(command.steps().len(), 1 + 1 + 16 + 2);
    }

    #[test]
    fn command_bytes_pack_fields() {
        assert_eq!(command_byte(2, 0b11, 0), 0x2C);
        assert_eq!(command_byte(7, 0b10, 2), 0x7A);
        assert_eq!(command_byte(3, 0b11, 3), 0x3F);
    }
}
