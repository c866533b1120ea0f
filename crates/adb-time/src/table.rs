use crate::{Resolution, Speed};

/// Duration thresholds for one clock speed.
///
/// Field comments give the counter resolution each value is measured in. Values are counter
/// ticks, not microseconds; the bus timings they encode carry roughly ±10% of slack for the
/// oscillator variance of cheap parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingTable {
    /// Coarse. Shortest low period accepted as an attention signal.
    pub attn_min: u8,
    /// Coarse. A low period reaching this long is a bus reset.
    pub attn_max: u8,
    /// Fine. Sync gap window after attention.
    pub sync_min: u8,
    pub sync_max: u8,
    /// Coarse. How long after the command stop bit starts a service request holds the line.
    pub srq_assert: u8,
    /// Coarse. Ceiling for the line to float high again after the stop bit.
    pub srq_max: u8,
    /// Coarse. Turnaround wait before answering a talk.
    pub talk_wait: u8,
    /// Coarse. Wait for the host's start bit before listen data.
    pub listen_start: u8,
    /// Coarse. Ceiling for the low half of the host's start bit.
    pub listen_start_release: u8,
    /// Fine. Ceiling for the high half of the host's start bit.
    pub listen_sync: u8,
    /// Fine. Low time of a transmitted 1 (and high time of a 0).
    pub pulse_short: u8,
    /// Fine. Low time of a transmitted 0 (and high time of a 1).
    pub pulse_long: u8,
    /// Fine. Received low periods must fall in `bit_short..bit_long`.
    pub bit_short: u8,
    pub bit_long: u8,
    /// Fine. Received low periods shorter than this are 1 bits.
    pub bit_split: u8,
    /// Coarse. How long an idle poll waits for the line before handing control back.
    pub idle_window: u8,
}

impl TimingTable {
    /// 16 MHz: fine tick 0.5 µs, coarse tick 4 µs.
    pub const FULL_SPEED: TimingTable = TimingTable {
        attn_min: 170,
        attn_max: 233,
        sync_min: 44,
        sync_max: 154,
        srq_assert: 75,
        srq_max: 83,
        talk_wait: 47,
        listen_start: 60,
        listen_start_release: 10,
        listen_sync: 143,
        pulse_short: 70,
        pulse_long: 130,
        bit_short: 44,
        bit_long: 186,
        bit_split: 100,
        idle_window: 255,
    };

    /// 8 MHz: fine tick 1 µs, coarse tick 8 µs.
    pub const HALF_SPEED: TimingTable = TimingTable {
        attn_min: 85,
        attn_max: 116,
        sync_min: 22,
        sync_max: 77,
        srq_assert: 38,
        srq_max: 41,
        talk_wait: 24,
        listen_start: 30,
        listen_start_release: 5,
        listen_sync: 71,
        pulse_short: 35,
        pulse_long: 75,
        bit_short: 22,
        bit_long: 93,
        bit_split: 50,
        idle_window: 255,
    };

    pub fn for_speed(speed: Speed) -> Self {
        match speed {
            Speed::Full => Self::FULL_SPEED,
            Speed::Half => Self::HALF_SPEED,
        }
    }

    /// Converts a tick threshold back to microseconds, for logs.
    pub fn micros(speed: Speed, resolution: Resolution, ticks: u8) -> u64 {
        ticks as u64 * speed.tick_ns(resolution) / 1_000
    }
}

impl Default for TimingTable {
    fn default() -> Self {
        Self::FULL_SPEED
    }
}
