use crate::{Resolution, Speed};

/// Elapsed-time facility used by every busy-wait in the protocol engine.
///
/// Starting and stopping both clear the counter. Reads saturate at `u8::MAX` instead of
/// wrapping; every timeout the engine uses fits below that.
pub trait TickTimer {
    /// Resets the counter and starts it at `resolution`.
    fn start_timer(&mut self, resolution: Resolution);

    /// Ticks elapsed since the last [`TickTimer::start_timer`], or 0 while stopped.
    fn read_ticks(&mut self) -> u8;

    /// Returns the elapsed ticks and halts (and clears) the counter.
    fn stop_timer(&mut self) -> u8;
}

/// Model of the 8-bit prescaled hardware counter, driven from a nanosecond clock.
///
/// Simulated buses own one of these and feed it their virtual time.
#[derive(Debug, Clone)]
pub struct TickCounter {
    speed: Speed,
    running: Option<Resolution>,
    base_ns: u64,
}

impl TickCounter {
    pub fn new(speed: Speed) -> Self {
        Self {
            speed,
            running: None,
            base_ns: 0,
        }
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn start(&mut self, resolution: Resolution, now_ns: u64) {
        self.running = Some(resolution);
        self.base_ns = now_ns;
    }

    pub fn read(&self, now_ns: u64) -> u8 {
        let Some(resolution) = self.running else {
            return 0;
        };
        let delta_ns = now_ns.saturating_sub(self.base_ns);
        let ticks = delta_ns / self.speed.tick_ns(resolution);
        ticks.min(u8::MAX as u64) as u8
    }

    pub fn stop(&mut self, now_ns: u64) -> u8 {
        let ticks = self.read(now_ns);
        self.running = None;
        self.base_ns = 0;
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_counter_reads_zero() {
        let counter = TickCounter::new(Speed::Full);
        assert_eq!(counter.read(1_000_000), 0);
        assert!(!counter.is_running());
    }

    #[test]
    fn counts_in_selected_resolution() {
        let mut counter = TickCounter::new(Speed::Full);
        counter.start(Resolution::Fine, 10_000);
        assert_eq!(counter.read(10_000), 0);
        assert_eq!(counter.read(10_499), 0);
        assert_eq!(counter.read(10_500), 1);
        assert_eq!(counter.read(10_000 + 65_000), 130);

        counter.start(Resolution::Coarse, 0);
        assert_eq!(counter.read(800_000), 200);
    }

    #[test]
    fn saturates_instead_of_wrapping() {
        let mut counter = TickCounter::new(Speed::Half);
        counter.start(Resolution::Coarse, 0);
        assert_eq!(counter.read(10_000_000), u8::MAX);
    }

    #[test]
    fn stop_returns_elapsed_and_clears() {
        let mut counter = TickCounter::new(Speed::Half);
        counter.start(Resolution::Fine, 5_000);
        assert_eq!(counter.stop(40_000), 35);
        assert!(!counter.is_running());
        assert_eq!(counter.read(80_000), 0);
    }
}
