//! The bus protocol state machine.
//!
//! One call to [`BusEngine::service`] is one pass through
//! idle → attention → sync → command → service request → flush/talk/listen.
//! Every phase measures line timing by polling; any out-of-window measurement abandons the
//! transaction and control returns to the caller, which simply calls `service` again.

mod listen;
mod srq;
mod talk;

use std::fmt;

use adb_devices::{ConfigError, DeviceClass, DeviceMask, DeviceSet, Ingest};
use adb_time::TimingTable;
use tracing::{debug, info, trace};

use crate::{BitTransport, BusError, BusPort, EngineConfig, Phase};

/// What one [`BusEngine::service`] call observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The line never went low during the idle window.
    Idle,
    /// A low period too short to be an attention signal.
    Spurious,
    /// A low period long enough to be a bus reset; devices are back at their defaults.
    Reset,
    /// A command for an address none of our devices hold.
    NotAddressed,
    Flushed(DeviceMask),
    /// A command with a reserved low nibble.
    Reserved,
    Talked {
        target: DeviceClass,
        register: u8,
        bytes: Vec<u8>,
    },
    /// The addressed register had nothing to say.
    TalkSilent {
        target: DeviceClass,
        register: u8,
    },
    /// `accepted` is false when a register 3 write was refused.
    Listened {
        target: DeviceClass,
        register: u8,
        accepted: bool,
    },
    Aborted(BusError),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Idle => f.write_str("idle"),
            Outcome::Spurious => f.write_str("spurious low"),
            Outcome::Reset => f.write_str("bus reset"),
            Outcome::NotAddressed => f.write_str("not addressed"),
            Outcome::Flushed(mask) => write!(f, "flushed {mask:?}"),
            Outcome::Reserved => f.write_str("reserved command"),
            Outcome::Talked {
                target,
                register,
                bytes,
            } => {
                write!(f, "{} talk r{register}:", target.name())?;
                for b in bytes {
                    write!(f, " {b:02x}")?;
                }
                Ok(())
            }
            Outcome::TalkSilent { target, register } => {
                write!(f, "{} talk r{register}: silent", target.name())
            }
            Outcome::Listened {
                target,
                register,
                accepted,
            } => {
                let verdict = if *accepted { "accepted" } else { "rejected" };
                write!(f, "{} listen r{register}: {verdict}", target.name())
            }
            Outcome::Aborted(err) => write!(f, "aborted: {err}"),
        }
    }
}

/// Bus device emulator: owns the line, the host data feed and the emulated devices.
pub struct BusEngine<B, I> {
    bus: B,
    ingest: I,
    devices: DeviceSet,
    timing: TimingTable,
    collisions: DeviceMask,
}

impl<B: BusPort, I: Ingest> BusEngine<B, I> {
    /// Builds the device set from `config` and puts every device in its reset state.
    pub fn new(bus: B, ingest: I, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut engine = Self {
            bus,
            ingest,
            devices: DeviceSet::new(&config.devices),
            timing: config.timing,
            collisions: DeviceMask::empty(),
        };
        engine.reset();
        Ok(engine)
    }

    /// Restores default identities and clears all device registers and collision flags.
    pub fn reset(&mut self) {
        self.devices.reset();
        self.collisions = DeviceMask::empty();
        info!("bus reset");
    }

    /// Runs at most one bus transaction.
    ///
    /// Returns [`Outcome::Idle`] if the line stays high for a whole idle window, so the caller's
    /// loop gets control back regularly even on a silent bus.
    pub fn service(&mut self) -> Outcome {
        match self.transaction() {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(%err, "transaction aborted");
                Outcome::Aborted(err)
            }
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn ingest_mut(&mut self) -> &mut I {
        &mut self.ingest
    }

    pub fn devices(&self) -> &DeviceSet {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut DeviceSet {
        &mut self.devices
    }

    /// Classes whose last identity talk collided with another device.
    pub fn collisions(&self) -> DeviceMask {
        self.collisions
    }

    fn transaction(&mut self) -> Result<Outcome, BusError> {
        let t = self.timing;

        self.link().wait_for_assertion(t.idle_window);
        if !self.bus.is_asserted() {
            return Ok(Outcome::Idle);
        }

        let low = self.link().wait_for_line_free(t.attn_max);
        if low < t.attn_min {
            trace!(ticks = low, "spurious low");
            return Ok(Outcome::Spurious);
        }
        if low >= t.attn_max {
            self.reset();
            return Ok(Outcome::Reset);
        }

        let gap = self.link().resync(t.sync_max);
        if gap < t.sync_min || gap >= t.sync_max {
            return Err(BusError::PhaseTiming {
                phase: Phase::Sync,
                ticks: gap,
            });
        }

        let command = self.link().read_byte()?;
        trace!(command = format_args!("{command:#04x}"), "command received");

        let target = self.service_request(command)?;
        let Some(class) = target.first_class() else {
            return Ok(Outcome::NotAddressed);
        };

        let register = command & 0b11;
        match command & 0x0F {
            // A whole low nibble of 0001 flushes the device; there is no register selector.
            0b0001 => {
                self.devices.flush(target);
                trace!(class = class.name(), "flush");
                Ok(Outcome::Flushed(target))
            }
            low => match low >> 2 {
                0b11 => self.talk(class, register),
                0b10 => self.listen(class, register),
                _ => Ok(Outcome::Reserved),
            },
        }
    }

    /// Bit transport over our line, yielding to the ingest feed.
    fn link(&mut self) -> BitTransport<'_, B, impl FnMut() + '_> {
        let Self {
            bus,
            ingest,
            devices,
            timing,
            ..
        } = self;
        BitTransport::new(bus, timing, move || ingest.poll(devices))
    }

    fn poll_ingest(&mut self) {
        self.ingest.poll(&mut self.devices);
    }
}
