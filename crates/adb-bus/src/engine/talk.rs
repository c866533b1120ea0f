use adb_devices::{DeviceClass, Ingest, IDENTITY_REGISTER, MAX_PAYLOAD};
use adb_time::Resolution;
use tracing::{debug, trace};

use super::{BusEngine, Outcome};
use crate::{BusError, BusPort, Phase};

impl<B: BusPort, I: Ingest> BusEngine<B, I> {
    /// Answers a talk: wait out the turnaround, send the frame, then let the device consume
    /// what went out.
    pub(super) fn talk(&mut self, class: DeviceClass, register: u8) -> Result<Outcome, BusError> {
        let target = class.mask();
        self.bus.start_timer(Resolution::Coarse);

        let mut payload = [0u8; MAX_PAYLOAD];
        let len = self
            .devices
            .talk(target, register, &mut payload)
            .min(MAX_PAYLOAD);
        if len == 0 {
            self.bus.stop_timer();
            return Ok(Outcome::TalkSilent {
                target: class,
                register,
            });
        }

        let wait = self.timing.talk_wait;
        while !self.bus.is_asserted() && self.bus.read_ticks() < wait {
            self.poll_ingest();
        }
        let sent = if self.bus.stop_timer() < wait {
            // Someone else answered first.
            Err(BusError::Collision {
                phase: Phase::Turnaround,
            })
        } else {
            self.link().write_frame(&payload[..len])
        };

        if let Err(err) = sent {
            if err.is_collision() && register == IDENTITY_REGISTER {
                self.collisions |= target;
                debug!(class = class.name(), "address collision flagged");
            }
            return Err(err);
        }

        self.devices.talk_drain(target, register);
        trace!(class = class.name(), register, len, "talk complete");
        Ok(Outcome::Talked {
            target: class,
            register,
            bytes: payload[..len].to_vec(),
        })
    }
}
