use adb_devices::{
    DeviceClass, Identity, Ingest, HANDLER_COLLISION_ACK, HANDLER_SELF_TEST, IDENTITY_REGISTER,
    MAX_PAYLOAD,
};
use tracing::{debug, info, trace};

use super::{BusEngine, Outcome};
use crate::{BusError, BusPort, ProtocolFault};

impl<B: BusPort, I: Ingest> BusEngine<B, I> {
    /// Receives a listen payload and hands it to the addressed class.
    pub(super) fn listen(&mut self, class: DeviceClass, register: u8) -> Result<Outcome, BusError> {
        let t = self.timing;
        let mut data = [0u8; MAX_PAYLOAD];
        let mut len = 0;
        {
            let mut link = self.link();
            if link.wait_for_assertion(t.listen_start) >= t.listen_start {
                return Err(ProtocolFault::ListenStartTimeout.into());
            }
            if link.wait_for_line_free(t.listen_start_release) >= t.listen_start_release {
                return Err(ProtocolFault::ListenStartOverrun.into());
            }
            if link.resync(t.listen_sync) >= t.listen_sync {
                return Err(ProtocolFault::ListenSyncTimeout.into());
            }

            // The host's stop bit shows up as a failed read after the last byte.
            while len < MAX_PAYLOAD {
                match link.read_byte() {
                    Ok(byte) => {
                        data[len] = byte;
                        len += 1;
                    }
                    Err(_) => break,
                }
            }
        }

        if len < 2 {
            return Err(ProtocolFault::ShortListen { received: len }.into());
        }
        trace!(class = class.name(), register, len, "listen received");

        let accepted = if register == IDENTITY_REGISTER {
            self.update_identity(class, data[0], data[1])
        } else {
            self.devices
                .listen(class.mask(), register, u16::from_be_bytes([data[0], data[1]]));
            true
        };
        Ok(Outcome::Listened {
            target: class,
            register,
            accepted,
        })
    }

    /// Applies a register 3 write. Returns whether anything changed.
    fn update_identity(&mut self, class: DeviceClass, byte0: u8, handler: u8) -> bool {
        let target = class.mask();

        if handler == HANDLER_SELF_TEST {
            debug!(class = class.name(), "self test request ignored");
            return false;
        }
        if handler == HANDLER_COLLISION_ACK && self.collisions.contains(target) {
            self.collisions.remove(target);
            debug!(class = class.name(), "collision flag cleared, move refused");
            return false;
        }

        let address = byte0 & 0x0F;
        if !Identity::is_valid_address(address) {
            debug!(class = class.name(), address, "invalid address refused");
            return false;
        }

        let accepts_handler = self.devices.accepts_handler(class, handler);
        let Some(identity) = self.devices.identity_mut(class) else {
            return false;
        };
        let previous = *identity;
        identity.address = address;
        if accepts_handler {
            identity.handler = handler;
        }
        info!(
            class = class.name(),
            from = previous.address,
            to = identity.address,
            handler = identity.handler,
            "identity updated"
        );
        true
    }
}
