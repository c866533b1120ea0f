use crate::{Arbitrary, DeviceClass, Identity, Keyboard, Mouse};

/// Largest talk/listen payload the bus allows.
pub const MAX_PAYLOAD: usize = 8;

/// Transmit buffer handed to [`AdbDevice::talk`].
pub type Payload = [u8; MAX_PAYLOAD];

/// Register-file operations the protocol engine needs from a device class.
pub trait AdbDevice {
    fn class(&self) -> DeviceClass;

    fn identity(&self) -> Identity;

    fn identity_mut(&mut self) -> &mut Identity;

    /// Whether the class has data the host has not collected yet.
    fn needs_service(&self) -> bool;

    /// Fills `out` with the reply for `register` and returns its length (0 = stay silent).
    fn talk(&mut self, register: u8, out: &mut Payload) -> usize;

    /// Consumes what the last [`AdbDevice::talk`] on `register` produced. Only called after
    /// the reply went out on the wire without error.
    fn talk_drain(&mut self, register: u8);

    /// Host write to `register` (never register 3; the engine owns identity updates).
    fn listen(&mut self, register: u8, value: u16);

    /// Clears volatile registers, keeping address and handler.
    fn flush(&mut self);

    /// Restores the default identity and clears volatile registers.
    fn reset(&mut self);

    /// Handler ids this class switches to on a register 3 listen.
    fn accepts_handler(&self, _handler: u8) -> bool {
        false
    }
}

/// The closed set of emulated device classes.
#[derive(Debug, Clone)]
pub enum Device {
    Keyboard(Keyboard),
    Mouse(Mouse),
    Arbitrary(Arbitrary),
}

macro_rules! dispatch {
    ($self:expr, $dev:ident => $body:expr) => {
        match $self {
            Device::Keyboard($dev) => $body,
            Device::Mouse($dev) => $body,
            Device::Arbitrary($dev) => $body,
        }
    };
}

impl AdbDevice for Device {
    fn class(&self) -> DeviceClass {
        dispatch!(self, d => d.class())
    }

    fn identity(&self) -> Identity {
        dispatch!(self, d => d.identity())
    }

    fn identity_mut(&mut self) -> &mut Identity {
        dispatch!(self, d => d.identity_mut())
    }

    fn needs_service(&self) -> bool {
        dispatch!(self, d => d.needs_service())
    }

    fn talk(&mut self, register: u8, out: &mut Payload) -> usize {
        dispatch!(self, d => d.talk(register, out))
    }

    fn talk_drain(&mut self, register: u8) {
        dispatch!(self, d => d.talk_drain(register))
    }

    fn listen(&mut self, register: u8, value: u16) {
        dispatch!(self, d => d.listen(register, value))
    }

    fn flush(&mut self) {
        dispatch!(self, d => d.flush())
    }

    fn reset(&mut self) {
        dispatch!(self, d => d.reset())
    }

    fn accepts_handler(&self, handler: u8) -> bool {
        dispatch!(self, d => d.accepts_handler(handler))
    }
}
