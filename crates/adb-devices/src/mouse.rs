use crate::{AdbDevice, DeviceClass, Identity, Payload, IDENTITY_REGISTER};

/// Most negative delta one report can carry (7-bit two's complement).
pub const MOUSE_DELTA_MIN: i16 = -64;
/// Most positive delta one report can carry.
pub const MOUSE_DELTA_MAX: i16 = 63;

const DEFAULT_ADDRESS: u8 = 3;
const DEFAULT_HANDLER: u8 = 1;

/// Relative pointing device.
///
/// Motion accumulates between polls; each register 0 talk reports at most one clamped step and
/// the remainder stays pending for the next poll.
#[derive(Debug, Clone)]
pub struct Mouse {
    identity: Identity,
    default_handler: u8,
    buttons: u8,
    reported: u8,
    dx: i16,
    dy: i16,
    last_dx: i8,
    last_dy: i8,
}

impl Mouse {
    pub fn new() -> Self {
        Self::with_handler(DEFAULT_HANDLER)
    }

    pub fn with_handler(handler: u8) -> Self {
        Self {
            identity: Identity::new(DEFAULT_ADDRESS, handler),
            default_handler: handler,
            buttons: 0,
            reported: 0,
            dx: 0,
            dy: 0,
            last_dx: 0,
            last_dy: 0,
        }
    }

    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    /// Pending motion not yet reported to the host.
    pub fn pending_motion(&self) -> (i16, i16) {
        (self.dx, self.dy)
    }

    pub fn set_buttons_low(&mut self, nibble: u8) {
        self.buttons = (self.buttons & 0xF0) | (nibble & 0x0F);
    }

    pub fn set_buttons_high(&mut self, nibble: u8) {
        self.buttons = (self.buttons & 0x0F) | ((nibble & 0x0F) << 4);
    }

    pub fn move_by(&mut self, dx: i16, dy: i16) {
        self.dx = self.dx.saturating_add(dx);
        self.dy = self.dy.saturating_add(dy);
    }

    pub fn clear_buttons(&mut self) {
        self.buttons = 0;
    }

    pub fn clear_x(&mut self) {
        self.dx = 0;
    }

    pub fn clear_y(&mut self) {
        self.dy = 0;
    }
}

fn clamp_delta(v: i16) -> i8 {
    v.clamp(MOUSE_DELTA_MIN, MOUSE_DELTA_MAX) as i8
}

impl AdbDevice for Mouse {
    fn class(&self) -> DeviceClass {
        DeviceClass::Mouse
    }

    fn identity(&self) -> Identity {
        self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }

    fn needs_service(&self) -> bool {
        self.buttons != self.reported || self.dx != 0 || self.dy != 0
    }

    fn talk(&mut self, register: u8, out: &mut Payload) -> usize {
        match register {
            0 if self.needs_service() => {
                self.last_dx = clamp_delta(self.dx);
                self.last_dy = clamp_delta(self.dy);
                // Button bits are active low.
                out[0] = (self.last_dy as u8 & 0x7F) | ((!self.buttons & 0x01) << 7);
                out[1] = (self.last_dx as u8 & 0x7F) | ((!self.buttons & 0x02) << 6);
                2
            }
            IDENTITY_REGISTER => {
                out[..2].copy_from_slice(&self.identity.register3());
                2
            }
            _ => 0,
        }
    }

    fn talk_drain(&mut self, register: u8) {
        if register == 0 {
            self.reported = self.buttons;
            // Motion can arrive between the talk and the drain.
            self.dx = self.dx.saturating_sub(i16::from(self.last_dx));
            self.dy = self.dy.saturating_sub(i16::from(self.last_dy));
            self.last_dx = 0;
            self.last_dy = 0;
        }
    }

    fn listen(&mut self, _register: u8, _value: u16) {}

    fn flush(&mut self) {
        self.buttons = 0;
        self.reported = 0;
        self.dx = 0;
        self.dy = 0;
        self.last_dx = 0;
        self.last_dy = 0;
    }

    fn reset(&mut self) {
        self.identity = Identity::new(DEFAULT_ADDRESS, self.default_handler);
        self.flush();
    }
}

impl Default for Mouse {
    fn default() -> Self {
        Self::new()
    }
}
