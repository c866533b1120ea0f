use bitflags::bitflags;

use crate::{AdbDevice, DeviceClass, Identity, KeyQueue, Payload, IDENTITY_REGISTER};

/// Power/reset key code (without the key-up bit).
pub const RESET_KEY: u8 = 0x7F;

const KEY_UP: u8 = 0x80;

const DEFAULT_IDENTITY: Identity = Identity::new(2, 2);

bitflags! {
    /// Register 2, first byte: modifier state.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct Reg2High: u8 {
        const COMMAND = 1 << 0;
        const OPTION = 1 << 1;
        const SHIFT = 1 << 2;
        const CONTROL = 1 << 3;
        const RESET = 1 << 4;
        const CAPS_LOCK = 1 << 5;
        const DELETE = 1 << 6;
    }
}

bitflags! {
    /// Register 2, second byte: lock keys and the three host-controlled LEDs.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct Reg2Low: u8 {
        const LED_NUM_LOCK = 1 << 0;
        const LED_CAPS_LOCK = 1 << 1;
        const LED_SCROLL_LOCK = 1 << 2;
        const SCROLL_LOCK = 1 << 6;
        const NUM_LOCK = 1 << 7;
    }
}

const LED_MASK: u8 = 0x07;

/// Keyboard register file: scancode queue (register 0) and modifier flags (register 2).
#[derive(Debug, Clone)]
pub struct Keyboard {
    identity: Identity,
    queue: KeyQueue,
    reg2_high: u8,
    reg2_low: u8,
    talk_len: usize,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            identity: DEFAULT_IDENTITY,
            queue: KeyQueue::new(),
            reg2_high: 0xFF,
            reg2_low: 0xFF,
            talk_len: 0,
        }
    }

    pub fn queue(&self) -> &KeyQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut KeyQueue {
        &mut self.queue
    }

    pub fn reg2(&self) -> [u8; 2] {
        [self.reg2_high, self.reg2_low]
    }

    /// Queues a key transition (bit 7 set = released) and tracks modifier/lock state.
    ///
    /// The reset key goes in as a duplicated pair so both copies reach the host in one talk.
    pub fn key_event(&mut self, code: u8) {
        let released = code & KEY_UP != 0;
        let key = code & !KEY_UP;

        if key == RESET_KEY {
            self.queue.push_pair(code, code);
            set_bit(&mut self.reg2_high, Reg2High::RESET.bits(), !released);
            return;
        }

        self.queue.push(code);

        match key {
            0x71 => set_bit(&mut self.reg2_low, Reg2Low::SCROLL_LOCK.bits(), !released),
            0x47 => set_bit(&mut self.reg2_low, Reg2Low::NUM_LOCK.bits(), !released),
            0x37 => set_bit(&mut self.reg2_high, Reg2High::COMMAND.bits(), !released),
            0x3A | 0x7C => set_bit(&mut self.reg2_high, Reg2High::OPTION.bits(), !released),
            0x38 | 0x7B => set_bit(&mut self.reg2_high, Reg2High::SHIFT.bits(), !released),
            0x36 | 0x7D => set_bit(&mut self.reg2_high, Reg2High::CONTROL.bits(), !released),
            0x39 => set_bit(&mut self.reg2_high, Reg2High::CAPS_LOCK.bits(), !released),
            0x33 => set_bit(&mut self.reg2_high, Reg2High::DELETE.bits(), !released),
            _ => {}
        }
    }
}

fn set_bit(reg: &mut u8, bit: u8, on: bool) {
    if on {
        *reg |= bit;
    } else {
        *reg &= !bit;
    }
}

impl AdbDevice for Keyboard {
    fn class(&self) -> DeviceClass {
        DeviceClass::Keyboard
    }

    fn identity(&self) -> Identity {
        self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }

    fn needs_service(&self) -> bool {
        !self.queue.is_empty()
    }

    fn talk(&mut self, register: u8, out: &mut Payload) -> usize {
        match register {
            0 => {
                self.talk_len = self.queue.len();
                if self.talk_len == 0 {
                    return 0;
                }
                out[..2].copy_from_slice(&self.queue.peek_pair().to_be_bytes());
                2
            }
            2 => {
                out[..2].copy_from_slice(&self.reg2());
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
            self.queue.drain(self.talk_len);
        }
    }

    fn listen(&mut self, register: u8, value: u16) {
        if register == 2 {
            // Only the LED bits are host-writable.
            self.reg2_low = (self.reg2_low & !LED_MASK) | (value as u8 & LED_MASK);
        }
    }

    fn flush(&mut self) {
        self.queue.clear();
        self.reg2_high = 0xFF;
        self.reg2_low = 0xFF;
        self.talk_len = 0;
    }

    fn reset(&mut self) {
        self.identity = DEFAULT_IDENTITY;
        self.flush();
    }

    fn accepts_handler(&self, handler: u8) -> bool {
        matches!(handler, 2 | 3)
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}
