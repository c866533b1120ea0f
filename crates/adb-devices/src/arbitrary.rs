use crate::{AdbDevice, DeviceClass, Identity, Payload, IDENTITY_REGISTER, MAX_PAYLOAD};

/// Bytes register 0 can buffer.
pub const ARBITRARY_REG0_CAPACITY: usize = MAX_PAYLOAD;

/// Host-defined device: register 0 is a staged byte buffer, register 2 a host-writable word.
#[derive(Debug, Clone)]
pub struct Arbitrary {
    identity: Identity,
    default_identity: Identity,
    reg0: [u8; ARBITRARY_REG0_CAPACITY],
    reg0_len: usize,
    reg0_ready: bool,
    reg2: u16,
    reg2_set: bool,
}

impl Arbitrary {
    pub const DEFAULT_ADDRESS: u8 = 7;
    pub const DEFAULT_HANDLER: u8 = 0xFC;

    pub fn new(address: u8, handler: u8) -> Self {
        let identity = Identity::new(address, handler);
        Self {
            identity,
            default_identity: identity,
            reg0: [0; ARBITRARY_REG0_CAPACITY],
            reg0_len: 0,
            reg0_ready: false,
            reg2: 0,
            reg2_set: false,
        }
    }

    pub fn reg0(&self) -> &[u8] {
        &self.reg0[..self.reg0_len]
    }

    pub fn reg0_ready(&self) -> bool {
        self.reg0_ready
    }

    /// Appends one byte to register 0. Returns `false` (byte dropped) when full.
    pub fn push_reg0(&mut self, byte: u8) -> bool {
        if self.reg0_len >= ARBITRARY_REG0_CAPACITY {
            return false;
        }
        self.reg0[self.reg0_len] = byte;
        self.reg0_len += 1;
        true
    }

    /// Publishes register 0 to the host. Needs at least two buffered bytes.
    pub fn mark_reg0_ready(&mut self) -> bool {
        if self.reg0_len >= 2 {
            self.reg0_ready = true;
        }
        self.reg0_ready
    }

    /// Replaces register 0 and publishes it. Excess bytes are dropped.
    pub fn set_reg0(&mut self, bytes: &[u8]) -> bool {
        self.clear_reg0();
        for &b in bytes {
            self.push_reg0(b);
        }
        self.mark_reg0_ready()
    }

    pub fn clear_reg0(&mut self) {
        self.reg0_len = 0;
        self.reg0_ready = false;
    }

    pub fn reg2(&self) -> u16 {
        self.reg2
    }

    /// Whether the host wrote register 2 since it was last cleared.
    pub fn reg2_set(&self) -> bool {
        self.reg2_set
    }

    pub fn set_reg2(&mut self, value: u16) {
        self.reg2 = value;
        self.reg2_set = true;
    }

    pub fn clear_reg2(&mut self) {
        self.reg2 = 0;
        self.reg2_set = false;
    }
}

impl AdbDevice for Arbitrary {
    fn class(&self) -> DeviceClass {
        DeviceClass::Arbitrary
    }

    fn identity(&self) -> Identity {
        self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }

    fn needs_service(&self) -> bool {
        self.reg0_ready
    }

    fn talk(&mut self, register: u8, out: &mut Payload) -> usize {
        match register {
            0 if self.reg0_ready => {
                let len = self.reg0_len.min(MAX_PAYLOAD);
                out[..len].copy_from_slice(&self.reg0[..len]);
                len
            }
            2 => {
                out[..2].copy_from_slice(&self.reg2.to_be_bytes());
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
            self.clear_reg0();
        }
    }

    fn listen(&mut self, register: u8, value: u16) {
        if register == 2 {
            self.set_reg2(value);
        }
    }

    fn flush(&mut self) {
        self.clear_reg0();
        self.clear_reg2();
    }

    fn reset(&mut self) {
        self.identity = self.default_identity;
        self.flush();
    }
}

impl Default for Arbitrary {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ADDRESS, Self::DEFAULT_HANDLER)
    }
}
