/// Register 3: address and handler id.
pub const IDENTITY_REGISTER: u8 = 3;

/// Handler id the host writes to request a self test. Never accepted.
pub const HANDLER_SELF_TEST: u8 = 0xFF;

/// Handler id the host writes to move a device only if it did not collide.
pub const HANDLER_COLLISION_ACK: u8 = 0xFE;

/// Bus address and handler id of one device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    pub address: u8,
    pub handler: u8,
}

impl Identity {
    pub const fn new(address: u8, handler: u8) -> Self {
        Self { address, handler }
    }

    /// Addresses 1..=15 are usable; 0 is reserved for the host.
    pub fn is_valid_address(address: u8) -> bool {
        (1..=0x0F).contains(&address)
    }

    /// Talk register 3 reply: exceptional-event and SRQ-enable bits set, then the address.
    pub fn register3(self) -> [u8; 2] {
        [0x60 | (self.address & 0x0F), self.handler]
    }
}
