/// Keyboard queue capacity. Must stay a power of two.
pub const KEY_QUEUE_CAPACITY: usize = 16;

/// Filler used for padding and for the missing half of a single-entry read.
pub const KEY_QUEUE_FILLER: u8 = 0xFF;

const INDEX_MASK: usize = KEY_QUEUE_CAPACITY - 1;

const _: () = assert!(KEY_QUEUE_CAPACITY.is_power_of_two());

/// Circular scancode queue read two entries at a time by keyboard register 0.
///
/// This is not a general ring buffer. Values that must reach the host in the same talk
/// (the reset key's duplicated code, for instance) go in through [`KeyQueue::push_pair`], which
/// keeps the pair aligned to an even offset so a single read always returns both halves.
#[derive(Debug, Clone)]
pub struct KeyQueue {
    head: usize,
    len: usize,
    data: [u8; KEY_QUEUE_CAPACITY],
}

impl KeyQueue {
    pub fn new() -> Self {
        Self {
            head: 0,
            len: 0,
            data: [0; KEY_QUEUE_CAPACITY],
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn free(&self) -> usize {
        KEY_QUEUE_CAPACITY - self.len
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Appends one byte. Returns `false` (and drops the byte) when full.
    pub fn push(&mut self, value: u8) -> bool {
        if self.len >= KEY_QUEUE_CAPACITY {
            return false;
        }
        self.push_raw(value);
        true
    }

    /// Appends two bytes that must be read together.
    ///
    /// An odd occupancy is first padded with [`KEY_QUEUE_FILLER`]. Nothing is inserted unless
    /// the whole operation fits (3 slots when padding, 2 otherwise).
    pub fn push_pair(&mut self, first: u8, second: u8) -> bool {
        let pad = self.len & 1 == 1;
        let needed = if pad { 3 } else { 2 };
        if self.free() < needed {
            return false;
        }
        if pad {
            self.push_raw(KEY_QUEUE_FILLER);
        }
        self.push_raw(first);
        self.push_raw(second);
        true
    }

    /// First two entries packed big-endian, without removing them.
    ///
    /// Missing entries read as [`KEY_QUEUE_FILLER`].
    pub fn peek_pair(&self) -> u16 {
        match self.len {
            0 => u16::from_be_bytes([KEY_QUEUE_FILLER, KEY_QUEUE_FILLER]),
            1 => u16::from_be_bytes([self.data[self.head], KEY_QUEUE_FILLER]),
            _ => u16::from_be_bytes([
                self.data[self.head],
                self.data[(self.head + 1) & INDEX_MASK],
            ]),
        }
    }

    /// Removes up to two entries. Counts above 2 are treated as 2; asking for two entries when
    /// only one is queued removes nothing.
    pub fn drain(&mut self, count: usize) {
        match count {
            0 => {}
            1 if self.len >= 1 => self.advance(1),
            _ if count >= 2 && self.len >= 2 => self.advance(2),
            _ => {}
        }
    }

    fn advance(&mut self, n: usize) {
        self.head = (self.head + n) & INDEX_MASK;
        self.len -= n;
    }

    fn push_raw(&mut self, value: u8) {
        self.data[(self.head + self.len) & INDEX_MASK] = value;
        self.len += 1;
    }
}

impl Default for KeyQueue {
    fn default() -> Self {
        Self::new()
    }
}
