use std::collections::VecDeque;

use crate::{DeviceSet, Ingest, KEY_QUEUE_CAPACITY};

const STATUS_BASE: u8 = 0x80;
const STATUS_KEYBOARD_BACKLOG: u8 = 1 << 0;
const STATUS_ARBITRARY_REG0_READY: u8 = 1 << 2;
const STATUS_ARBITRARY_REG2_SET: u8 = 1 << 3;

/// Decoder for the nibble-coded host link.
///
/// Each byte carries a command in its upper nibble and four data bits in its lower nibble, so
/// full bytes (keycodes, register 0 payload) arrive as a low-nibble byte followed by a
/// high-nibble byte that commits the value.
#[derive(Debug, Default, Clone)]
pub struct SerialDecoder {
    keyboard_low: u8,
    arbitrary_low: u8,
}

impl SerialDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one host byte to `devices`, returning the reply byte if the command has one.
    ///
    /// Commands addressed to a class that is not present are ignored.
    pub fn handle(&mut self, byte: u8, devices: &mut DeviceSet) -> Option<u8> {
        let cmd = byte >> 4;
        let nibble = byte & 0x0F;

        match cmd {
            0x0 => return self.special(nibble, devices),
            0x1 => {}
            0x2 => self.arbitrary_low = nibble,
            0x3 => {
                let value = (nibble << 4) | self.arbitrary_low;
                self.arbitrary_low = 0;
                if let Some(arb) = devices.arbitrary_mut() {
                    arb.push_reg0(value);
                }
            }
            0x4 => self.keyboard_low = nibble,
            0x5 => {
                let code = (nibble << 4) | self.keyboard_low;
                self.keyboard_low = 0;
                if let Some(kbd) = devices.keyboard_mut() {
                    kbd.key_event(code);
                }
            }
            0x6 => {
                if let Some(mouse) = devices.mouse_mut() {
                    mouse.set_buttons_low(nibble);
                }
            }
            0x7 => {
                if let Some(mouse) = devices.mouse_mut() {
                    mouse.set_buttons_high(nibble);
                }
            }
            _ => {
                // 1 y x16 neg
                let mut delta = i16::from(nibble);
                if cmd & 0b0010 != 0 {
                    delta <<= 4;
                }
                if cmd & 0b0001 != 0 {
                    delta = -delta;
                }
                if let Some(mouse) = devices.mouse_mut() {
                    if cmd & 0b0100 != 0 {
                        mouse.move_by(0, delta);
                    } else {
                        mouse.move_by(delta, 0);
                    }
                }
            }
        }
        None
    }

    fn special(&mut self, op: u8, devices: &mut DeviceSet) -> Option<u8> {
        match op {
            0x1 => {
                let mut status = STATUS_BASE;
                if let Some(arb) = devices.arbitrary() {
                    if arb.reg2_set() {
                        status |= STATUS_ARBITRARY_REG2_SET;
                    }
                    if arb.reg0_ready() {
                        status |= STATUS_ARBITRARY_REG0_READY;
                    }
                }
                if let Some(kbd) = devices.keyboard() {
                    if kbd.queue().len() > KEY_QUEUE_CAPACITY / 2 {
                        status |= STATUS_KEYBOARD_BACKLOG;
                    }
                }
                Some(status)
            }
            0x2 => {
                if let Some(arb) = devices.arbitrary_mut() {
                    arb.mark_reg0_ready();
                }
                None
            }
            0x3 => {
                if let Some(arb) = devices.arbitrary_mut() {
                    arb.clear_reg0();
                }
                None
            }
            0x4 => {
                if let Some(arb) = devices.arbitrary_mut() {
                    arb.clear_reg2();
                }
                None
            }
            0x5 => {
                if let Some(kbd) = devices.keyboard_mut() {
                    kbd.queue_mut().clear();
                }
                None
            }
            0x6 => {
                if let Some(mouse) = devices.mouse_mut() {
                    mouse.clear_buttons();
                }
                None
            }
            0x7 => {
                if let Some(mouse) = devices.mouse_mut() {
                    mouse.clear_x();
                }
                None
            }
            0x8 => {
                if let Some(mouse) = devices.mouse_mut() {
                    mouse.clear_y();
                }
                None
            }
            0xC..=0xF => {
                let [high, low] = devices.arbitrary()?.reg2().to_be_bytes();
                Some(match op {
                    0xC => 0x40 | (low & 0x0F),
                    0xD => 0x50 | (low >> 4),
                    0xE => 0x60 | (high & 0x0F),
                    _ => 0x70 | (high >> 4),
                })
            }
            _ => None,
        }
    }
}

/// Byte-oriented, non-blocking host link.
pub trait ByteChannel {
    fn try_recv(&mut self) -> Option<u8>;

    fn send(&mut self, byte: u8);
}

/// In-memory [`ByteChannel`]: bytes queued with [`LoopbackChannel::feed`] are received in order,
/// replies collect until [`LoopbackChannel::take_sent`].
#[derive(Debug, Default, Clone)]
pub struct LoopbackChannel {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
}

impl LoopbackChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes.iter().copied());
    }

    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    pub fn take_sent(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }
}

impl ByteChannel for LoopbackChannel {
    fn try_recv(&mut self) -> Option<u8> {
        self.inbound.pop_front()
    }

    fn send(&mut self, byte: u8) {
        self.outbound.push(byte);
    }
}

/// [`Ingest`] that moves at most one byte per poll from a [`ByteChannel`] into the devices.
#[derive(Debug, Default)]
pub struct SerialIngest<C> {
    channel: C,
    decoder: SerialDecoder,
}

impl<C: ByteChannel> SerialIngest<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            decoder: SerialDecoder::new(),
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }
}

impl<C: ByteChannel> Ingest for SerialIngest<C> {
    fn poll(&mut self, devices: &mut DeviceSet) {
        let Some(byte) = self.channel.try_recv() else {
            return;
        };
        if let Some(reply) = self.decoder.handle(byte, devices) {
            self.channel.send(reply);
        }
    }
}
