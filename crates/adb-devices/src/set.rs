use tracing::debug;

use crate::{
    AdbDevice, Arbitrary, ConfigError, Device, DeviceClass, DeviceMask, Identity, Keyboard, Mouse,
    Payload,
};

/// Which device classes to emulate and their power-on identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub keyboard: bool,
    pub mouse: bool,
    pub arbitrary: bool,
    pub mouse_handler: u8,
    pub arbitrary_address: u8,
    pub arbitrary_handler: u8,
}

impl DeviceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.keyboard || self.mouse || self.arbitrary) {
            return Err(ConfigError::NoDevices);
        }

        let mut used: Vec<(DeviceClass, Identity)> = Vec::new();
        if self.keyboard {
            used.push((DeviceClass::Keyboard, Keyboard::new().identity()));
        }
        if self.mouse {
            used.push((DeviceClass::Mouse, Identity::new(3, self.mouse_handler)));
        }
        if self.arbitrary {
            used.push((
                DeviceClass::Arbitrary,
                Identity::new(self.arbitrary_address, self.arbitrary_handler),
            ));
        }

        for (i, &(class, id)) in used.iter().enumerate() {
            if !Identity::is_valid_address(id.address) {
                return Err(ConfigError::InvalidAddress {
                    class,
                    address: id.address,
                });
            }
            if id.handler >= crate::HANDLER_COLLISION_ACK {
                return Err(ConfigError::ReservedHandler {
                    class,
                    handler: id.handler,
                });
            }
            if let Some(&(first, _)) = used[..i].iter().find(|(_, o)| o.address == id.address) {
                return Err(ConfigError::AddressConflict {
                    first,
                    second: class,
                    address: id.address,
                });
            }
        }
        Ok(())
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            keyboard: cfg!(feature = "keyboard"),
            mouse: cfg!(feature = "mouse"),
            arbitrary: cfg!(feature = "arbitrary"),
            mouse_handler: 1,
            arbitrary_address: Arbitrary::DEFAULT_ADDRESS,
            arbitrary_handler: Arbitrary::DEFAULT_HANDLER,
        }
    }
}

/// The emulated devices, kept in address-match priority order (keyboard, mouse, arbitrary).
#[derive(Debug, Clone)]
pub struct DeviceSet {
    devices: Vec<Device>,
}

impl DeviceSet {
    pub fn new(config: &DeviceConfig) -> Self {
        let mut devices = Vec::with_capacity(3);
        if config.keyboard {
            devices.push(Device::Keyboard(Keyboard::new()));
        }
        if config.mouse {
            devices.push(Device::Mouse(Mouse::with_handler(config.mouse_handler)));
        }
        if config.arbitrary {
            devices.push(Device::Arbitrary(Arbitrary::new(
                config.arbitrary_address,
                config.arbitrary_handler,
            )));
        }
        Self { devices }
    }

    pub fn present(&self) -> DeviceMask {
        self.devices
            .iter()
            .fold(DeviceMask::empty(), |m, d| m | d.class().mask())
    }

    pub fn get(&self, class: DeviceClass) -> Option<&Device> {
        self.devices.iter().find(|d| d.class() == class)
    }

    pub fn get_mut(&mut self, class: DeviceClass) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.class() == class)
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        match self.get(DeviceClass::Keyboard)? {
            Device::Keyboard(k) => Some(k),
            _ => None,
        }
    }

    pub fn keyboard_mut(&mut self) -> Option<&mut Keyboard> {
        match self.get_mut(DeviceClass::Keyboard)? {
            Device::Keyboard(k) => Some(k),
            _ => None,
        }
    }

    pub fn mouse(&self) -> Option<&Mouse> {
        match self.get(DeviceClass::Mouse)? {
            Device::Mouse(m) => Some(m),
            _ => None,
        }
    }

    pub fn mouse_mut(&mut self) -> Option<&mut Mouse> {
        match self.get_mut(DeviceClass::Mouse)? {
            Device::Mouse(m) => Some(m),
            _ => None,
        }
    }

    pub fn arbitrary(&self) -> Option<&Arbitrary> {
        match self.get(DeviceClass::Arbitrary)? {
            Device::Arbitrary(a) => Some(a),
            _ => None,
        }
    }

    pub fn arbitrary_mut(&mut self) -> Option<&mut Arbitrary> {
        match self.get_mut(DeviceClass::Arbitrary)? {
            Device::Arbitrary(a) => Some(a),
            _ => None,
        }
    }

    /// The single class answering to `address`: the first match in priority order.
    pub fn addressed(&self, address: u8) -> DeviceMask {
        self.devices
            .iter()
            .find(|d| d.identity().address == address)
            .map_or(DeviceMask::empty(), |d| d.class().mask())
    }

    pub fn needs_service(&self) -> DeviceMask {
        self.devices
            .iter()
            .filter(|d| d.needs_service())
            .fold(DeviceMask::empty(), |m, d| m | d.class().mask())
    }

    pub fn identity(&self, class: DeviceClass) -> Option<Identity> {
        self.get(class).map(|d| d.identity())
    }

    pub fn identity_mut(&mut self, class: DeviceClass) -> Option<&mut Identity> {
        self.get_mut(class).map(|d| d.identity_mut())
    }

    pub fn flush(&mut self, target: DeviceMask) {
        for dev in self.selected_mut(target) {
            dev.flush();
        }
    }

    /// Talk reply of the first class in `target`; 0 when nobody is selected.
    pub fn talk(&mut self, target: DeviceMask, register: u8, out: &mut Payload) -> usize {
        self.selected_mut(target)
            .next()
            .map_or(0, |d| d.talk(register, out))
    }

    pub fn talk_drain(&mut self, target: DeviceMask, register: u8) {
        if let Some(dev) = self.selected_mut(target).next() {
            dev.talk_drain(register);
        }
    }

    pub fn listen(&mut self, target: DeviceMask, register: u8, value: u16) {
        if let Some(dev) = self.selected_mut(target).next() {
            dev.listen(register, value);
        }
    }

    pub fn accepts_handler(&self, class: DeviceClass, handler: u8) -> bool {
        self.get(class).is_some_and(|d| d.accepts_handler(handler))
    }

    /// Bus reset: every class back to its default identity with empty registers.
    pub fn reset(&mut self) {
        for dev in &mut self.devices {
            dev.reset();
        }
        debug!(devices = ?self.present(), "device registers reset");
    }

    fn selected_mut(&mut self, target: DeviceMask) -> impl Iterator<Item = &mut Device> {
        self.devices
            .iter_mut()
            .filter(move |d| target.contains(d.class().mask()))
    }
}
