use bitflags::bitflags;

bitflags! {
    /// One bit per device class, used for service requests, talk targets and collision flags.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct DeviceMask: u8 {
        const KEYBOARD = 1 << 0;
        const MOUSE = 1 << 1;
        const ARBITRARY = 1 << 2;
    }
}

/// The device classes this firmware can emulate, in address-match priority order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceClass {
    Keyboard,
    Mouse,
    Arbitrary,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 3] = [
        DeviceClass::Keyboard,
        DeviceClass::Mouse,
        DeviceClass::Arbitrary,
    ];

    pub fn mask(self) -> DeviceMask {
        match self {
            DeviceClass::Keyboard => DeviceMask::KEYBOARD,
            DeviceClass::Mouse => DeviceMask::MOUSE,
            DeviceClass::Arbitrary => DeviceMask::ARBITRARY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceClass::Keyboard => "keyboard",
            DeviceClass::Mouse => "mouse",
            DeviceClass::Arbitrary => "arbitrary",
        }
    }
}

impl DeviceMask {
    /// First class (in priority order) present in the mask.
    pub fn first_class(self) -> Option<DeviceClass> {
        DeviceClass::ALL
            .into_iter()
            .find(|class| self.contains(class.mask()))
    }
}

impl From<DeviceClass> for DeviceMask {
    fn from(class: DeviceClass) -> Self {
        class.mask()
    }
}
