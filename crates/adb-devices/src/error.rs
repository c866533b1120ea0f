use thiserror::Error;

use crate::DeviceClass;

/// Rejected device configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{class:?} address {address} is outside 1..=15")]
    InvalidAddress { class: DeviceClass, address: u8 },

    #[error("{class:?} handler {handler:#04x} is reserved by the bus protocol")]
    ReservedHandler { class: DeviceClass, handler: u8 },

    #[error("{first:?} and {second:?} both default to address {address}")]
    AddressConflict {
        first: DeviceClass,
        second: DeviceClass,
        address: u8,
    },

    #[error("no device classes enabled")]
    NoDevices,
}
