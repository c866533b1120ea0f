use adb_devices::{ConfigError, DeviceConfig};
use adb_time::{Speed, TimingTable};

/// Startup configuration threaded into [`crate::BusEngine::new`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineConfig {
    pub timing: TimingTable,
    pub devices: DeviceConfig,
}

impl EngineConfig {
    pub fn for_speed(speed: Speed) -> Self {
        Self {
            timing: TimingTable::for_speed(speed),
            devices: DeviceConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.devices.validate()
    }
}
