use std::{fmt, io, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::drivers::gamepad_plus::driver;


/// Represents all possible errors loading a [ReaderConfig]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Identifies the one physical controller this reader talks to
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct DeviceIdentity {
    /// Substring of the advertised Bluetooth name, matched case-insensitively
    pub name: String,
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIdentity {
    /// Returns true if the given hardware ID's belong to this device
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    /// Returns true if the given advertised name contains this device's name
    pub fn matches_name(&self, advertised: &str) -> bool {
        advertised
            .to_lowercase()
            .contains(&self.name.to_lowercase())
    }
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            name: driver::BLE_NAME.to_string(),
            vendor_id: driver::VID,
            product_id: driver::PID,
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:04x}:{:04x})",
            self.name, self.vendor_id, self.product_id
        )
    }
}

/// Timeouts and device identity for a reader session. Missing keys in a
/// configuration file fall back to the defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct ReaderConfig {
    pub device: DeviceIdentity,
    /// Bounded wait for a single HID read
    pub hid_read_timeout_ms: u64,
    /// How long to listen for Bluetooth advertisements
    pub ble_scan_timeout_ms: u64,
    /// Upper bound for a single Bluetooth connect or disconnect
    pub ble_connect_timeout_ms: u64,
    /// How long to hold the transient Bluetooth connection open
    pub ble_settle_delay_ms: u64,
    /// Wait after a Bluetooth wake before probing HID again
    pub hid_settle_delay_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            device: DeviceIdentity::default(),
            hid_read_timeout_ms: 100,
            ble_scan_timeout_ms: 5000,
            ble_connect_timeout_ms: 10000,
            ble_settle_delay_ms: 2000,
            hid_settle_delay_ms: 2000,
        }
    }
}

impl ReaderConfig {
    /// Load a [ReaderConfig] from the given YAML string
    pub fn from_yaml(content: &str) -> Result<ReaderConfig, LoadError> {
        let config: ReaderConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load a [ReaderConfig] from the given YAML file
    pub fn from_yaml_path(path: &Path) -> Result<ReaderConfig, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn hid_read_timeout(&self) -> Duration {
        Duration::from_millis(self.hid_read_timeout_ms)
    }

    pub fn ble_scan_timeout(&self) -> Duration {
        Duration::from_millis(self.ble_scan_timeout_ms)
    }

    pub fn ble_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.ble_connect_timeout_ms)
    }

    /// Upper bound for a whole scan, including adapter setup
    pub fn ble_scan_deadline(&self) -> Duration {
        self.ble_scan_timeout() + self.ble_connect_timeout()
    }

    pub fn ble_settle_delay(&self) -> Duration {
        Duration::from_millis(self.ble_settle_delay_ms)
    }

    pub fn hid_settle_delay(&self) -> Duration {
        Duration::from_millis(self.hid_settle_delay_ms)
    }
}
