use std::time::Duration;

use hidapi::{DeviceInfo, HidApi, HidDevice, HidError};

use crate::drivers::gamepad_plus::driver::PACKET_SIZE;

use super::{
    EnumeratedDevice, EnumerationError, HidBackend, HidSession, OpenError, RawReport, ReadError,
};

/// [HidBackend] using the host's hidraw interface through hidapi
pub struct HidApiBackend {
    api: HidApi,
}

impl HidApiBackend {
    /// Initialize the host HID subsystem
    pub fn new() -> Result<Self, HidError> {
        let api = HidApi::new()?;
        Ok(Self { api })
    }
}

impl HidBackend for HidApiBackend {
    type Session = HidRawSession;

    fn enumerate(&mut self) -> Result<Vec<EnumeratedDevice>, EnumerationError> {
        self.api
            .refresh_devices()
            .map_err(|e| EnumerationError(e.to_string()))?;
        let devices = self.api.device_list().map(EnumeratedDevice::from).collect();
        Ok(devices)
    }

    fn open(&mut self, device: &EnumeratedDevice) -> Result<Self::Session, OpenError> {
        let path = device.path_string();
        let handle = self.api.open_path(&device.path).map_err(|e| OpenError {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        log::debug!("Opened hidraw device {path}");

        Ok(HidRawSession {
            device: handle,
            path,
        })
    }
}

impl From<&DeviceInfo> for EnumeratedDevice {
    fn from(info: &DeviceInfo) -> Self {
        Self {
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            manufacturer: info.manufacturer_string().map(str::to_string),
            product: info.product_string().map(str::to_string),
            path: info.path().to_owned(),
        }
    }
}

/// Open hidraw device. The handle is closed when this is dropped.
pub struct HidRawSession {
    device: HidDevice,
    path: String,
}

impl HidSession for HidRawSession {
    fn read(&mut self, timeout: Duration) -> Result<RawReport, ReadError> {
        let mut buf = [0; PACKET_SIZE];
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);

        // hidapi blocks the calling thread for up to the timeout
        let bytes_read =
            tokio::task::block_in_place(|| self.device.read_timeout(&mut buf[..], timeout_ms))
                .map_err(|e| ReadError::Transport(e.to_string()))?;
        if bytes_read == 0 {
            return Err(ReadError::Timeout);
        }

        Ok(RawReport::new(buf, bytes_read))
    }
}

impl Drop for HidRawSession {
    fn drop(&mut self) {
        log::debug!("Closing hidraw device {}", self.path);
    }
}
