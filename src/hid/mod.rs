pub mod hidraw;


use std::{ffi::CString, fmt, time::Duration};

use thiserror::Error;

use crate::{config::DeviceIdentity, drivers::gamepad_plus::driver::PACKET_SIZE};

/// Host-level failure to list HID devices
#[derive(Debug, Error)]
#[error("unable to list hid devices: {0}")]
pub struct EnumerationError(pub String);

/// The device was found but the host refused access to it (busy,
/// permission denied or the device vanished).
#[derive(Debug, Error)]
#[error("unable to open hid device '{path}': {reason}")]
pub struct OpenError {
    pub path: String,
    pub reason: String,
}

/// Possible outcomes of a failed read
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// No report arrived within the timeout
    #[error("timed out waiting for report")]
    Timeout,
    /// The session is unusable and must be closed
    #[error("transport fault: {0}")]
    Transport(String),
}

/// A HID device seen during one enumeration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedDevice {
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub path: CString,
}

impl EnumeratedDevice {
    /// Returns the device path (e.g. /dev/hidraw0) as a string
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

impl fmt::Display for EnumeratedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} '{}' '{}' at {}",
            self.vendor_id,
            self.product_id,
            self.manufacturer.as_deref().unwrap_or_default(),
            self.product.as_deref().unwrap_or_default(),
            self.path_string()
        )
    }
}

/// One report read from an open session. Short reads keep their length.
#[derive(Clone, Copy)]
pub struct RawReport {
    data: [u8; PACKET_SIZE],
    len: usize,
}

impl RawReport {
    pub fn new(data: [u8; PACKET_SIZE], len: usize) -> Self {
        Self {
            data,
            len: len.min(PACKET_SIZE),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        let len = bytes.len().min(PACKET_SIZE);
        let mut data = [0; PACKET_SIZE];
        data[..len].copy_from_slice(&bytes[..len]);
        Self { data, len }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl fmt::Debug for RawReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawReport").field(&self.as_bytes()).finish()
    }
}

/// Access to the host's HID subsystem
pub trait HidBackend {
    type Session: HidSession;

    /// Query every currently visible HID device. Results are never cached.
    fn enumerate(&mut self) -> Result<Vec<EnumeratedDevice>, EnumerationError>;

    /// Acquire exclusive access to the given device. The returned session
    /// releases the device when dropped.
    fn open(&mut self, device: &EnumeratedDevice) -> Result<Self::Session, OpenError>;
}

/// An open channel to a physical device
pub trait HidSession {
    /// Perform one read, waiting at most `timeout` for a report
    fn read(&mut self, timeout: Duration) -> Result<RawReport, ReadError>;
}

/// Returns the first device matching the identity's hardware ID's
pub fn find_device<'a>(
    devices: &'a [EnumeratedDevice],
    identity: &DeviceIdentity,
) -> Option<&'a EnumeratedDevice> {
    devices
        .iter()
        .find(|device| identity.matches(device.vendor_id, device.product_id))
}
