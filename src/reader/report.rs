use std::fmt;

use thiserror::Error;

use crate::drivers::gamepad_plus::driver::DecodeError;

use super::ConnectionState;

/// Terminal reasons a connection cycle gave up
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    #[error("bluetooth connection failed")]
    BluetoothFailed,
    #[error("hid open failed after bluetooth")]
    HidAfterBluetooth,
    #[error("hid connection lost")]
    ConnectionLost,
    #[error("hid enumeration failed")]
    Enumeration,
}

/// Observable status produced while acquiring and reading the device
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Transition(ConnectionState),
    ProbingHid,
    DeviceOpened {
        manufacturer: Option<String>,
        product: Option<String>,
        path: String,
    },
    HidUnavailable(String),
    EnumerationFailed(String),
    Scanning(String),
    BluetoothDeviceFound {
        name: String,
        address: String,
    },
    BluetoothConnected,
    BluetoothFailed(String),
    BluetoothWoken,
    MalformedReport(DecodeError),
    MalformedReportsDiscarded(usize),
    ConnectionLost(String),
    Failed(FailureReason),
    Stopping,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Transition(state) => write!(f, "Connection state: {state:?}"),
            Report::ProbingHid => write!(f, "Looking for HID devices..."),
            Report::DeviceOpened {
                manufacturer,
                product,
                path,
            } => write!(
                f,
                "Successfully opened HID device {path} (manufacturer: {}, product: {})",
                manufacturer.as_deref().unwrap_or("unknown"),
                product.as_deref().unwrap_or("unknown")
            ),
            Report::HidUnavailable(reason) => {
                write!(f, "HID connection failed ({reason}), trying Bluetooth...")
            }
            Report::EnumerationFailed(reason) => write!(f, "HID enumeration failed: {reason}"),
            Report::Scanning(name) => write!(f, "Scanning for {name} via Bluetooth..."),
            Report::BluetoothDeviceFound { name, address } => {
                write!(f, "Found {name} ({address})")
            }
            Report::BluetoothConnected => write!(f, "Connected via Bluetooth"),
            Report::BluetoothFailed(reason) => write!(f, "Bluetooth connection error: {reason}"),
            Report::BluetoothWoken => {
                write!(f, "Bluetooth connection successful, trying HID again...")
            }
            Report::MalformedReport(err) => write!(f, "Discarding malformed report: {err}"),
            Report::MalformedReportsDiscarded(count) => {
                write!(f, "Discarded {count} malformed reports")
            }
            Report::ConnectionLost(reason) => write!(f, "Error reading data: {reason}"),
            Report::Failed(reason) => write!(f, "Connection failed: {reason}"),
            Report::Stopping => write!(f, "Stopping..."),
        }
    }
}

impl Report {
    /// Severity the report is logged at
    pub fn level(&self) -> log::Level {
        match self {
            Report::Transition(_) => log::Level::Debug,
            Report::HidUnavailable(_)
            | Report::BluetoothFailed(_)
            | Report::MalformedReport(_)
            | Report::MalformedReportsDiscarded(_) => log::Level::Warn,
            Report::EnumerationFailed(_) | Report::ConnectionLost(_) | Report::Failed(_) => {
                log::Level::Error
            }
            _ => log::Level::Info,
        }
    }
}

/// Sink for every user-visible status message of the reader
pub trait Reporter {
    fn report(&mut self, report: Report);
}

/// [Reporter] that forwards to the `log` facade
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, report: Report) {
        log::log!(report.level(), "{report}");
    }
}

/// Tracks a run of consecutive malformed reports so that only the first is
/// reported individually.
#[derive(Debug, Default)]
pub struct MalformedReports {
    run: usize,
}

impl MalformedReports {
    /// Count a malformed report. Returns true if it is the first of its run.
    pub fn record(&mut self) -> bool {
        self.run += 1;
        self.run == 1
    }

    /// End the current run. Returns the run length if more than one report
    /// was discarded.
    pub fn finish(&mut self) -> Option<usize> {
        let run = std::mem::take(&mut self.run);
        (run > 1).then_some(run)
    }
}
