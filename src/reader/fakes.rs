//! In-memory collaborators for exercising the reader without hardware.

use std::{
    collections::VecDeque,
    ffi::CString,
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{
    bluetooth::{Advertisement, BleError, BleTransport},
    drivers::gamepad_plus::event::GamepadState,
    hid::{
        EnumeratedDevice, EnumerationError, HidBackend, HidSession, OpenError, RawReport,
        ReadError,
    },
    sync::{Clock, StopHandle},
};

use super::{
    report::{FailureReason, Report, Reporter},
    retry::RetryPolicy,
    StateSink,
};

/// Open/close bookkeeping shared between a fake and the test
#[derive(Debug, Default)]
pub struct Counters {
    pub enumerations: usize,
    pub opens: usize,
    pub closes: usize,
    pub scans: usize,
    pub connects: usize,
    pub disconnects: usize,
    pub scan_stops: usize,
}

pub type SharedCounters = Arc<Mutex<Counters>>;

/// One scripted result of [FakeSession::read]
#[derive(Debug, Clone)]
pub enum FakeRead {
    Report(Vec<u8>),
    Timeout,
    Fault,
    /// Request a stop and report a timeout
    Stop(StopHandle),
}

/// One scripted enumeration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeEnumeration {
    Present,
    /// Present but cannot be opened
    Busy,
    Absent,
    HostError,
}

pub fn gamepad_device() -> EnumeratedDevice {
    EnumeratedDevice {
        vendor_id: 0x1949,
        product_id: 0x0402,
        manufacturer: Some("GamePadPlus".to_string()),
        product: Some("GamePadPlus V3".to_string()),
        path: CString::new("/dev/hidraw7").unwrap(),
    }
}

fn other_device() -> EnumeratedDevice {
    EnumeratedDevice {
        vendor_id: 0x046d,
        product_id: 0xc52b,
        manufacturer: Some("Logitech".to_string()),
        product: Some("Receiver".to_string()),
        path: CString::new("/dev/hidraw0").unwrap(),
    }
}

/// Scripted [HidBackend]. Each enumeration consumes one entry of the
/// script, the last entry repeats. Each opened session consumes one read
/// script.
pub struct FakeHid {
    pub enumerations: VecDeque<FakeEnumeration>,
    pub sessions: VecDeque<Vec<FakeRead>>,
    pub counters: SharedCounters,
    last: FakeEnumeration,
    current: FakeEnumeration,
}

impl FakeHid {
    pub fn new(enumerations: &[FakeEnumeration], counters: SharedCounters) -> Self {
        Self {
            enumerations: enumerations.iter().copied().collect(),
            sessions: VecDeque::new(),
            counters,
            last: FakeEnumeration::Absent,
            current: FakeEnumeration::Absent,
        }
    }

    pub fn with_session(mut self, reads: Vec<FakeRead>) -> Self {
        self.sessions.push_back(reads);
        self
    }
}

impl HidBackend for FakeHid {
    type Session = FakeSession;

    fn enumerate(&mut self) -> Result<Vec<EnumeratedDevice>, EnumerationError> {
        self.counters.lock().unwrap().enumerations += 1;
        if let Some(next) = self.enumerations.pop_front() {
            self.last = next;
        }
        self.current = self.last;
        match self.current {
            FakeEnumeration::Present | FakeEnumeration::Busy => {
                Ok(vec![other_device(), gamepad_device()])
            }
            FakeEnumeration::Absent => Ok(vec![other_device()]),
            FakeEnumeration::HostError => Err(EnumerationError("hid subsystem gone".into())),
        }
    }

    fn open(&mut self, device: &EnumeratedDevice) -> Result<Self::Session, OpenError> {
        if self.current == FakeEnumeration::Busy {
            return Err(OpenError {
                path: device.path_string(),
                reason: "device busy".into(),
            });
        }
        let mut counters = self.counters.lock().unwrap();
        counters.opens += 1;
        assert_eq!(
            counters.opens,
            counters.closes + 1,
            "only one session may be open at a time"
        );

        Ok(FakeSession {
            reads: self.sessions.pop_front().unwrap_or_default().into(),
            counters: self.counters.clone(),
        })
    }
}

/// Session replaying a read script. A fault is returned once the script
/// runs out.
pub struct FakeSession {
    reads: VecDeque<FakeRead>,
    counters: SharedCounters,
}

impl HidSession for FakeSession {
    fn read(&mut self, _timeout: Duration) -> Result<RawReport, ReadError> {
        match self.reads.pop_front() {
            Some(FakeRead::Report(bytes)) => Ok(RawReport::from_slice(&bytes)),
            Some(FakeRead::Timeout) => Err(ReadError::Timeout),
            Some(FakeRead::Stop(handle)) => {
                handle.stop();
                Err(ReadError::Timeout)
            }
            Some(FakeRead::Fault) | None => Err(ReadError::Transport("device unplugged".into())),
        }
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.counters.lock().unwrap().closes += 1;
    }
}

/// Scripted [BleTransport]. Every scan returns the same advertisements.
pub struct FakeBle {
    pub advertised: Vec<Option<String>>,
    pub connect_fails: bool,
    pub scan_fails: bool,
    /// Connect establishes the link but never returns
    pub connect_stalls: bool,
    pub scan_stalls: bool,
    pub counters: SharedCounters,
    connected: bool,
}

impl FakeBle {
    pub fn new(advertised: &[Option<&str>], counters: SharedCounters) -> Self {
        Self {
            advertised: advertised
                .iter()
                .map(|name| name.map(str::to_string))
                .collect(),
            connect_fails: false,
            scan_fails: false,
            connect_stalls: false,
            scan_stalls: false,
            counters,
            connected: false,
        }
    }
}

impl BleTransport for FakeBle {
    type Peripheral = usize;

    async fn scan(
        &mut self,
        _window: Duration,
    ) -> Result<Vec<Advertisement<Self::Peripheral>>, BleError> {
        self.counters.lock().unwrap().scans += 1;
        if self.scan_fails {
            return Err(BleError::Scan("adapter powered off".into()));
        }
        if self.scan_stalls {
            std::future::pending::<()>().await;
        }
        let advertisements = self
            .advertised
            .iter()
            .enumerate()
            .map(|(i, name)| Advertisement {
                name: name.clone(),
                address: format!("AA:BB:CC:DD:EE:{i:02X}"),
                peripheral: i,
            })
            .collect();
        Ok(advertisements)
    }

    async fn connect(&mut self, _peripheral: &Self::Peripheral) -> Result<(), BleError> {
        if self.connect_fails {
            return Err(BleError::Connect("le-connection-abort-by-local".into()));
        }
        self.counters.lock().unwrap().connects += 1;
        self.connected = true;
        if self.connect_stalls {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn stop_scan(&mut self) -> Result<(), BleError> {
        self.counters.lock().unwrap().scan_stops += 1;
        Ok(())
    }

    async fn disconnect(&mut self, _peripheral: &Self::Peripheral) -> Result<(), BleError> {
        if self.connected {
            self.counters.lock().unwrap().disconnects += 1;
            self.connected = false;
        }
        Ok(())
    }
}

/// [Clock] that records requested delays and returns immediately
#[derive(Debug, Default, Clone)]
pub struct FakeClock {
    pub sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// [RetryPolicy] answering from a script, "no" once it runs out
#[derive(Debug, Default, Clone)]
pub struct ScriptedRetry {
    pub answers: Arc<Mutex<VecDeque<bool>>>,
    pub asked: Arc<Mutex<Vec<FailureReason>>>,
}

impl ScriptedRetry {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.iter().copied().collect())),
            asked: Default::default(),
        }
    }
}

impl RetryPolicy for ScriptedRetry {
    async fn should_retry(&mut self, reason: FailureReason) -> bool {
        self.asked.lock().unwrap().push(reason);
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }
}

/// [Reporter] keeping every report
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    pub reports: Arc<Mutex<Vec<Report>>>,
}

impl Reporter for RecordingReporter {
    fn report(&mut self, report: Report) {
        self.reports.lock().unwrap().push(report);
    }
}

/// [StateSink] keeping every presented state
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub states: Arc<Mutex<Vec<GamepadState>>>,
    pub disconnects: Arc<Mutex<usize>>,
}

impl StateSink for RecordingSink {
    fn present(&mut self, state: &GamepadState, _raw: &[u8]) {
        self.states.lock().unwrap().push(state.clone());
    }

    fn disconnected(&mut self) {
        *self.disconnects.lock().unwrap() += 1;
    }
}
