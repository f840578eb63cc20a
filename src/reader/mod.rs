pub mod report;
pub mod retry;

#[cfg(test)]
pub mod fakes;

use crate::{
    bluetooth::{self, BleError, BleTransport},
    config::ReaderConfig,
    drivers::gamepad_plus::{driver, event::GamepadState},
    hid::{self, HidBackend, HidSession, ReadError},
    sync::{Clock, StopSignal},
};

use report::{FailureReason, MalformedReports, Report, Reporter};
use retry::RetryPolicy;

/// Receives every decoded [GamepadState]. Calls must return promptly.
pub trait StateSink {
    fn present(&mut self, state: &GamepadState, raw: &[u8]);

    /// Called after a session has been closed
    fn disconnected(&mut self) {}
}

/// States of the connection acquisition state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    ProbingHid,
    BleWaking,
    RetryingHidAfterBle,
    /// Reading reports from an open session
    Connected,
    Failed(FailureReason),
    AwaitingUserRetry(FailureReason),
    Stopped,
}

/// Transport used by the most recent attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Hid,
    Bluetooth,
}

/// Working state of one retry cycle. Failure reasons travel with
/// [ConnectionState::Failed].
pub struct ConnectionAttemptState<S> {
    pub last_transport: Option<Transport>,
    pub ble_attempted: bool,
    pub session: Option<S>,
}

impl<S> Default for ConnectionAttemptState<S> {
    fn default() -> Self {
        Self {
            last_transport: None,
            ble_attempted: false,
            session: None,
        }
    }
}

/// How the reader finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A stop was requested
    Stopped,
    /// The retry policy declined to start another cycle
    Finished,
}

/// Result of a single enumerate and open pass
enum HidAttempt<S> {
    Opened(S),
    Unavailable(String),
    EnumerationFailed(String),
}

/// Why a read loop ended
enum SessionEnd {
    Stopped,
    Lost(ReadError),
}

/// Drives the connection state machine: HID first, a single Bluetooth wake
/// per cycle when HID is unavailable, and a retry decision after every
/// failure.
pub struct GamepadReader<H, B, C, R>
where
    H: HidBackend,
    B: BleTransport,
    C: Clock,
    R: RetryPolicy,
{
    config: ReaderConfig,
    hid: H,
    ble: B,
    clock: C,
    retry: R,
    sink: Box<dyn StateSink>,
    reporter: Box<dyn Reporter>,
    stop: StopSignal,
}

impl<H, B, C, R> GamepadReader<H, B, C, R>
where
    H: HidBackend,
    B: BleTransport,
    C: Clock,
    R: RetryPolicy,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: ReaderConfig,
        hid: H,
        ble: B,
        clock: C,
        retry: R,
        sink: Box<dyn StateSink>,
        reporter: Box<dyn Reporter>,
        stop: StopSignal,
    ) -> Self {
        Self {
            config,
            hid,
            ble,
            clock,
            retry,
            sink,
            reporter,
            stop,
        }
    }

    /// Run the state machine until a stop is requested or the retry policy
    /// declines. Every session and Bluetooth connection is released before
    /// this returns.
    pub async fn run(&mut self) -> Outcome {
        let mut attempt: ConnectionAttemptState<H::Session> = ConnectionAttemptState::default();
        let mut state = ConnectionState::ProbingHid;

        loop {
            if self.stop.is_stopped() && state != ConnectionState::Stopped {
                state = ConnectionState::Stopped;
            }
            self.reporter.report(Report::Transition(state));

            state = match state {
                ConnectionState::ProbingHid | ConnectionState::RetryingHidAfterBle => {
                    let after_ble = state == ConnectionState::RetryingHidAfterBle;
                    attempt.last_transport = Some(Transport::Hid);
                    match self.probe_hid() {
                        HidAttempt::Opened(session) => {
                            attempt.session = Some(session);
                            ConnectionState::Connected
                        }
                        HidAttempt::EnumerationFailed(reason) => {
                            self.reporter.report(Report::EnumerationFailed(reason));
                            ConnectionState::Failed(FailureReason::Enumeration)
                        }
                        HidAttempt::Unavailable(_) if after_ble || attempt.ble_attempted => {
                            ConnectionState::Failed(FailureReason::HidAfterBluetooth)
                        }
                        HidAttempt::Unavailable(reason) => {
                            self.reporter.report(Report::HidUnavailable(reason));
                            ConnectionState::BleWaking
                        }
                    }
                }
                ConnectionState::BleWaking => {
                    attempt.ble_attempted = true;
                    attempt.last_transport = Some(Transport::Bluetooth);
                    self.wake_bluetooth().await
                }
                ConnectionState::Connected => match attempt.session.take() {
                    Some(session) => match self.read_session(session).await {
                        SessionEnd::Stopped => ConnectionState::Stopped,
                        SessionEnd::Lost(err) => {
                            self.reporter.report(Report::ConnectionLost(err.to_string()));
                            ConnectionState::Failed(FailureReason::ConnectionLost)
                        }
                    },
                    None => ConnectionState::Failed(FailureReason::ConnectionLost),
                },
                ConnectionState::Failed(reason) => {
                    log::debug!(
                        "Cycle failed after {:?} (bluetooth attempted: {})",
                        attempt.last_transport,
                        attempt.ble_attempted
                    );
                    self.reporter.report(Report::Failed(reason));
                    ConnectionState::AwaitingUserRetry(reason)
                }
                ConnectionState::AwaitingUserRetry(reason) => {
                    let mut stop = self.stop.clone();
                    let retry = tokio::select! {
                        retry = self.retry.should_retry(reason) => retry,
                        _ = stop.stopped() => false,
                    };
                    if self.stop.is_stopped() {
                        ConnectionState::Stopped
                    } else if retry {
                        attempt = ConnectionAttemptState::default();
                        ConnectionState::ProbingHid
                    } else {
                        return Outcome::Finished;
                    }
                }
                ConnectionState::Stopped => {
                    self.reporter.report(Report::Stopping);
                    return Outcome::Stopped;
                }
            };
        }
    }

    /// Enumerate, find and open the configured device
    fn probe_hid(&mut self) -> HidAttempt<H::Session> {
        self.reporter.report(Report::ProbingHid);
        let devices = match self.hid.enumerate() {
            Ok(devices) => devices,
            Err(e) => return HidAttempt::EnumerationFailed(e.to_string()),
        };
        for device in devices.iter() {
            log::debug!("Found device: {device}");
        }

        let identity = &self.config.device;
        let Some(device) = hid::find_device(&devices, identity) else {
            return HidAttempt::Unavailable(format!("{identity} not found in HID list"));
        };

        match self.hid.open(device) {
            Ok(session) => {
                self.reporter.report(Report::DeviceOpened {
                    manufacturer: device.manufacturer.clone(),
                    product: device.product.clone(),
                    path: device.path_string(),
                });
                HidAttempt::Opened(session)
            }
            Err(e) => HidAttempt::Unavailable(e.to_string()),
        }
    }

    /// Perform the Bluetooth wake and wait for the host to register the
    /// HID device.
    async fn wake_bluetooth(&mut self) -> ConnectionState {
        let mut stop = self.stop.clone();
        let result = bluetooth::wake(
            &mut self.ble,
            &self.clock,
            &self.config,
            &mut stop,
            self.reporter.as_mut(),
        )
        .await;

        match result {
            Ok(()) => {
                self.reporter.report(Report::BluetoothWoken);
                tokio::select! {
                    _ = self.clock.sleep(self.config.hid_settle_delay()) => {
                        ConnectionState::RetryingHidAfterBle
                    }
                    _ = stop.stopped() => ConnectionState::Stopped,
                }
            }
            Err(BleError::Cancelled) => ConnectionState::Stopped,
            Err(e) => {
                self.reporter.report(Report::BluetoothFailed(e.to_string()));
                ConnectionState::Failed(FailureReason::BluetoothFailed)
            }
        }
    }

    /// Read and decode reports until the session faults or a stop is
    /// requested. The session is dropped before returning.
    async fn read_session(&mut self, mut session: H::Session) -> SessionEnd {
        let timeout = self.config.hid_read_timeout();
        let mut malformed = MalformedReports::default();

        let end = loop {
            if self.stop.is_stopped() {
                break SessionEnd::Stopped;
            }

            match session.read(timeout) {
                Ok(raw) => match driver::decode(raw.as_bytes()) {
                    Ok(state) => {
                        if let Some(count) = malformed.finish() {
                            self.reporter
                                .report(Report::MalformedReportsDiscarded(count));
                        }
                        self.sink.present(&state, raw.as_bytes());
                    }
                    Err(e) => {
                        if malformed.record() {
                            self.reporter.report(Report::MalformedReport(e));
                        }
                    }
                },
                Err(ReadError::Timeout) => (),
                Err(e) => break SessionEnd::Lost(e),
            }

            // Let the stop handler run between reads
            tokio::task::yield_now().await;
        };

        if let Some(count) = malformed.finish() {
            self.reporter
                .report(Report::MalformedReportsDiscarded(count));
        }
        drop(session);
        self.sink.disconnected();

        end
    }
}
