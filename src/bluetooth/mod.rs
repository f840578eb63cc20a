pub mod btle;


use std::{future::Future, time::Duration};

use thiserror::Error;

use crate::{
    config::ReaderConfig,
    reader::report::{Report, Reporter},
    sync::{Clock, StopSignal},
};

const TIMED_OUT: &str = "timed out";

/// Possible errors on the Bluetooth path. None of them have a further
/// fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BleError {
    #[error("no bluetooth adapter found")]
    NoAdapter,
    #[error("bluetooth scan failed: {0}")]
    Scan(String),
    #[error("bluetooth connect failed: {0}")]
    Connect(String),
    #[error("no device advertising '{0}' found")]
    NotFound(String),
    #[error("bluetooth wake cancelled")]
    Cancelled,
}

/// How a bounded, interruptible step ended
enum Step<T> {
    Done(T),
    Cancelled,
    TimedOut,
}

/// A peripheral seen during a scan
#[derive(Debug, Clone)]
pub struct Advertisement<P> {
    pub name: Option<String>,
    pub address: String,
    pub peripheral: P,
}

/// Minimal Bluetooth LE operations needed to wake the controller
pub trait BleTransport {
    type Peripheral: Send + Sync;

    /// Listen for advertisements for the given window
    fn scan(
        &mut self,
        window: Duration,
    ) -> impl Future<Output = Result<Vec<Advertisement<Self::Peripheral>>, BleError>> + Send;

    /// Stop a scan that was abandoned before it completed
    fn stop_scan(&mut self) -> impl Future<Output = Result<(), BleError>> + Send;

    fn connect(
        &mut self,
        peripheral: &Self::Peripheral,
    ) -> impl Future<Output = Result<(), BleError>> + Send;

    fn disconnect(
        &mut self,
        peripheral: &Self::Peripheral,
    ) -> impl Future<Output = Result<(), BleError>> + Send;
}

/// Scan for the configured device, connect to it so the host registers the
/// pairing, hold the connection for the settle delay and release it again.
/// Every step is bounded by a timeout and interrupted by a stop. Once a
/// connect has been attempted the connection is always released.
pub async fn wake<T: BleTransport, C: Clock>(
    transport: &mut T,
    clock: &C,
    config: &ReaderConfig,
    stop: &mut StopSignal,
    reporter: &mut dyn Reporter,
) -> Result<(), BleError> {
    let identity = &config.device;
    reporter.report(Report::Scanning(identity.name.clone()));

    let scanned = tokio::select! {
        biased;
        _ = stop.stopped() => Step::Cancelled,
        result = transport.scan(config.ble_scan_timeout()) => Step::Done(result),
        _ = clock.sleep(config.ble_scan_deadline()) => Step::TimedOut,
    };
    let advertisements = match scanned {
        Step::Done(result) => result?,
        Step::Cancelled => {
            abandon_scan(transport, clock, config).await;
            return Err(BleError::Cancelled);
        }
        Step::TimedOut => {
            abandon_scan(transport, clock, config).await;
            return Err(BleError::Scan(TIMED_OUT.into()));
        }
    };
    log::debug!("Scan found {} peripheral(s)", advertisements.len());

    let Some(found) = advertisements.into_iter().find(|advertisement| {
        advertisement
            .name
            .as_deref()
            .is_some_and(|name| identity.matches_name(name))
    }) else {
        return Err(BleError::NotFound(identity.name.clone()));
    };
    reporter.report(Report::BluetoothDeviceFound {
        name: found.name.clone().unwrap_or_default(),
        address: found.address.clone(),
    });

    let connected = tokio::select! {
        biased;
        _ = stop.stopped() => Step::Cancelled,
        result = transport.connect(&found.peripheral) => Step::Done(result),
        _ = clock.sleep(config.ble_connect_timeout()) => Step::TimedOut,
    };
    let abandoned = match connected {
        Step::Done(result) => {
            result?;
            reporter.report(Report::BluetoothConnected);
            None
        }
        Step::Cancelled => Some(BleError::Cancelled),
        Step::TimedOut => Some(BleError::Connect(TIMED_OUT.into())),
    };
    if let Some(e) = abandoned {
        // The connect may have completed on the host side
        release(transport, clock, config, &found.peripheral).await;
        return Err(e);
    }

    tokio::select! {
        biased;
        _ = stop.stopped() => (),
        _ = clock.sleep(config.ble_settle_delay()) => (),
    };
    release(transport, clock, config, &found.peripheral).await;

    if stop.is_stopped() {
        return Err(BleError::Cancelled);
    }
    Ok(())
}

/// Disconnect, waiting at most the connect timeout. Failures are only logged.
async fn release<T: BleTransport, C: Clock>(
    transport: &mut T,
    clock: &C,
    config: &ReaderConfig,
    peripheral: &T::Peripheral,
) {
    tokio::select! {
        biased;
        result = transport.disconnect(peripheral) => {
            if let Err(e) = result {
                log::warn!("Unable to disconnect bluetooth device: {e}");
            }
        }
        _ = clock.sleep(config.ble_connect_timeout()) => {
            log::warn!("Timed out disconnecting bluetooth device");
        }
    }
}

/// Stop an unfinished scan, waiting at most the connect timeout
async fn abandon_scan<T: BleTransport, C: Clock>(
    transport: &mut T,
    clock: &C,
    config: &ReaderConfig,
) {
    tokio::select! {
        biased;
        result = transport.stop_scan() => {
            if let Err(e) = result {
                log::warn!("Unable to stop bluetooth scan: {e}");
            }
        }
        _ = clock.sleep(config.ble_connect_timeout()) => {
            log::warn!("Timed out stopping bluetooth scan");
        }
    }
}
