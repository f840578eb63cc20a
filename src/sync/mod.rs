use std::{future::Future, sync::Arc, time::Duration};

use tokio::sync::watch;


/// Source of delays for the connection state machine
pub trait Clock {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// [Clock] backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Creates a linked [StopHandle] and [StopSignal] pair.
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx: Arc::new(tx) }, StopSignal { rx })
}

/// Requests a cooperative stop of everything holding the matching [StopSignal]
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes stop requests between blocking calls, or while awaiting one.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Returns true once a stop has been requested
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when a stop is requested. If every [StopHandle] is dropped
    /// without stopping, this never resolves.
    pub async fn stopped(&mut self) {
        if self.rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
