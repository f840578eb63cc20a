use std::time::Duration;

use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};

use super::{Advertisement, BleError, BleTransport};

/// [BleTransport] backed by the host Bluetooth stack. The adapter is looked
/// up on first use so hosts without Bluetooth can still read over HID.
#[derive(Default)]
pub struct BtleTransport {
    adapter: Option<Adapter>,
}

impl BtleTransport {
    pub fn new() -> Self {
        Self::default()
    }

    async fn adapter(&mut self) -> Result<Adapter, BleError> {
        if let Some(adapter) = self.adapter.as_ref() {
            return Ok(adapter.clone());
        }

        let manager = Manager::new()
            .await
            .map_err(|e| BleError::Scan(e.to_string()))?;
        let adapters = manager
            .adapters()
            .await
            .map_err(|e| BleError::Scan(e.to_string()))?;
        let adapter = adapters.into_iter().next().ok_or(BleError::NoAdapter)?;
        self.adapter = Some(adapter.clone());

        Ok(adapter)
    }
}

impl BleTransport for BtleTransport {
    type Peripheral = Peripheral;

    async fn scan(
        &mut self,
        window: Duration,
    ) -> Result<Vec<Advertisement<Self::Peripheral>>, BleError> {
        let adapter = self.adapter().await?;
        adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| BleError::Scan(e.to_string()))?;
        tokio::time::sleep(window).await;

        let peripherals = adapter.peripherals().await;
        if let Err(e) = adapter.stop_scan().await {
            log::warn!("Unable to stop bluetooth scan: {e}");
        }
        let peripherals = peripherals.map_err(|e| BleError::Scan(e.to_string()))?;

        let mut advertisements = Vec::with_capacity(peripherals.len());
        for peripheral in peripherals {
            let Ok(Some(props)) = peripheral.properties().await else {
                continue;
            };
            log::trace!("Advertisement: {:?} ({})", props.local_name, props.address);
            advertisements.push(Advertisement {
                name: props.local_name,
                address: props.address.to_string(),
                peripheral,
            });
        }

        Ok(advertisements)
    }

    async fn stop_scan(&mut self) -> Result<(), BleError> {
        let Some(adapter) = self.adapter.clone() else {
            return Ok(());
        };
        adapter
            .stop_scan()
            .await
            .map_err(|e| BleError::Scan(e.to_string()))
    }

    async fn connect(&mut self, peripheral: &Self::Peripheral) -> Result<(), BleError> {
        peripheral
            .connect()
            .await
            .map_err(|e| BleError::Connect(e.to_string()))
    }

    async fn disconnect(&mut self, peripheral: &Self::Peripheral) -> Result<(), BleError> {
        peripheral
            .disconnect()
            .await
            .map_err(|e| BleError::Connect(e.to_string()))
    }
}
