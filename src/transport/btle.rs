//! # btleplug Backend
//!
//! Real Bluetooth Low-Energy access through the host stack (BlueZ on Linux,
//! CoreBluetooth on macOS, WinRT on Windows).
//!
//! ## Discovery
//!
//! A scan runs for `scan_window`, polling the adapter's peripheral list.
//! Name lookups stop at the first match. Service lookups run the whole
//! window and then hand every candidate to a [`DeviceChooser`], which plays
//! the part of a platform device picker: returning `None` means the user
//! cancelled.
//!
//! ## Adapter
//!
//! The host adapter is opened on the first discovery request, not when the
//! central is built. A missing or powered-off adapter is therefore reported
//! as [`LinkError::Unavailable`] by that request, like any other discovery
//! failure.
//!
//! ## Setup (Linux)
//!
//! ```bash
//! # The adapter must be powered; no pairing is needed for BLE printers.
//! $ bluetoothctl power on
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{
    CharPropFlags, Central as _, Characteristic, Manager as _, Peripheral as _, ScanFilter,
    Service, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use super::gatt::{Central, Device, DeviceFilter, GattCharacteristic, GattServer, GattService};
use crate::error::{GattError, LinkError};

/// Default discovery window.
pub const DEFAULT_SCAN_WINDOW: Duration = Duration::from_secs(5);

/// Pause between polls of the adapter's peripheral list.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Picks one device out of several discovery candidates.
pub trait DeviceChooser: Send + Sync {
    /// `labels` are device names (or addresses for unnamed devices).
    /// `None` cancels the request.
    fn choose(&self, labels: &[String]) -> Option<usize>;
}

/// Takes the first candidate without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl DeviceChooser for FirstMatch {
    fn choose(&self, labels: &[String]) -> Option<usize> {
        if labels.is_empty() { None } else { Some(0) }
    }
}

impl<F> DeviceChooser for F
where
    F: Fn(&[String]) -> Option<usize> + Send + Sync,
{
    fn choose(&self, labels: &[String]) -> Option<usize> {
        self(labels)
    }
}

/// Discovery over the host's first btleplug adapter.
#[derive(Clone)]
pub struct BtleCentral {
    adapter: Arc<OnceCell<Adapter>>,
    scan_window: Duration,
    chooser: Arc<dyn DeviceChooser>,
}

impl BtleCentral {
    /// Central for the host's first adapter, opened on first use.
    pub fn system() -> Self {
        Self {
            adapter: Arc::new(OnceCell::new()),
            scan_window: DEFAULT_SCAN_WINDOW,
            chooser: Arc::new(FirstMatch),
        }
    }

    pub fn with_scan_window(mut self, window: Duration) -> Self {
        self.scan_window = window;
        self
    }

    pub fn with_chooser(mut self, chooser: impl DeviceChooser + 'static) -> Self {
        self.chooser = Arc::new(chooser);
        self
    }

    async fn adapter(&self) -> Result<&Adapter, LinkError> {
        self.adapter.get_or_try_init(first_adapter).await
    }

    async fn scan(&self, filter: &DeviceFilter) -> Result<Vec<BtleDevice>, LinkError> {
        let adapter = self.adapter().await?;
        let scan_filter = match filter {
            DeviceFilter::Service(uuid) => ScanFilter {
                services: vec![*uuid],
            },
            DeviceFilter::Name(_) => ScanFilter::default(),
        };
        adapter
            .start_scan(scan_filter)
            .await
            .map_err(link_error)?;

        let deadline = Instant::now() + self.scan_window;
        let found = loop {
            let found = matching(adapter, filter).await?;
            let done = matches!(filter, DeviceFilter::Name(_)) && !found.is_empty();
            if done || Instant::now() >= deadline {
                break found;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        };

        if let Err(e) = adapter.stop_scan().await {
            warn!(error = %e, "Failed to stop scan");
        }
        Ok(found)
    }

}

async fn first_adapter() -> Result<Adapter, LinkError> {
    let manager = Manager::new().await.map_err(link_error)?;
    manager
        .adapters()
        .await
        .map_err(link_error)?
        .into_iter()
        .next()
        .ok_or_else(|| LinkError::Unavailable("no Bluetooth adapter found".to_string()))
}

async fn matching(adapter: &Adapter, filter: &DeviceFilter) -> Result<Vec<BtleDevice>, LinkError> {
    let mut matches = Vec::new();
    for peripheral in adapter.peripherals().await.map_err(link_error)? {
        // Peripherals that vanish mid-scan have no properties; skip them.
        let Ok(Some(properties)) = peripheral.properties().await else {
            continue;
        };
        let is_match = match filter {
            DeviceFilter::Service(uuid) => properties.services.contains(uuid),
            DeviceFilter::Name(name) => properties.local_name.as_deref() == Some(name.as_str()),
        };
        if is_match {
            matches.push(BtleDevice {
                peripheral,
                name: properties.local_name,
            });
        }
    }
    Ok(matches)
}

#[async_trait]
impl Central for BtleCentral {
    type Device = BtleDevice;

    async fn request_device(&self, filter: &DeviceFilter) -> Result<BtleDevice, LinkError> {
        let mut candidates = self.scan(filter).await?;
        debug!(%filter, count = candidates.len(), "Scan finished");
        if candidates.is_empty() {
            return Err(LinkError::NotFound(filter.to_string()));
        }

        let index = match filter {
            DeviceFilter::Name(name) => {
                if candidates.len() > 1 {
                    warn!(name = %name, count = candidates.len(), "Several printers share this name, using the first");
                }
                0
            }
            DeviceFilter::Service(_) => {
                let labels: Vec<String> = candidates.iter().map(BtleDevice::label).collect();
                self.chooser.choose(&labels).ok_or(LinkError::Cancelled)?
            }
        };

        if index >= candidates.len() {
            return Err(LinkError::Cancelled);
        }
        Ok(candidates.swap_remove(index))
    }
}

/// A discovered btleplug peripheral.
#[derive(Debug, Clone)]
pub struct BtleDevice {
    peripheral: Peripheral,
    name: Option<String>,
}

impl BtleDevice {
    /// Name if advertised, otherwise the Bluetooth address.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.peripheral.address().to_string())
    }
}

#[async_trait]
impl Device for BtleDevice {
    type Server = BtleServer;

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    async fn connect(&self) -> Result<BtleServer, GattError> {
        if !self.peripheral.is_connected().await.map_err(gatt_error)? {
            self.peripheral.connect().await.map_err(gatt_error)?;
        }
        self.peripheral
            .discover_services()
            .await
            .map_err(gatt_error)?;
        Ok(BtleServer {
            peripheral: self.peripheral.clone(),
        })
    }
}

pub struct BtleServer {
    peripheral: Peripheral,
}

#[async_trait]
impl GattServer for BtleServer {
    type Service = BtleService;

    async fn primary_service(&self, uuid: Uuid) -> Result<BtleService, GattError> {
        self.peripheral
            .services()
            .into_iter()
            .find(|service| service.uuid == uuid)
            .map(|service| BtleService {
                peripheral: self.peripheral.clone(),
                service,
            })
            .ok_or(GattError::NotFound(uuid))
    }

    async fn disconnect(&self) -> Result<(), GattError> {
        self.peripheral.disconnect().await.map_err(gatt_error)
    }
}

pub struct BtleService {
    peripheral: Peripheral,
    service: Service,
}

#[async_trait]
impl GattService for BtleService {
    type Characteristic = BtleCharacteristic;

    async fn characteristic(&self, uuid: Uuid) -> Result<BtleCharacteristic, GattError> {
        self.service
            .characteristics
            .iter()
            .find(|characteristic| characteristic.uuid == uuid)
            .cloned()
            .map(|characteristic| BtleCharacteristic {
                peripheral: self.peripheral.clone(),
                characteristic,
            })
            .ok_or(GattError::NotFound(uuid))
    }
}

pub struct BtleCharacteristic {
    peripheral: Peripheral,
    characteristic: Characteristic,
}

#[async_trait]
impl GattCharacteristic for BtleCharacteristic {
    async fn write_value(&self, data: &[u8]) -> Result<(), GattError> {
        // Prefer acknowledged writes so completion means the printer has it.
        let write_type = if self.characteristic.properties.contains(CharPropFlags::WRITE) {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };
        self.peripheral
            .write(&self.characteristic, data, write_type)
            .await
            .map_err(gatt_error)
    }
}

fn link_error(e: btleplug::Error) -> LinkError {
    match e {
        btleplug::Error::PermissionDenied => LinkError::PermissionDenied,
        other => LinkError::Unavailable(other.to_string()),
    }
}

fn gatt_error(e: btleplug::Error) -> GattError {
    match e {
        btleplug::Error::NotConnected => GattError::Disconnected,
        other => GattError::Platform(other.to_string()),
    }
}
