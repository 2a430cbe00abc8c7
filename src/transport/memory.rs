//! # In-Memory GATT Backend
//!
//! A fake Bluetooth stack that records every characteristic write. Used for
//! dry runs and for exercising the transport without hardware. Faults can be
//! injected per device to drive each failure path of the state machine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::gatt::{Central, Device, DeviceFilter, GattCharacteristic, GattServer, GattService};
use crate::error::{GattError, LinkError};
use crate::printer::{PRINTER_SERVICE_UUID, PRINTER_WRITE_CHARACTERISTIC_UUID};

/// Discovery over a fixed list of devices.
#[derive(Debug, Clone, Default)]
pub struct MemoryCentral {
    devices: Vec<MemoryDevice>,
    cancel_chooser: bool,
    deny_permission: bool,
    no_adapter: bool,
}

impl MemoryCentral {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: MemoryDevice) -> Self {
        self.devices.push(device);
        self
    }

    /// The user dismisses the chooser on every service-filtered request.
    pub fn cancelling(mut self) -> Self {
        self.cancel_chooser = true;
        self
    }

    /// Every request fails with a permission error.
    pub fn denying(mut self) -> Self {
        self.deny_permission = true;
        self
    }

    /// The host has no usable adapter: every request fails as unavailable.
    pub fn unavailable() -> Self {
        Self {
            no_adapter: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Central for MemoryCentral {
    type Device = MemoryDevice;

    async fn request_device(&self, filter: &DeviceFilter) -> Result<MemoryDevice, LinkError> {
        if self.no_adapter {
            return Err(LinkError::Unavailable("no Bluetooth adapter found".to_string()));
        }
        if self.deny_permission {
            return Err(LinkError::PermissionDenied);
        }

        let found = self.devices.iter().find(|device| match filter {
            DeviceFilter::Service(uuid) => device.advertised.contains(uuid),
            DeviceFilter::Name(name) => device.name.as_deref() == Some(name.as_str()),
        });

        match (found, filter) {
            (Some(_), DeviceFilter::Service(_)) if self.cancel_chooser => Err(LinkError::Cancelled),
            (Some(device), _) => Ok(device.clone()),
            (None, _) => Err(LinkError::NotFound(filter.to_string())),
        }
    }
}

/// Injected failures.
#[derive(Debug, Clone, Default)]
struct Faults {
    refuse_connect: bool,
    stall_connect: bool,
    stall_write: bool,
    stall_disconnect: bool,
    /// 1-based index of the write attempt that fails.
    fail_write_at: Option<usize>,
}

/// What the device observed.
#[derive(Debug, Default)]
struct DeviceLog {
    connects: usize,
    disconnects: usize,
    write_attempts: usize,
    writes: Vec<Vec<u8>>,
}

/// A fake peripheral. Clones share the same log.
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    name: Option<String>,
    advertised: Vec<Uuid>,
    /// Service UUID → characteristic UUIDs.
    gatt: Vec<(Uuid, Vec<Uuid>)>,
    faults: Faults,
    log: Arc<Mutex<DeviceLog>>,
}

impl MemoryDevice {
    /// A working ESC/POS printer.
    pub fn printer(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            advertised: vec![PRINTER_SERVICE_UUID],
            gatt: vec![(PRINTER_SERVICE_UUID, vec![PRINTER_WRITE_CHARACTERISTIC_UUID])],
            faults: Faults::default(),
            log: Arc::default(),
        }
    }

    /// A device that is not a printer.
    pub fn unrelated(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            advertised: Vec::new(),
            gatt: Vec::new(),
            faults: Faults::default(),
            log: Arc::default(),
        }
    }

    /// Advertises the printer service but does not expose it once connected.
    pub fn without_service(mut self) -> Self {
        self.gatt.clear();
        self
    }

    /// Exposes the printer service without the write characteristic.
    pub fn without_characteristic(mut self) -> Self {
        for (_, characteristics) in &mut self.gatt {
            characteristics.clear();
        }
        self
    }

    pub fn refusing_connect(mut self) -> Self {
        self.faults.refuse_connect = true;
        self
    }

    /// `connect()` never completes.
    pub fn stalling_connect(mut self) -> Self {
        self.faults.stall_connect = true;
        self
    }

    /// The first write attempt never completes.
    pub fn stalling_write(mut self) -> Self {
        self.faults.stall_write = true;
        self
    }

    /// `disconnect()` never completes.
    pub fn stalling_disconnect(mut self) -> Self {
        self.faults.stall_disconnect = true;
        self
    }

    /// The `chunk`-th write attempt (1-based) fails.
    pub fn failing_write_at(mut self, chunk: usize) -> Self {
        self.faults.fail_write_at = Some(chunk);
        self
    }

    /// Successful writes, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.log().writes.clone()
    }

    /// Concatenation of all successful writes.
    pub fn written(&self) -> Vec<u8> {
        self.log().writes.concat()
    }

    /// Writes attempted, including a failed one.
    pub fn write_attempts(&self) -> usize {
        self.log().write_attempts
    }

    pub fn connects(&self) -> usize {
        self.log().connects
    }

    pub fn disconnects(&self) -> usize {
        self.log().disconnects
    }

    fn log(&self) -> MutexGuard<'_, DeviceLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Device for MemoryDevice {
    type Server = MemoryServer;

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    async fn connect(&self) -> Result<MemoryServer, GattError> {
        if self.faults.stall_connect {
            std::future::pending::<()>().await;
        }
        if self.faults.refuse_connect {
            return Err(GattError::Platform("connection refused".into()));
        }
        self.log().connects += 1;
        Ok(MemoryServer {
            device: self.clone(),
        })
    }
}

pub struct MemoryServer {
    device: MemoryDevice,
}

#[async_trait]
impl GattServer for MemoryServer {
    type Service = MemoryService;

    async fn primary_service(&self, uuid: Uuid) -> Result<MemoryService, GattError> {
        self.device
            .gatt
            .iter()
            .find(|(service, _)| *service == uuid)
            .map(|(_, characteristics)| MemoryService {
                device: self.device.clone(),
                characteristics: characteristics.clone(),
            })
            .ok_or(GattError::NotFound(uuid))
    }

    async fn disconnect(&self) -> Result<(), GattError> {
        if self.device.faults.stall_disconnect {
            std::future::pending::<()>().await;
        }
        self.device.log().disconnects += 1;
        Ok(())
    }
}

pub struct MemoryService {
    device: MemoryDevice,
    characteristics: Vec<Uuid>,
}

#[async_trait]
impl GattService for MemoryService {
    type Characteristic = MemoryCharacteristic;

    async fn characteristic(&self, uuid: Uuid) -> Result<MemoryCharacteristic, GattError> {
        if self.characteristics.contains(&uuid) {
            Ok(MemoryCharacteristic {
                device: self.device.clone(),
            })
        } else {
            Err(GattError::NotFound(uuid))
        }
    }
}

pub struct MemoryCharacteristic {
    device: MemoryDevice,
}

#[async_trait]
impl GattCharacteristic for MemoryCharacteristic {
    async fn write_value(&self, data: &[u8]) -> Result<(), GattError> {
        if self.device.faults.stall_write {
            self.device.log().write_attempts += 1;
            std::future::pending::<()>().await;
        }
        let mut log = self.device.log();
        log.write_attempts += 1;
        if self.device.faults.fail_write_at == Some(log.write_attempts) {
            return Err(GattError::Disconnected);
        }
        log.writes.push(data.to_vec());
        Ok(())
    }
}
