//! # GATT Abstraction
//!
//! The seam between the print pipeline and a Bluetooth stack. It mirrors the
//! shape of a platform discovery API:
//!
//! ```text
//! Central ──request_device(filter)──► Device { name, connect() }
//!                                        │
//!                                        ▼
//!                                    GattServer ──primary_service(uuid)──► GattService
//!                                                                            │
//!                                           characteristic(uuid) ◄───────────┘
//!                                                  │
//!                                                  ▼
//!                                      GattCharacteristic::write_value(bytes)
//! ```
//!
//! Backends: [`super::btle`] (btleplug, real hardware) and
//! [`super::memory`] (in-process, records writes).

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{GattError, LinkError};

/// What discovery should look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFilter {
    /// Any device advertising this GATT service. Used for first-time linking.
    Service(Uuid),
    /// A device with exactly this advertised name. Used to re-find a
    /// previously linked printer without asking the user again.
    Name(String),
}

impl fmt::Display for DeviceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceFilter::Service(uuid) => write!(f, "service {}", uuid),
            DeviceFilter::Name(name) => write!(f, "name \"{}\"", name),
        }
    }
}

/// Device discovery.
#[async_trait]
pub trait Central: Send + Sync {
    type Device: Device;

    /// Run discovery and return the chosen device. Does not retry.
    async fn request_device(&self, filter: &DeviceFilter) -> Result<Self::Device, LinkError>;
}

/// A discovered peripheral.
#[async_trait]
pub trait Device: Send + Sync {
    type Server: GattServer;

    /// Advertised local name, if the device sent one.
    fn name(&self) -> Option<String>;

    /// Open (or reuse) the GATT connection.
    async fn connect(&self) -> Result<Self::Server, GattError>;
}

/// A connected GATT server.
#[async_trait]
pub trait GattServer: Send + Sync {
    type Service: GattService;

    async fn primary_service(&self, uuid: Uuid) -> Result<Self::Service, GattError>;

    async fn disconnect(&self) -> Result<(), GattError>;
}

#[async_trait]
pub trait GattService: Send + Sync {
    type Characteristic: GattCharacteristic;

    async fn characteristic(&self, uuid: Uuid) -> Result<Self::Characteristic, GattError>;
}

#[async_trait]
pub trait GattCharacteristic: Send + Sync {
    /// Write one value and wait until the stack reports completion.
    async fn write_value(&self, data: &[u8]) -> Result<(), GattError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_display() {
        assert_eq!(
            DeviceFilter::Service(crate::printer::PRINTER_SERVICE_UUID).to_string(),
            "service 000018f0-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            DeviceFilter::Name("MPT-II".into()).to_string(),
            "name \"MPT-II\""
        );
    }
}
