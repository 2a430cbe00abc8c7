//! # Device Linker
//!
//! Discovers a compatible printer and hands back a [`DeviceHandle`].
//!
//! Linking is a scoped acquisition: the platform presents discovery, the
//! result is a handle or a [`LinkError`], and nothing is retried here. The
//! caller decides what to persist (see `PrintSession::link`).

use tracing::{info, warn};
use uuid::Uuid;

use super::gatt::{Central, Device, DeviceFilter};
use crate::error::LinkError;
use crate::printer::PRINTER_SERVICE_UUID;

/// A session-owned reference to a discovered printer.
///
/// Only the name outlives the session. The device itself may go stale at any
/// time (suspend, power cycle), so the transport reconnects through it at the
/// start of every print instead of trusting an old connection.
#[derive(Debug, Clone)]
pub struct DeviceHandle<D> {
    device: D,
    name: Option<String>,
}

impl<D: Device> DeviceHandle<D> {
    pub fn new(device: D) -> Self {
        let name = device.name();
        Self { device, name }
    }

    /// Advertised name captured at discovery time.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

/// Discovery front-end over a [`Central`].
pub struct DeviceLinker<C> {
    central: C,
    service: Uuid,
}

impl<C: Central> DeviceLinker<C> {
    /// Linker filtering on the ESC/POS printer service.
    pub fn new(central: C) -> Self {
        Self {
            central,
            service: PRINTER_SERVICE_UUID,
        }
    }

    /// Discover a printer by service and return its handle.
    pub async fn link(&self) -> Result<DeviceHandle<C::Device>, LinkError> {
        let filter = DeviceFilter::Service(self.service);
        self.discover(&filter).await
    }

    /// Re-find a previously linked printer by its advertised name.
    ///
    /// The name is a weak key: the device may be renamed or share its name
    /// with another printer. A miss is an ordinary [`LinkError`].
    pub async fn relink(&self, name: &str) -> Result<DeviceHandle<C::Device>, LinkError> {
        let filter = DeviceFilter::Name(name.to_string());
        self.discover(&filter).await
    }

    async fn discover(&self, filter: &DeviceFilter) -> Result<DeviceHandle<C::Device>, LinkError> {
        info!(%filter, "Discovering printer");
        match self.central.request_device(filter).await {
            Ok(device) => {
                let handle = DeviceHandle::new(device);
                info!(name = handle.name().unwrap_or("<unnamed>"), "Printer found");
                Ok(handle)
            }
            Err(e) => {
                warn!(%filter, error = %e, "Discovery failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::{MemoryCentral, MemoryDevice};

    #[tokio::test]
    async fn test_link_by_service() {
        let central = MemoryCentral::new()
            .with_device(MemoryDevice::unrelated("Headphones"))
            .with_device(MemoryDevice::printer("MPT-II"));
        let linker = DeviceLinker::new(central);

        let handle = linker.link().await.unwrap();
        assert_eq!(handle.name(), Some("MPT-II"));
    }

    #[tokio::test]
    async fn test_link_nothing_found() {
        let linker = DeviceLinker::new(MemoryCentral::new());
        let err = linker.link().await.unwrap_err();
        assert!(matches!(err, LinkError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_link_cancelled() {
        let central = MemoryCentral::new()
            .with_device(MemoryDevice::printer("MPT-II"))
            .cancelling();
        let err = DeviceLinker::new(central).link().await.unwrap_err();
        assert!(matches!(err, LinkError::Cancelled));
    }

    #[tokio::test]
    async fn test_relink_by_name() {
        let central = MemoryCentral::new()
            .with_device(MemoryDevice::printer("RPP02N"))
            .with_device(MemoryDevice::printer("MPT-II"));
        let linker = DeviceLinker::new(central);

        let handle = linker.relink("MPT-II").await.unwrap();
        assert_eq!(handle.name(), Some("MPT-II"));

        let err = linker.relink("Renamed").await.unwrap_err();
        assert!(matches!(err, LinkError::NotFound(_)));
    }
}
