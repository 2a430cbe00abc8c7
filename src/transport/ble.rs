//! # BLE Print Transport
//!
//! Delivers an encoded receipt to a linked printer in fixed-size writes.
//!
//! ## State Machine
//!
//! ```text
//! Idle → Connecting → ServiceResolving → CharacteristicResolving → Writing → Done
//!            │               │                     │                  │
//!            └───────────────┴──────────┬──────────┴──────────────────┘
//!                                       ▼
//!                                     Failed
//! ```
//!
//! ## Chunked Writes
//!
//! The payload is split into `chunk_size` pieces (20 bytes by default, below
//! the default ATT MTU) and written strictly one after another: each write
//! is awaited before the next is issued, because concurrent writes to one
//! characteristic are not safe. A failed write ends the stream; nothing after
//! it is attempted and there is no automatic retry.
//!
//! ## Timeouts
//!
//! Connect, service and characteristic resolution, every chunk write and
//! the closing disconnect each run under `stage_timeout`. Without it a hung
//! link would only be resolved by the platform's own supervision timeout.
//! A disconnect that fails or times out is logged and does not change the
//! outcome of the send.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::gatt::{Central, Device, GattCharacteristic, GattServer, GattService};
use super::link::{DeviceHandle, DeviceLinker};
use crate::error::{GattError, TransportError};
use crate::printer::PrinterProfile;

/// Default per-stage timeout.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a send currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Idle,
    Connecting,
    ServiceResolving,
    CharacteristicResolving,
    Writing,
    Done,
    Failed,
}

/// Link parameters for a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub service_uuid: Uuid,
    pub characteristic_uuid: Uuid,
    /// Bytes per write. Values below 1 are treated as 1.
    pub chunk_size: usize,
    /// `None` disables the per-stage timeout.
    pub stage_timeout: Option<Duration>,
}

impl TransportOptions {
    pub fn for_profile(profile: &PrinterProfile) -> Self {
        Self {
            service_uuid: profile.service_uuid,
            characteristic_uuid: profile.write_characteristic_uuid,
            chunk_size: profile.chunk_size,
            stage_timeout: Some(DEFAULT_STAGE_TIMEOUT),
        }
    }

    pub fn with_stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stage_timeout = timeout;
        self
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self::for_profile(&PrinterProfile::BLE_58MM)
    }
}

/// # BLE Printer Transport
///
/// Owns the discovery front-end and the current device handle.
///
/// ## Example
///
/// ```
/// use recibo::transport::{BleTransport, DeviceLinker, TransportOptions, TransportState};
/// use recibo::transport::memory::{MemoryCentral, MemoryDevice};
///
/// # tokio_test_block(async {
/// let printer = MemoryDevice::printer("MPT-II");
/// let central = MemoryCentral::new().with_device(printer.clone());
/// let mut transport = BleTransport::new(DeviceLinker::new(central), TransportOptions::default());
///
/// transport.send(b"hello", Some("MPT-II")).await?;
/// assert_eq!(transport.state(), TransportState::Done);
/// assert_eq!(printer.written(), b"hello".to_vec());
/// # Ok::<(), recibo::error::TransportError>(())
/// # }).unwrap();
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
pub struct BleTransport<C: Central> {
    linker: DeviceLinker<C>,
    options: TransportOptions,
    handle: Option<DeviceHandle<C::Device>>,
    state: TransportState,
}

impl<C: Central> BleTransport<C> {
    pub fn new(linker: DeviceLinker<C>, options: TransportOptions) -> Self {
        Self {
            linker,
            options,
            handle: None,
            state: TransportState::Idle,
        }
    }

    pub fn linker(&self) -> &DeviceLinker<C> {
        &self.linker
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    /// The handle retained from the last successful link or print.
    pub fn handle(&self) -> Option<&DeviceHandle<C::Device>> {
        self.handle.as_ref()
    }

    /// Use a freshly linked device for the next send.
    pub fn adopt(&mut self, handle: DeviceHandle<C::Device>) {
        self.handle = Some(handle);
    }

    /// Drop the retained handle; the next send re-finds the printer by name.
    pub fn forget(&mut self) {
        self.handle = None;
    }

    /// Deliver `data` to the printer.
    ///
    /// Uses the retained handle if there is one, otherwise re-discovers the
    /// printer by `linked_name`. On success the handle is kept for the next
    /// send; on failure it is dropped.
    pub async fn send(&mut self, data: &[u8], linked_name: Option<&str>) -> Result<(), TransportError> {
        self.state = TransportState::Idle;
        match self.run(data, linked_name).await {
            Ok(()) => {
                self.transition(TransportState::Done);
                info!(bytes = data.len(), "Print delivered");
                Ok(())
            }
            Err(e) => {
                self.transition(TransportState::Failed);
                self.handle = None;
                warn!(error = %e, "Print failed");
                Err(e)
            }
        }
    }

    async fn run(&mut self, data: &[u8], linked_name: Option<&str>) -> Result<(), TransportError> {
        self.transition(TransportState::Connecting);
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => {
                let name = linked_name.ok_or(TransportError::NotLinked)?;
                self.linker
                    .relink(name)
                    .await
                    .map_err(TransportError::Relink)?
            }
        };

        let timeout = self.options.stage_timeout;
        let server = within(timeout, "connecting", handle.device().connect())
            .await?
            .map_err(TransportError::Connect)?;
        self.handle = Some(handle);

        let result = self.deliver(&server, data).await;

        match within(timeout, "disconnecting", server.disconnect()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Disconnect failed"),
            Err(e) => warn!(error = %e, "Disconnect abandoned"),
        }
        result
    }

    async fn deliver<S: GattServer>(&mut self, server: &S, data: &[u8]) -> Result<(), TransportError> {
        let timeout = self.options.stage_timeout;
        let service_uuid = self.options.service_uuid;
        let characteristic_uuid = self.options.characteristic_uuid;

        self.transition(TransportState::ServiceResolving);
        let service = within(timeout, "resolving service", server.primary_service(service_uuid))
            .await?
            .map_err(|e| match e {
                GattError::NotFound(_) => TransportError::ServiceNotFound(service_uuid),
                other => TransportError::Connect(other),
            })?;

        self.transition(TransportState::CharacteristicResolving);
        let characteristic = within(
            timeout,
            "resolving characteristic",
            service.characteristic(characteristic_uuid),
        )
        .await?
        .map_err(|e| match e {
            GattError::NotFound(_) => TransportError::CharacteristicNotFound(characteristic_uuid),
            other => TransportError::Connect(other),
        })?;

        self.transition(TransportState::Writing);
        let chunk_size = self.options.chunk_size.max(1);
        let total = data.len().div_ceil(chunk_size);
        for (index, chunk) in data.chunks(chunk_size).enumerate() {
            let chunk_number = index + 1;
            debug!(chunk = chunk_number, total, len = chunk.len(), "Writing chunk");
            within(timeout, "writing", characteristic.write_value(chunk))
                .await?
                .map_err(|source| TransportError::Write {
                    chunk: chunk_number,
                    total,
                    source,
                })?;
        }
        Ok(())
    }

    fn transition(&mut self, next: TransportState) {
        debug!(from = ?self.state, to = ?next, "Transport state");
        self.state = next;
    }
}

/// Run `future` under an optional timeout.
async fn within<F: Future>(
    timeout: Option<Duration>,
    stage: &'static str,
    future: F,
) -> Result<F::Output, TransportError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| TransportError::Timeout {
                stage,
                timeout: limit,
            }),
        None => Ok(future.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::{MemoryCentral, MemoryDevice};

    fn transport_for(device: &MemoryDevice) -> BleTransport<MemoryCentral> {
        let central = MemoryCentral::new().with_device(device.clone());
        BleTransport::new(DeviceLinker::new(central), TransportOptions::default())
    }

    #[test]
    fn test_default_options() {
        let options = TransportOptions::default();
        assert_eq!(options.chunk_size, 20);
        assert_eq!(options.stage_timeout, Some(DEFAULT_STAGE_TIMEOUT));
    }

    #[test]
    fn test_initial_state() {
        assert_eq!(TransportState::default(), TransportState::Idle);
    }

    #[tokio::test]
    async fn test_not_linked() {
        let device = MemoryDevice::printer("P");
        let mut transport = transport_for(&device);
        let err = transport.send(b"x", None).await.unwrap_err();
        assert!(matches!(err, TransportError::NotLinked));
        assert_eq!(transport.state(), TransportState::Failed);
    }

    #[tokio::test]
    async fn test_handle_retained_after_success() {
        let device = MemoryDevice::printer("P");
        let mut transport = transport_for(&device);
        transport.send(b"x", Some("P")).await.unwrap();
        assert_eq!(transport.handle().and_then(|h| h.name()), Some("P"));

        // Second send works without a name: it reuses the handle.
        transport.send(b"y", None).await.unwrap();
        assert_eq!(device.written(), b"xy".to_vec());
        assert_eq!(device.connects(), 2);
        assert_eq!(device.disconnects(), 2);
    }

    #[tokio::test]
    async fn test_handle_dropped_after_failure() {
        let device = MemoryDevice::printer("P").refusing_connect();
        let mut transport = transport_for(&device);
        let err = transport.send(b"x", Some("P")).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)));
        assert!(transport.handle().is_none());
    }

    #[tokio::test]
    async fn test_zero_chunk_size_is_clamped() {
        let device = MemoryDevice::printer("P");
        let central = MemoryCentral::new().with_device(device.clone());
        let options = TransportOptions {
            chunk_size: 0,
            ..Default::default()
        };
        let mut transport = BleTransport::new(DeviceLinker::new(central), options);
        transport.send(b"abc", Some("P")).await.unwrap();
        assert_eq!(device.writes().len(), 3);
    }
}
