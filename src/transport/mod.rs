//! # Printer Transport Layer
//!
//! Gets encoded receipts onto a Bluetooth Low-Energy printer.
//!
//! ## Pieces
//!
//! - [`gatt`]: the traits a Bluetooth stack has to implement
//! - [`link`]: discovery, producing a [`DeviceHandle`]
//! - [`ble`]: the connect / resolve / chunked-write state machine
//! - [`btle`]: btleplug backend for real hardware
//! - [`memory`]: in-process backend that records writes

pub mod ble;
pub mod btle;
pub mod gatt;
pub mod link;
pub mod memory;

pub use ble::{BleTransport, DEFAULT_STAGE_TIMEOUT, TransportOptions, TransportState};
pub use btle::{BtleCentral, DeviceChooser, FirstMatch};
pub use gatt::{Central, Device, DeviceFilter, GattCharacteristic, GattServer, GattService};
pub use link::{DeviceHandle, DeviceLinker};
