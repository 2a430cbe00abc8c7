//! # Printer Module
//!
//! Printer-specific configuration.
//!
//! ## Modules
//!
//! - [`profile`]: hardware and GATT characteristics of 58mm BLE printers

pub mod profile;

pub use profile::{
    BLE_CHUNK_SIZE, PRINTER_SERVICE_UUID, PRINTER_WRITE_CHARACTERISTIC_UUID, PrinterProfile,
};
