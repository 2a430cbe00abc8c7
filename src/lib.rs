//! # Recibo - 58mm Receipt Printing over Bluetooth LE
//!
//! Recibo turns a small receipt description into ESC/POS bytes and delivers
//! them to a Bluetooth Low-Energy thermal printer. It provides:
//!
//! - **Protocol implementation**: ESC/POS command builders and PC437 text
//! - **Document encoder**: `PrinterConfig` → IR → bytes
//! - **Transport**: device linking and chunked, sequential GATT writes
//! - **Preview**: the same receipt as plain text for the OS print path
//!
//! ## Quick Start
//!
//! ```no_run
//! use recibo::{
//!     document::{PrinterConfig, TextAlign},
//!     preview::WriterSurface,
//!     session::PrintSession,
//!     transport::{BleTransport, BtleCentral, DeviceLinker, TransportOptions},
//! };
//!
//! # async fn demo() -> Result<(), recibo::ReciboError> {
//! let central = BtleCentral::system();
//! let transport = BleTransport::new(DeviceLinker::new(central), TransportOptions::default());
//!
//! let config = PrinterConfig {
//!     header_text: "Shop".into(),
//!     content: "Hello\nWorld".into(),
//!     text_align: TextAlign::Center,
//!     ..Default::default()
//! };
//!
//! let mut session = PrintSession::new(config, transport);
//! session.link().await?;
//! session.print(&mut WriterSurface::new(std::io::stdout())).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ESC/POS command builders, PC437 |
//! | [`ir`] | Receipt opcodes and codegen |
//! | [`document`] | Receipt config and encoder |
//! | [`printer`] | Printer profile and GATT identifiers |
//! | [`transport`] | Linking and the BLE write state machine |
//! | [`preview`] | Plain-text rendering and print surfaces |
//! | [`store`] | Persisted config |
//! | [`transform`] | AI extract / reformat helpers |
//! | [`session`] | The print action |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Generic 58mm ESC/POS printers exposing GATT service `0x18F0` with write
//! characteristic `0x2AF1` (MPT-II, RPP02N, PT-210 and similar).

pub mod document;
pub mod error;
pub mod ir;
pub mod preview;
pub mod printer;
pub mod protocol;
pub mod session;
pub mod store;
pub mod transform;
pub mod transport;

// Re-exports for convenience
pub use document::PrinterConfig;
pub use error::ReciboError;
pub use printer::PrinterProfile;
pub use session::{PrintOutcome, PrintSession};
