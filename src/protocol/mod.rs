//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders for the ESC/POS subset spoken by 58mm
//! Bluetooth Low-Energy receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Printer control (init, line feeds, cut)
//! - [`text`]: Text styling (alignment, bold, character size)
//! - [`cp437`]: Unicode to PC437 text encoding
//!
//! ## Usage Example
//!
//! ```
//! use recibo::protocol::{commands, cp437, text};
//! use recibo::protocol::text::Alignment;
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::align(Alignment::Center));
//! data.extend(text::bold(true));
//! data.extend(cp437::encode("RECEIPT"));
//! data.extend(commands::line_feed());
//! data.extend(commands::line_feed());
//! data.extend(text::bold(false));
//! data.extend(commands::cut_full());
//!
//! assert_eq!(&data[..2], &[0x1B, 0x40]);
//! ```
//!
//! No raster or bit-image opcodes are implemented: images never travel
//! over the BLE link.

pub mod commands;
pub mod cp437;
pub mod text;
