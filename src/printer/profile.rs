//! # Printer Profile
//!
//! Hardware and link characteristics of the supported printer family.
//!
//! ## Supported Printers
//!
//! | Family | Paper | Print width | Columns (Font A) | Link |
//! |--------|-------|-------------|------------------|------|
//! | Generic ESC/POS 58mm | 58mm | 48mm (384 dots) | 32 | BLE, service 0x18F0 |
//!
//! ## Usage
//!
//! ```
//! use recibo::printer::PrinterProfile;
//!
//! let profile = PrinterProfile::BLE_58MM;
//! assert_eq!(profile.columns, 32);
//! assert_eq!(profile.chunk_size, 20);
//! ```

use uuid::Uuid;

/// GATT service exposed by ESC/POS BLE receipt printers.
pub const PRINTER_SERVICE_UUID: Uuid = Uuid::from_u128(0x000018f0_0000_1000_8000_00805f9b34fb);

/// Write characteristic inside [`PRINTER_SERVICE_UUID`].
pub const PRINTER_WRITE_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x00002af1_0000_1000_8000_00805f9b34fb);

/// Bytes per BLE write. Stays under the 23-byte default ATT MTU minus its
/// 3-byte header so no write is fragmented at the link layer.
pub const BLE_CHUNK_SIZE: usize = 20;

/// # Printer Profile
///
/// ## Physical Properties
///
/// - **columns**: Font A characters per line at normal size (48mm of
///   printable width at 203 dpi)
///
/// ## Link Properties
///
/// - **service_uuid** / **write_characteristic_uuid**: GATT endpoints
/// - **chunk_size**: maximum bytes per characteristic write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterProfile {
    /// Printer family name
    pub name: &'static str,

    /// Characters per line with Font A at 1x
    pub columns: usize,

    pub service_uuid: Uuid,

    pub write_characteristic_uuid: Uuid,

    pub chunk_size: usize,
}

impl PrinterProfile {
    /// # Generic 58mm BLE Receipt Printer
    ///
    /// ```text
    /// ├─ 5mm ─┼──── 48mm printable ────┼─ 5mm ─┤
    /// │margin │       384 dots         │margin │
    /// ```
    pub const BLE_58MM: Self = Self {
        name: "ESC/POS 58mm BLE",
        columns: 32,
        service_uuid: PRINTER_SERVICE_UUID,
        write_characteristic_uuid: PRINTER_WRITE_CHARACTERISTIC_UUID,
        chunk_size: BLE_CHUNK_SIZE,
    };
}

impl Default for PrinterProfile {
    fn default() -> Self {
        Self::BLE_58MM
    }
}

// ============================================================================
// TESTS
// ============================================================================
