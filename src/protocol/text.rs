//! # ESC/POS Text Styling Commands
//!
//! The subset of text formatting a 58mm BLE receipt needs.
//!
//! | Style | Command | Effect |
//! |-------|---------|--------|
//! | Alignment | ESC a n | left / center / right |
//! | Bold | ESC E n | **Emphasized** text |
//! | Size | GS ! n | width/height magnification |
//!
//! ## Text Alignment
//!
//! ```text
//! Left aligned (default)    |LEFT TEXT
//! Center aligned            |  CENTER TEXT
//! Right aligned             |      RIGHT TEXT
//! ```

use super::commands::{ESC, GS};

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Set Text Alignment (ESC a n)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC a n |
/// | Hex     | 1B 61 n |
/// | Decimal | 27 97 n |
///
/// ## Parameters
///
/// - `n = 0`: Left alignment (default)
/// - `n = 1`: Center alignment
/// - `n = 2`: Right alignment
///
/// Only takes effect at the start of a line, so it must be sent before the
/// first character of the line it applies to.
///
/// ## Example
///
/// ```
/// use recibo::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// TEXT EMPHASIS (BOLD)
// ============================================================================

/// # Turn Emphasis On/Off (ESC E n)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC E n |
/// | Hex     | 1B 45 n |
///
/// Only the lowest bit of `n` is significant; 1 turns emphasis on.
#[inline]
pub fn bold(enabled: bool) -> Vec<u8> {
    vec![ESC, b'E', enabled as u8]
}

// ============================================================================
// CHARACTER SIZE
// ============================================================================

/// Physical character magnification steps.
///
/// Thermal firmwares offer coarse integer multipliers; only three are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharSize {
    /// 1x width, 1x height
    #[default]
    Normal,
    /// 2x width, 2x height
    Double,
    /// 4x width, 4x height
    Quadruple,
}

impl CharSize {
    /// The `GS !` parameter byte: high nibble is width - 1, low nibble is
    /// height - 1.
    pub const fn code(self) -> u8 {
        match self {
            CharSize::Normal => 0x00,
            CharSize::Double => 0x11,
            CharSize::Quadruple => 0x33,
        }
    }

    /// Horizontal multiplier, used by the text preview.
    pub const fn multiplier(self) -> usize {
        match self {
            CharSize::Normal => 1,
            CharSize::Double => 2,
            CharSize::Quadruple => 4,
        }
    }
}

/// # Select Character Size (GS ! n)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS ! n |
/// | Hex     | 1D 21 n |
/// | Decimal | 29 33 n |
///
/// ## Parameters
///
/// | Bits | Meaning |
/// |------|---------|
/// | 4-6  | width multiplier - 1 (0-7) |
/// | 0-2  | height multiplier - 1 (0-7) |
///
/// ## Example
///
/// ```
/// use recibo::protocol::text::{size, CharSize};
///
/// assert_eq!(size(CharSize::Double), vec![0x1D, 0x21, 0x11]);
/// ```
pub fn size(size: CharSize) -> Vec<u8> {
    vec![GS, b'!', size.code()]
}

// ============================================================================
// TESTS
// ============================================================================
