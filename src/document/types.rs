//! The receipt configuration: the single source of truth for what gets
//! printed and how it is routed.
//!
//! The JSON shape (camelCase) is the persisted snapshot shape as well, so
//! the same type is used by the encoder, the session and the config store.

use serde::{Deserialize, Serialize};

use crate::protocol::text::{Alignment, CharSize};

/// Logical body font size as chosen in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Sm,
    #[default]
    Base,
    Lg,
    Xl,
}

impl FontSize {
    pub const ALL: [FontSize; 4] = [FontSize::Sm, FontSize::Base, FontSize::Lg, FontSize::Xl];

    /// Physical magnification. `sm` and `base` both collapse to normal:
    /// firmware only offers coarse integer steps.
    pub const fn char_size(self) -> CharSize {
        match self {
            FontSize::Sm | FontSize::Base => CharSize::Normal,
            FontSize::Lg => CharSize::Double,
            FontSize::Xl => CharSize::Quadruple,
        }
    }
}

/// Body text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub const ALL: [TextAlign; 3] = [TextAlign::Left, TextAlign::Center, TextAlign::Right];

    pub const fn alignment(self) -> Alignment {
        match self {
            TextAlign::Left => Alignment::Left,
            TextAlign::Center => Alignment::Center,
            TextAlign::Right => Alignment::Right,
        }
    }
}

/// Everything the editor captures about a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrinterConfig {
    /// Optional title; printed centered, bold and upper-cased.
    pub header_text: String,
    /// Logo as a data URI. Only used by the OS print path.
    pub header_image: Option<String>,
    /// File name the logo was picked from.
    pub header_image_name: String,
    /// Body text, printed verbatim.
    pub content: String,
    pub font_size: FontSize,
    pub text_align: TextAlign,
    /// Emphasis for the body text. The header is always bold.
    pub bold: bool,
    /// Route prints to the BLE printer instead of the OS print path.
    pub use_bluetooth: bool,
    /// Advertised name of the last successfully linked printer.
    pub linked_printer_name: Option<String>,
}

impl PrinterConfig {
    /// Whether the header block will be emitted.
    pub fn has_header(&self) -> bool {
        !self.header_text.is_empty()
    }

    /// Record a successful link.
    pub fn mark_linked(&mut self, name: Option<String>) {
        self.linked_printer_name = name;
        self.use_bluetooth = true;
    }
}
