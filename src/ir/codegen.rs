//! # Code Generation
//!
//! Converts IR programs to ESC/POS bytes.

use super::ops::{Op, Program, TextEncoding};
use crate::protocol::{commands, cp437, text};

impl Program {
    /// Compile the IR program to ESC/POS bytes using PC437 text.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_bytes_with_encoding(TextEncoding::Cp437)
    }

    /// Compile the IR program to ESC/POS bytes with a specific text encoding.
    pub fn to_bytes_with_encoding(&self, encoding: TextEncoding) -> Vec<u8> {
        let mut out = Vec::new();

        for op in &self.ops {
            match op {
                // ===== Printer Control =====
                Op::Init => {
                    out.extend(commands::init());
                }
                Op::Cut => {
                    out.extend(commands::cut_full());
                }

                // ===== Style Changes =====
                Op::SetAlign(align) => {
                    out.extend(text::align(*align));
                }
                Op::SetBold(enabled) => {
                    out.extend(text::bold(*enabled));
                }
                Op::SetSize(size) => {
                    out.extend(text::size(*size));
                }

                // ===== Content =====
                Op::Text(s) => match encoding {
                    TextEncoding::Cp437 => out.extend(cp437::encode(s)),
                    TextEncoding::Utf8 => out.extend(cp437::strip_controls(s).as_bytes()),
                },
                Op::Newline => {
                    out.extend(commands::line_feed());
                }
            }
        }

        out
    }
}
