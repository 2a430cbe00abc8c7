//! # Receipt Document Encoder
//!
//! A pure, deterministic mapping from a [`PrinterConfig`] snapshot to the
//! ESC/POS byte stream the printer executes.
//!
//! ```
//! use recibo::document::{self, PrinterConfig, TextAlign};
//!
//! let config = PrinterConfig {
//!     header_text: "Shop".into(),
//!     content: "Hello\nWorld".into(),
//!     text_align: TextAlign::Center,
//!     ..Default::default()
//! };
//!
//! let bytes = document::encode(&config);
//! assert_eq!(&bytes[..2], &[0x1B, 0x40]);
//! assert_eq!(bytes, document::encode(&config));
//! ```
//!
//! ## Layout
//!
//! ```text
//! ESC @                              reset
//! ESC a 1, ESC E 1, HEADER, LF LF,   header (only if non-empty)
//! ESC E 0
//! ESC a n, GS ! n                    body alignment and size
//! [ESC E 1] content LF LF [ESC E 0]  body (bold only if requested)
//! ESC a 1, GS ! 0, footer LF         footer banner
//! LF x4                              clear the cutter blade
//! GS V 0                             cut
//! ```

pub mod types;

pub use types::*;

use crate::ir::{Op, Program, TextEncoding};
use crate::protocol::text::{Alignment, CharSize};

/// Closing banner printed on every receipt.
pub const FOOTER_BANNER: &str = "Thank you!";

/// Line feeds after the footer so the last line clears the cutter.
pub const TRAILING_FEEDS: usize = 4;

/// Blank lines after the header and after the body.
const BLOCK_GAP: usize = 2;

/// Build the IR for a receipt.
pub fn compile(config: &PrinterConfig) -> Program {
    let mut program = Program::with_init();

    if config.has_header() {
        program.push(Op::SetAlign(Alignment::Center));
        program.push(Op::SetBold(true));
        push_text(&mut program, &config.header_text.to_uppercase());
        program.newlines(BLOCK_GAP);
        program.push(Op::SetBold(false));
    }

    program.push(Op::SetAlign(config.text_align.alignment()));
    program.push(Op::SetSize(config.font_size.char_size()));
    if config.bold {
        program.push(Op::SetBold(true));
    }
    push_text(&mut program, &config.content);
    program.newlines(BLOCK_GAP);
    if config.bold {
        program.push(Op::SetBold(false));
    }

    program.push(Op::SetAlign(Alignment::Center));
    program.push(Op::SetSize(CharSize::Normal));
    program.push(Op::Text(FOOTER_BANNER.to_string()));
    program.push(Op::Newline);
    program.newlines(TRAILING_FEEDS);

    program.push(Op::Cut);
    program
}

/// Encode a receipt as ESC/POS bytes with PC437 text.
pub fn encode(config: &PrinterConfig) -> Vec<u8> {
    encode_with(config, TextEncoding::Cp437)
}

/// Encode a receipt as ESC/POS bytes with the given text encoding.
pub fn encode_with(config: &PrinterConfig, encoding: TextEncoding) -> Vec<u8> {
    compile(config).to_bytes_with_encoding(encoding)
}

/// Split text into Text/Newline ops. `\r\n` and lone `\r` count as one
/// line break.
fn push_text(program: &mut Program, text: &str) {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    for (i, line) in normalized.split('\n').enumerate() {
        if i > 0 {
            program.push(Op::Newline);
        }
        if !line.is_empty() {
            program.push(Op::Text(line.to_string()));
        }
    }
}
