//! # IR to Plain-Text Preview Renderer
//!
//! Renders IR programs to the monospaced text a 58mm printer would produce.
//! This is what the OS print path hands to the print surface, and what the
//! `preview` command shows.
//!
//! ## Architecture
//!
//! ```text
//! Program (IR) → PreviewRenderer → String
//!                     ↓
//!               Process each Op:
//!               - Track style state (align, size)
//!               - Hard-wrap text at the column count
//!               - Pad each line for its alignment
//!               - Draw a dashed line for the cut
//! ```
//!
//! ## Example
//!
//! ```
//! use recibo::document::{self, PrinterConfig};
//! use recibo::preview::PreviewRenderer;
//!
//! let config = PrinterConfig {
//!     content: "Hello".into(),
//!     ..Default::default()
//! };
//! let text = PreviewRenderer::new(32).render(&document::compile(&config));
//! assert!(text.starts_with("Hello\n"));
//! ```

use std::io::Write;

use crate::document::{self, PrinterConfig};
use crate::error::ReciboError;
use crate::ir::{Op, Program};
use crate::printer::PrinterProfile;
use crate::protocol::cp437;
use crate::protocol::text::{Alignment, CharSize};

/// Style that affects layout.
#[derive(Debug, Clone, Copy, Default)]
struct RenderState {
    alignment: Alignment,
    size: CharSize,
}

/// Preview renderer for IR programs.
pub struct PreviewRenderer {
    /// Font A columns at normal size
    columns: usize,
    /// Pass text through the PC437 mapping first
    as_printed: bool,
    state: RenderState,
    /// Alignment and size in effect when the pending line started
    line_state: RenderState,
    line: String,
    lines: Vec<String>,
}

impl PreviewRenderer {
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            as_printed: false,
            state: RenderState::default(),
            line_state: RenderState::default(),
            line: String::new(),
            lines: Vec::new(),
        }
    }

    /// Renderer sized for a printer profile.
    pub fn for_profile(profile: &PrinterProfile) -> Self {
        Self::new(profile.columns)
    }

    /// Show text the way the printer's code table will print it, with
    /// unmapped characters as `?`.
    pub fn as_printed(mut self, enabled: bool) -> Self {
        self.as_printed = enabled;
        self
    }

    /// Render the program to text, one line per printed line.
    pub fn render(mut self, program: &Program) -> String {
        for op in program {
            self.process_op(op);
        }
        if !self.line.is_empty() {
            self.flush_line();
        }

        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn process_op(&mut self, op: &Op) {
        match op {
            Op::Init => {
                self.state = RenderState::default();
            }

            Op::Cut => {
                if !self.line.is_empty() {
                    self.flush_line();
                }
                self.lines.push("-".repeat(self.columns));
            }

            Op::SetAlign(align) => {
                self.state.alignment = *align;
            }

            // Emphasis has no plain-text rendition.
            Op::SetBold(_) => {}

            Op::SetSize(size) => {
                self.state.size = *size;
            }

            Op::Text(text) => {
                if self.line.is_empty() {
                    self.line_state = self.state;
                }
                if self.as_printed {
                    self.line.push_str(&cp437::printable(text));
                } else {
                    self.line.push_str(text);
                }
            }

            Op::Newline => {
                if self.line.is_empty() {
                    self.line_state = self.state;
                }
                self.flush_line();
            }
        }
    }

    /// Emit the pending text as one or more wrapped, aligned lines.
    fn flush_line(&mut self) {
        let text = std::mem::take(&mut self.line);
        let multiplier = self.line_state.size.multiplier();
        let capacity = (self.columns / multiplier).max(1);

        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            self.lines.push(String::new());
            return;
        }

        for segment in chars.chunks(capacity) {
            let mut rendered = String::with_capacity(segment.len() * multiplier);
            for &c in segment {
                rendered.push(c);
                rendered.extend(std::iter::repeat_n(' ', multiplier - 1));
            }
            let rendered = rendered.trim_end().to_string();

            let width = segment.len() * multiplier;
            let slack = self.columns.saturating_sub(width);
            let pad = match self.line_state.alignment {
                Alignment::Left => 0,
                Alignment::Center => slack / 2,
                Alignment::Right => slack,
            };
            self.lines.push(format!("{}{}", " ".repeat(pad), rendered));
        }
    }
}

/// Render a receipt as the OS print path shows it.
///
/// The header image never reaches the BLE stream, but the OS path can print
/// it, so the preview marks where it goes.
pub fn render_preview(config: &PrinterConfig, profile: &PrinterProfile) -> String {
    let body = PreviewRenderer::for_profile(profile).render(&document::compile(config));
    match &config.header_image {
        Some(_) => {
            let name = if config.header_image_name.is_empty() {
                "image"
            } else {
                config.header_image_name.as_str()
            };
            format!("[logo: {}]\n{}", name, body)
        }
        None => body,
    }
}

/// Where the OS print path sends a rendered document.
pub trait PrintSurface {
    fn present(&mut self, document: &str) -> Result<(), ReciboError>;
}

/// A print surface that writes the document to any `Write` sink
/// (stdout, a spool file, a pipe to `lp`).
pub struct WriterSurface<W> {
    writer: W,
}

impl<W: Write> WriterSurface<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PrintSurface for WriterSurface<W> {
    fn present(&mut self, document: &str) -> Result<(), ReciboError> {
        self.writer
            .write_all(document.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|e| ReciboError::Surface(e.to_string()))
    }
}
