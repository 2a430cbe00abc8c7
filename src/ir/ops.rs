//! # IR Opcodes
//!
//! The intermediate representation for a receipt: a flat sequence of
//! opcodes, each one a single ESC/POS operation or a run of text.
//!
//! ```text
//! PrinterConfig → IR (inspectable) → Codegen → Bytes
//! ```
//!
//! The op order is the wire order. Printer firmware executes commands as it
//! meets them, so nothing reorders or merges ops.

use crate::protocol::text::{Alignment, CharSize};

/// How text ops are turned into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// PC437 with transliteration of common punctuation.
    #[default]
    Cp437,
    /// Raw UTF-8, for firmwares configured for it.
    Utf8,
}

/// IR opcodes - the "bytecode" for receipt printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    // ========== Printer Control ==========
    /// Initialize printer (ESC @).
    Init,

    /// Full paper cut (GS V 0).
    Cut,

    // ========== Style Changes ==========
    /// Set text alignment.
    SetAlign(Alignment),

    /// Enable/disable bold.
    SetBold(bool),

    /// Set character magnification.
    SetSize(CharSize),

    // ========== Content ==========
    /// Text without a trailing newline.
    Text(String),

    /// Line feed.
    Newline,
}

/// A receipt program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub ops: Vec<Op>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Create a program with an initial Init op.
    pub fn with_init() -> Self {
        Self {
            ops: vec![Op::Init],
        }
    }

    /// Add an op to the program.
    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    /// Push `n` newline ops.
    pub fn newlines(&mut self, n: usize) {
        self.ops.extend(std::iter::repeat_n(Op::Newline, n));
    }

    /// Get the number of ops in the program.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the program is empty.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_new() {
        let program = Program::new();
        assert!(program.is_empty());
    }

    #[test]
    fn test_program_with_init() {
        let program = Program::with_init();
        assert_eq!(program.len(), 1);
        assert_eq!(program.ops[0], Op::Init);
    }

    #[test]
    fn test_program_push_and_newlines() {
        let mut program = Program::new();
        program.push(Op::SetBold(true));
        program.push(Op::Text("Hello".into()));
        program.newlines(2);
        assert_eq!(program.len(), 4);
        assert_eq!(program.ops[2], Op::Newline);
        assert_eq!(program.ops[3], Op::Newline);
    }

    #[test]
    fn test_program_iterates_in_wire_order() {
        let mut program = Program::with_init();
        program.push(Op::Text("x".into()));
        program.push(Op::Cut);
        let ops: Vec<&Op> = (&program).into_iter().collect();
        assert_eq!(ops, vec![&Op::Init, &Op::Text("x".into()), &Op::Cut]);
    }

    #[test]
    fn test_text_encoding_default() {
        assert_eq!(TextEncoding::default(), TextEncoding::Cp437);
    }
}
