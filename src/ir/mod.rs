//! # Intermediate Representation (IR)
//!
//! A "bytecode" representation that sits between the receipt document and
//! raw ESC/POS bytes.
//!
//! ```text
//! ┌───────────────┐     ┌─────────────┐     ┌──────────┐
//! │ PrinterConfig │ ──► │     IR      │ ──► │ Codegen  │
//! │  (document)   │     │  (Vec<Op>)  │     │ (bytes)  │
//! └───────────────┘     └─────────────┘     └──────────┘
//! ```
//!
//! The IR makes a receipt inspectable (`{:#?}`) and testable op by op
//! without comparing opaque byte strings.
//!
//! ## Example
//!
//! ```
//! use recibo::ir::{Op, Program};
//! use recibo::protocol::text::Alignment;
//!
//! let mut program = Program::with_init();
//! program.push(Op::SetAlign(Alignment::Center));
//! program.push(Op::SetBold(true));
//! program.push(Op::Text("HELLO".into()));
//! program.push(Op::Newline);
//! program.push(Op::Cut);
//!
//! let bytes = program.to_bytes();
//! assert_eq!(&bytes[..2], &[0x1B, 0x40]);
//! ```

mod codegen;
mod ops;

// Codegen adds methods to Program via impl
pub use ops::*;
