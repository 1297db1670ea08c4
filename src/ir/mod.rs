//! # Intermediate Representation (IR)
//!
//! The IR sits between typed print commands and raw printer bytes. It is a
//! flat list of ops that one code generator per dialect turns into bytes.
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌──────────────────┐
//! │ PrintCommand │ ──► │     IR      │ ──► │ Codegen(dialect) │ ──► bytes
//! │   (typed)    │     │  (Vec<Op>)  │     │ Star/Graphic/POS │
//! └──────────────┘     └─────────────┘     └──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use cometa::emulation::Emulation;
//! use cometa::ir::{Op, Program};
//! use cometa::options::{Alignment, CutPaperAction};
//!
//! let mut program = Program::new();
//! program.push(Op::SetAlign(Alignment::Center));
//! program.push(Op::Text(b"HELLO\n".to_vec()));
//! program.push(Op::Cut(CutPaperAction::PartialCutWithFeed));
//!
//! let star = program.to_bytes(Emulation::StarPrnt);
//! let pos = program.to_bytes(Emulation::EscPos);
//! assert_ne!(star, pos);
//! ```

mod codegen;
mod ops;

pub use codegen::STAR_GRAPHIC_LINE_DOTS;
pub use ops::*;
