//! # asm-fluent: Fluent x86 Instruction Builder
//!
//! `asm-fluent` builds x86 instruction streams from method calls instead of
//! assembly text. Each call resolves its operands (indirect access,
//! displacement, operation width) and validates them before anything is
//! appended, so a finished stream never holds a half-built instruction.
//!
//! ## Quick Start
//!
//! ```rust
//! use asm_fluent::{mem, Assembler, OperandSize, Register};
//!
//! let mut asm = Assembler::new();
//! asm.push(Register::Ebp)?
//!     .set(Register::Ebp, Register::Esp)?
//!     .set(mem(Register::Ebp, -4).sized(OperandSize::Dword), 0u32)?
//!     .pop(Register::Ebp)?
//!     .ret()?;
//! let program = asm.finish();
//! assert!(program.listing().contains("mov dword ptr [ebp-0x4], 0x0"));
//! # Ok::<(), asm_fluent::AsmError>(())
//! ```
//!
//! ## Features
//!
//! - **Validated operands**: memory-to-memory pairs, unsized memory
//!   destinations, register width mismatches and bad shift counts are
//!   rejected with a typed [`AsmError`].
//! - **Pluggable sinks**: append into a [`Program`] or any
//!   [`InstructionSink`].
//! - **`no_std` + `alloc`**: usable inside kernels and firmware tooling.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
// ── Pedantic lint policy ─────────────────────────────────────────────────
#![allow(
    clippy::unreadable_literal,
    clippy::match_same_arms,
    clippy::wildcard_imports,
    clippy::enum_glob_use,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args,
    clippy::doc_markdown,
    clippy::return_self_not_must_use,
    clippy::missing_errors_doc,
    clippy::should_implement_trait
)]

extern crate alloc;

/// Public builder API: one method per instruction family.
pub mod assembler;
/// Error types.
pub mod error;
/// Intermediate representation: registers, operands, descriptors, statements.
pub mod ir;
/// Instruction sinks and the in-memory program.
pub mod program;
/// Operand normalization, indirection exclusion and size resolution.
pub mod resolver;

// Re-exports
pub use assembler::{Assembler, ResourceLimits};
pub use error::AsmError;
pub use ir::{
    Access, Condition, ConstDef, DataMember, DataValue, InstructionDescriptor, Mnemonic, Operand,
    OperandSize, Register, Statement, Symbol, Value,
};
pub use program::{InstructionSink, Program};
pub use resolver::{byte_store, deref, mem, resolve, Arg, Count, Form, Request, SizeCheck};
