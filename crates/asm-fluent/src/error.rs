//! Error types for operand resolution and stream management.

#[allow(unused_imports)]
use alloc::format;
use alloc::string::String;
use core::fmt;

use crate::ir::{Mnemonic, Register};

/// Builder error with the offending instruction kind and a description.
///
/// Every variant is detected before anything is appended to the
/// instruction stream, so a failed call never leaves a partial record
/// behind.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AsmError {
    /// Destination and source were both indirect after normalization.
    ///
    /// x86 has no memory-to-memory form for these instructions.
    ConflictingIndirection {
        /// The instruction being built.
        kind: Mnemonic,
    },

    /// The operation width could not be determined.
    ///
    /// Raised for indirect destinations (which have no inherent width) and
    /// for immediate/symbol destinations without a register to infer from.
    MissingSize {
        /// The instruction being built.
        kind: Mnemonic,
    },

    /// Two direct register operands had different widths.
    SizeMismatch {
        /// The instruction being built.
        kind: Mnemonic,
        /// Destination register.
        destination: Register,
        /// Source register.
        source: Register,
    },

    /// A shift/rotate count was given in a register other than `CL`.
    InvalidCountRegister {
        /// The instruction being built.
        kind: Mnemonic,
        /// The rejected count register.
        register: Register,
    },

    /// The operand shape is not accepted by this instruction.
    InvalidOperands {
        /// The instruction being built.
        kind: Mnemonic,
        /// Description of why the operands are invalid.
        detail: String,
    },

    /// A configurable resource limit was exceeded.
    ResourceLimitExceeded {
        /// Human-readable name of the resource (e.g. "statements").
        resource: String,
        /// The configured limit that was exceeded.
        limit: usize,
    },
}

impl AsmError {
    /// Whether this is one of the operand configuration errors
    /// (indirection, size, or count-register violations).
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            AsmError::ConflictingIndirection { .. }
                | AsmError::MissingSize { .. }
                | AsmError::SizeMismatch { .. }
                | AsmError::InvalidCountRegister { .. }
        )
    }

    /// The instruction kind the error was raised for, if any.
    #[must_use]
    pub fn kind(&self) -> Option<Mnemonic> {
        match self {
            AsmError::ConflictingIndirection { kind }
            | AsmError::MissingSize { kind }
            | AsmError::SizeMismatch { kind, .. }
            | AsmError::InvalidCountRegister { kind, .. }
            | AsmError::InvalidOperands { kind, .. } => Some(*kind),
            AsmError::ResourceLimitExceeded { .. } => None,
        }
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmError::ConflictingIndirection { kind } => {
                write!(f, "{}: both destination and source cannot be indirect", kind)
            }
            AsmError::MissingSize { kind } => {
                write!(f, "{}: no size specified", kind)
            }
            AsmError::SizeMismatch {
                kind,
                destination,
                source,
            } => {
                write!(
                    f,
                    "{}: register sizes must match ({} is {} bits, {} is {} bits)",
                    kind,
                    destination,
                    destination.size_bits(),
                    source,
                    source.size_bits()
                )
            }
            AsmError::InvalidCountRegister { kind, register } => {
                write!(
                    f,
                    "{}: invalid count register '{}' (only cl is allowed)",
                    kind, register
                )
            }
            AsmError::InvalidOperands { kind, detail } => {
                write!(f, "{}: invalid operand combination: {}", kind, detail)
            }
            AsmError::ResourceLimitExceeded { resource, limit } => {
                write!(
                    f,
                    "resource limit exceeded: {} (limit: {})",
                    resource, limit
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AsmError {}
