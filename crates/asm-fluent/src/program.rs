//! Instruction streams: the [`InstructionSink`] seam and the in-memory
//! [`Program`].

use alloc::string::String;
use alloc::vec::Vec;

use crate::ir::{DataMember, InstructionDescriptor, Statement};

/// Append-only destination for built statements.
///
/// The builder hands over each statement exactly once, in call order, and
/// never reads it back. Implement this to stream straight into an encoder;
/// use [`Program`] to collect everything in memory.
pub trait InstructionSink {
    /// Append a statement to the end of the stream.
    fn append(&mut self, statement: Statement);

    /// Declare a data member.
    fn define_data(&mut self, member: DataMember);
}

impl<S: InstructionSink + ?Sized> InstructionSink for &mut S {
    fn append(&mut self, statement: Statement) {
        (**self).append(statement);
    }

    fn define_data(&mut self, member: DataMember) {
        (**self).define_data(member);
    }
}

/// An in-memory program: ordered statements plus data members.
///
/// # Examples
///
/// ```
/// use asm_fluent::{Assembler, Register};
///
/// let mut asm = Assembler::new();
/// asm.set(Register::Eax, 1u32)?.ret()?;
/// let program = asm.finish();
/// assert_eq!(program.len(), 2);
/// assert_eq!(program.instructions().count(), 1);
/// # Ok::<(), asm_fluent::AsmError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct Program {
    statements: Vec<Statement>,
    data_members: Vec<DataMember>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// All statements in append order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Declared data members in declaration order.
    #[must_use]
    pub fn data_members(&self) -> &[DataMember] {
        &self.data_members
    }

    /// The resolved instruction descriptors, skipping labels, comments and
    /// operand-less instructions.
    pub fn instructions(&self) -> impl Iterator<Item = &InstructionDescriptor> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Instruction(instr) => Some(instr),
            _ => None,
        })
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether no statements were appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Look up a data member by name.
    #[must_use]
    pub fn data_member(&self, name: &str) -> Option<&DataMember> {
        self.data_members.iter().find(|m| m.name == name)
    }

    /// Consume and return the statements.
    #[must_use]
    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }

    /// Produce a human-readable Intel-style listing.
    ///
    /// Labels are flush left, everything else is indented by four spaces.
    /// Data members follow the code, one per line.
    ///
    /// # Example output
    ///
    /// ```text
    /// entry:
    ///     mov dword ptr [esp+0x4], eax
    ///     ret
    /// ticks dd 0x0
    /// ```
    #[must_use]
    pub fn listing(&self) -> String {
        use core::fmt::Write;

        let mut out = String::new();
        for statement in &self.statements {
            match statement {
                Statement::Label(_) => {
                    let _ = writeln!(out, "{}", statement);
                }
                _ => {
                    let _ = writeln!(out, "    {}", statement);
                }
            }
        }
        for member in &self.data_members {
            let _ = writeln!(out, "{}", member);
        }
        out
    }
}

impl InstructionSink for Program {
    fn append(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    fn define_data(&mut self, member: DataMember) {
        self.data_members.push(member);
    }
}
