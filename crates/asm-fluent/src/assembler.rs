//! Public builder API: one method per instruction family.
//!
//! Every method is a thin adapter: it fills in per-family defaults, hands
//! a [`Request`] to the resolver, and appends the result to the sink.

#[allow(unused_imports)]
use alloc::format;
use alloc::string::String;

use crate::error::AsmError;
use crate::ir::*;
use crate::program::{InstructionSink, Program};
use crate::resolver::{byte_store, resolve, Arg, Count, Request};

/// Configurable resource limits for a single instruction stream.
///
/// # Examples
///
/// ```rust
/// use asm_fluent::{Assembler, AsmError, ResourceLimits};
///
/// let mut asm = Assembler::new();
/// asm.limits(ResourceLimits {
///     max_statements: 1,
///     ..ResourceLimits::default()
/// });
/// asm.noop()?;
/// assert!(matches!(asm.noop(), Err(AsmError::ResourceLimitExceeded { .. })));
/// # Ok::<(), AsmError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceLimits {
    /// Maximum number of appended statements. Default: 1,000,000.
    pub max_statements: usize,
    /// Maximum number of declared data members. Default: 100,000.
    pub max_data_members: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_statements: 1_000_000,
            max_data_members: 100_000,
        }
    }
}

/// Builder-pattern instruction stream.
///
/// # Examples
///
/// ```rust
/// use asm_fluent::{mem, Assembler, Condition, OperandSize, Register};
///
/// let mut asm = Assembler::new();
/// asm.label("poll")?
///     .read_from_port_dx(Register::Al)?
///     .test(Register::Al, 0x20u32)?
///     .jump_if(Condition::Equal, "poll")?
///     .set(mem(Register::Ebp, -4).sized(OperandSize::Dword), Register::Eax)?
///     .ret()?;
/// let program = asm.finish();
/// assert_eq!(program.len(), 6);
/// # Ok::<(), asm_fluent::AsmError>(())
/// ```
#[derive(Debug)]
pub struct Assembler<S: InstructionSink = Program> {
    sink: S,
    /// Resource limits for this stream.
    limits: ResourceLimits,
    /// Width used when an immediate or symbol destination gives nothing
    /// to infer from.
    default_size: OperandSize,
    /// Running count of appended statements.
    statement_count: usize,
    /// Running count of declared data members.
    data_member_count: usize,
}

impl Assembler<Program> {
    /// Create a builder that collects into a fresh [`Program`].
    pub fn new() -> Self {
        Self::with_sink(Program::new())
    }

    /// Discard everything built so far, keeping limits and default size.
    pub fn reset(&mut self) -> &mut Self {
        self.sink = Program::new();
        self.statement_count = 0;
        self.data_member_count = 0;
        self
    }
}

impl Default for Assembler<Program> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: InstructionSink> Assembler<S> {
    /// Create a builder that appends into `sink`.
    pub fn with_sink(sink: S) -> Self {
        Self {
            sink,
            limits: ResourceLimits::default(),
            default_size: OperandSize::Dword,
            statement_count: 0,
            data_member_count: 0,
        }
    }

    /// Set resource limits.
    ///
    /// See [`ResourceLimits`] for the available limits and their defaults.
    pub fn limits(&mut self, limits: ResourceLimits) -> &mut Self {
        self.limits = limits;
        self
    }

    /// Set the width used for immediate and symbol destinations that have
    /// no explicit size and no source register to infer from.
    ///
    /// Defaults to [`OperandSize::Dword`].
    pub fn default_size(&mut self, size: OperandSize) -> &mut Self {
        self.default_size = size;
        self
    }

    /// The sink statements are appended to.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Number of statements appended so far.
    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.statement_count
    }

    /// Finish building and return the sink.
    pub fn finish(self) -> S {
        self.sink
    }

    /// Resolve an arbitrary request and append it.
    ///
    /// This is the generic entry point the per-mnemonic methods use. No
    /// adapter defaults are applied.
    ///
    /// # Errors
    ///
    /// Returns any error from [`resolve`], or
    /// [`AsmError::ResourceLimitExceeded`] if the stream is full.
    pub fn instruction(&mut self, request: Request) -> Result<&mut Self, AsmError> {
        let instr = resolve(request).map_err(rejected)?;
        self.append(Statement::Instruction(instr))
    }

    // ── Data movement ───────────────────────────────────────────────────

    /// `mov destination, source`.
    ///
    /// # Examples
    ///
    /// ```
    /// use asm_fluent::{mem, Assembler, OperandSize, Register};
    ///
    /// let mut asm = Assembler::new();
    /// asm.set(Register::Eax, 0xB8000u32)?;
    /// asm.set(mem(Register::Eax, 0).sized(OperandSize::Word), 0x0F41u32)?;
    /// assert_eq!(
    ///     asm.finish().listing(),
    ///     "    mov eax, 0xB8000\n    mov word ptr [eax], 0xF41\n"
    /// );
    /// # Ok::<(), asm_fluent::AsmError>(())
    /// ```
    pub fn set(
        &mut self,
        destination: impl Into<Arg>,
        source: impl Into<Arg>,
    ) -> Result<&mut Self, AsmError> {
        self.binary(Mnemonic::Mov, destination.into(), source.into())
    }

    /// `mov byte ptr [address], value`.
    pub fn set_byte(&mut self, address: u32, value: u8) -> Result<&mut Self, AsmError> {
        self.append(Statement::Instruction(byte_store(address, value)))
    }

    /// `xchg destination, source`.
    pub fn exchange(
        &mut self,
        destination: impl Into<Arg>,
        source: impl Into<Arg>,
    ) -> Result<&mut Self, AsmError> {
        self.binary(Mnemonic::Xchg, destination.into(), source.into())
    }

    // ── Arithmetic and logic ────────────────────────────────────────────

    /// `add destination, source`.
    pub fn add(
        &mut self,
        destination: impl Into<Arg>,
        source: impl Into<Arg>,
    ) -> Result<&mut Self, AsmError> {
        self.binary(Mnemonic::Add, destination.into(), source.into())
    }

    /// `adc destination, source`.
    pub fn add_with_carry(
        &mut self,
        destination: impl Into<Arg>,
        source: impl Into<Arg>,
    ) -> Result<&mut Self, AsmError> {
        self.binary(Mnemonic::Adc, destination.into(), source.into())
    }

    /// `sub destination, source`.
    pub fn sub(
        &mut self,
        destination: impl Into<Arg>,
        source: impl Into<Arg>,
    ) -> Result<&mut Self, AsmError> {
        self.binary(Mnemonic::Sub, destination.into(), source.into())
    }

    /// `sbb destination, source`.
    pub fn sub_with_carry(
        &mut self,
        destination: impl Into<Arg>,
        source: impl Into<Arg>,
    ) -> Result<&mut Self, AsmError> {
        self.binary(Mnemonic::Sbb, destination.into(), source.into())
    }

    /// `and destination, source`.
    pub fn and(
        &mut self,
        destination: impl Into<Arg>,
        source: impl Into<Arg>,
    ) -> Result<&mut Self, AsmError> {
        self.binary(Mnemonic::And, destination.into(), source.into())
    }

    /// `or destination, source`.
    pub fn or(
        &mut self,
        destination: impl Into<Arg>,
        source: impl Into<Arg>,
    ) -> Result<&mut Self, AsmError> {
        self.binary(Mnemonic::Or, destination.into(), source.into())
    }

    /// `xor destination, source`.
    pub fn xor(
        &mut self,
        destination: impl Into<Arg>,
        source: impl Into<Arg>,
    ) -> Result<&mut Self, AsmError> {
        self.binary(Mnemonic::Xor, destination.into(), source.into())
    }

    /// `cmp destination, source`.
    pub fn compare(
        &mut self,
        destination: impl Into<Arg>,
        source: impl Into<Arg>,
    ) -> Result<&mut Self, AsmError> {
        self.binary(Mnemonic::Cmp, destination.into(), source.into())
    }

    /// `test destination, source`.
    pub fn test(
        &mut self,
        destination: impl Into<Arg>,
        source: impl Into<Arg>,
    ) -> Result<&mut Self, AsmError> {
        self.binary(Mnemonic::Test, destination.into(), source.into())
    }

    /// Two-operand `imul destination, source`.
    pub fn integer_multiply(
        &mut self,
        destination: impl Into<Arg>,
        source: impl Into<Arg>,
    ) -> Result<&mut Self, AsmError> {
        self.binary(Mnemonic::Imul, destination.into(), source.into())
    }

    // ── Shifts and rotates ──────────────────────────────────────────────

    /// `shl destination, count`.
    ///
    /// # Errors
    ///
    /// A register count other than `CL` fails with
    /// [`AsmError::InvalidCountRegister`].
    pub fn shift_left(
        &mut self,
        destination: impl Into<Arg>,
        count: impl Into<Count>,
    ) -> Result<&mut Self, AsmError> {
        self.shift(Mnemonic::Shl, destination.into(), count.into())
    }

    /// `shr destination, count`.
    pub fn shift_right(
        &mut self,
        destination: impl Into<Arg>,
        count: impl Into<Count>,
    ) -> Result<&mut Self, AsmError> {
        self.shift(Mnemonic::Shr, destination.into(), count.into())
    }

    /// `rol destination, count`.
    pub fn rotate_left(
        &mut self,
        destination: impl Into<Arg>,
        count: impl Into<Count>,
    ) -> Result<&mut Self, AsmError> {
        self.shift(Mnemonic::Rol, destination.into(), count.into())
    }

    /// `ror destination, count`.
    pub fn rotate_right(
        &mut self,
        destination: impl Into<Arg>,
        count: impl Into<Count>,
    ) -> Result<&mut Self, AsmError> {
        self.shift(Mnemonic::Ror, destination.into(), count.into())
    }

    // ── Single operand ──────────────────────────────────────────────────

    /// `inc operand`.
    pub fn increment(&mut self, operand: impl Into<Arg>) -> Result<&mut Self, AsmError> {
        self.unary(Mnemonic::Inc, operand.into())
    }

    /// `dec operand`.
    pub fn decrement(&mut self, operand: impl Into<Arg>) -> Result<&mut Self, AsmError> {
        self.unary(Mnemonic::Dec, operand.into())
    }

    /// `neg operand`.
    pub fn negate(&mut self, operand: impl Into<Arg>) -> Result<&mut Self, AsmError> {
        self.unary(Mnemonic::Neg, operand.into())
    }

    /// `not operand`.
    pub fn not(&mut self, operand: impl Into<Arg>) -> Result<&mut Self, AsmError> {
        self.unary(Mnemonic::Not, operand.into())
    }

    /// `mul operand`: unsigned multiply of the accumulator.
    pub fn multiply(&mut self, operand: impl Into<Arg>) -> Result<&mut Self, AsmError> {
        self.unary(Mnemonic::Mul, operand.into())
    }

    /// `div operand`: unsigned divide of the accumulator.
    pub fn divide(&mut self, operand: impl Into<Arg>) -> Result<&mut Self, AsmError> {
        self.unary(Mnemonic::Div, operand.into())
    }

    /// `idiv operand`: signed divide of the accumulator.
    pub fn integer_divide(&mut self, operand: impl Into<Arg>) -> Result<&mut Self, AsmError> {
        self.unary(Mnemonic::Idiv, operand.into())
    }

    /// `push operand`.
    ///
    /// Registers push at their own width; immediates and symbols use the
    /// configured default size unless sized explicitly.
    pub fn push(&mut self, operand: impl Into<Arg>) -> Result<&mut Self, AsmError> {
        self.unary(Mnemonic::Push, operand.into())
    }

    /// `pop operand`.
    pub fn pop(&mut self, operand: impl Into<Arg>) -> Result<&mut Self, AsmError> {
        self.unary(Mnemonic::Pop, operand.into())
    }

    // ── Control transfer ────────────────────────────────────────────────

    /// `jmp label`.
    pub fn jump(&mut self, label: impl Into<Symbol>) -> Result<&mut Self, AsmError> {
        let label: Symbol = label.into();
        self.instruction(Request::new(Mnemonic::Jmp, label))
    }

    /// `j<cc> label`.
    pub fn jump_if(
        &mut self,
        condition: Condition,
        label: impl Into<Symbol>,
    ) -> Result<&mut Self, AsmError> {
        let label: Symbol = label.into();
        self.instruction(Request::new(Mnemonic::Jcc(condition), label))
    }

    /// `call target`: a label or a 32/64-bit register (direct or indirect).
    ///
    /// # Errors
    ///
    /// Returns [`AsmError::InvalidOperands`] for immediates and for
    /// registers narrower than 32 bits.
    pub fn call(&mut self, target: impl Into<Arg>) -> Result<&mut Self, AsmError> {
        self.address_operand(Mnemonic::Call, target.into())
    }

    /// `ret`.
    pub fn ret(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Ret)
    }

    /// `iret`.
    pub fn interrupt_return(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Iret)
    }

    // ── Port I/O ────────────────────────────────────────────────────────

    /// `out dx, value`.
    pub fn write_to_port_dx(&mut self, value: Register) -> Result<&mut Self, AsmError> {
        self.instruction(Request::new(Mnemonic::Out, Register::Dx).source(value))
    }

    /// `in value, dx`.
    pub fn read_from_port_dx(&mut self, value: Register) -> Result<&mut Self, AsmError> {
        self.instruction(Request::new(Mnemonic::In, value).source(Register::Dx))
    }

    // ── System ──────────────────────────────────────────────────────────

    /// `lgdt [operand]`: the operand is usually an indirect 32-bit register
    /// or a label.
    pub fn load_gdt(&mut self, operand: impl Into<Arg>) -> Result<&mut Self, AsmError> {
        self.address_operand(Mnemonic::Lgdt, operand.into())
    }

    /// `lidt [operand]`.
    pub fn load_idt(&mut self, operand: impl Into<Arg>) -> Result<&mut Self, AsmError> {
        self.address_operand(Mnemonic::Lidt, operand.into())
    }

    /// `cli`.
    pub fn clear_interrupt_flag(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Cli)
    }

    /// `cli`: alias of [`clear_interrupt_flag`](Self::clear_interrupt_flag).
    pub fn disable_interrupts(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Cli)
    }

    /// `sti`.
    pub fn enable_interrupts(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Sti)
    }

    /// `cld`.
    pub fn clear_direction_flag(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Cld)
    }

    /// `hlt`.
    pub fn halt(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Hlt)
    }

    /// `int3`.
    pub fn int3(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Int3)
    }

    /// `nop`.
    pub fn noop(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Nop)
    }

    /// `pushad`.
    pub fn push_all_registers(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Pushad)
    }

    /// `popad`.
    pub fn pop_all_registers(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Popad)
    }

    /// `stosb`.
    pub fn store_byte_in_string(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Stosb)
    }

    /// `stosw`.
    pub fn store_word_in_string(&mut self) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::Stosw)
    }

    /// Sign-extend the accumulator of the given width
    /// (`cbw`, `cwd`, `cdq`, `cqo`).
    pub fn sign_extend_ax(&mut self, size: OperandSize) -> Result<&mut Self, AsmError> {
        self.implicit(Mnemonic::SignExtendAx(size))
    }

    // ── Non-instruction statements ──────────────────────────────────────

    /// Define a label at the current position.
    pub fn label(&mut self, name: &str) -> Result<&mut Self, AsmError> {
        self.append(Statement::Label(String::from(name)))
    }

    /// Add a comment line.
    pub fn comment(&mut self, text: &str) -> Result<&mut Self, AsmError> {
        self.append(Statement::Comment(String::from(text)))
    }

    /// Define a named constant (`name equ value`).
    pub fn constant(&mut self, name: &str, value: &str) -> Result<&mut Self, AsmError> {
        self.append(Statement::Const(ConstDef {
            name: String::from(name),
            value: String::from(value),
        }))
    }

    /// Pass assembler text through unchanged.
    pub fn literal(&mut self, code: &str) -> Result<&mut Self, AsmError> {
        self.append(Statement::Literal(String::from(code)))
    }

    /// Declare a 32-bit data member.
    pub fn data_member(&mut self, name: &str, value: u32) -> Result<&mut Self, AsmError> {
        self.declare(DataMember {
            name: String::from(name),
            value: DataValue::Integer(value),
            element: OperandSize::Dword,
            count: 1,
        })
    }

    /// Declare a NUL-terminated string data member.
    pub fn data_string(&mut self, name: &str, value: &str) -> Result<&mut Self, AsmError> {
        self.declare(DataMember {
            name: String::from(name),
            value: DataValue::Str(String::from(value)),
            element: OperandSize::Byte,
            count: 1,
        })
    }

    /// Declare `count` repeated elements of width `element`.
    pub fn data_array(
        &mut self,
        name: &str,
        count: u32,
        element: OperandSize,
        value: u32,
    ) -> Result<&mut Self, AsmError> {
        self.declare(DataMember {
            name: String::from(name),
            value: DataValue::Integer(value),
            element,
            count,
        })
    }

    // ── Adapters ────────────────────────────────────────────────────────

    /// Two-operand sized form. Immediate and symbol destinations take the
    /// direct source register's width, else the default size.
    fn binary(&mut self, kind: Mnemonic, destination: Arg, source: Arg) -> Result<&mut Self, AsmError> {
        let size = destination
            .size_hint()
            .or(source.size_hint())
            .or_else(|| match (destination.value(), source.value()) {
                (Value::Register(_), _) => None,
                (_, Value::Register(r)) if !source.is_indirect() => Some(r.size()),
                _ => Some(self.default_size),
            });
        self.instruction(Request::new(kind, destination).source(source).size(size))
    }

    /// Single-operand sized form.
    fn unary(&mut self, kind: Mnemonic, operand: Arg) -> Result<&mut Self, AsmError> {
        let size = operand.size_hint().or_else(|| match operand.value() {
            Value::Register(_) => None,
            _ => Some(self.default_size),
        });
        self.instruction(Request::new(kind, operand).size(size))
    }

    /// Shift/rotate. The count register is checked before anything else.
    fn shift(&mut self, kind: Mnemonic, destination: Arg, count: Count) -> Result<&mut Self, AsmError> {
        let (source, check) = count.into_source(kind).map_err(rejected)?;
        let size = destination.size_hint().or_else(|| match destination.value() {
            Value::Register(_) => None,
            _ => Some(self.default_size),
        });
        self.instruction(
            Request::new(kind, destination)
                .source(source)
                .size(size)
                .size_check(check),
        )
    }

    /// Control-transfer and descriptor-table operands: a label, or a
    /// register wide enough to hold an address.
    fn address_operand(&mut self, kind: Mnemonic, operand: Arg) -> Result<&mut Self, AsmError> {
        match operand.value() {
            Value::Symbol(_) => {}
            Value::Register(r) if r.is_address_sized() => {}
            other => {
                return Err(rejected(AsmError::InvalidOperands {
                    kind,
                    detail: format!("expected a label or a 32/64-bit register, found {}", other),
                }))
            }
        }
        self.instruction(Request::new(kind, operand))
    }

    fn implicit(&mut self, kind: Mnemonic) -> Result<&mut Self, AsmError> {
        self.append(Statement::Implicit(kind))
    }

    fn append(&mut self, statement: Statement) -> Result<&mut Self, AsmError> {
        if self.statement_count >= self.limits.max_statements {
            log::warn!(
                "statement limit of {} reached, dropping `{}`",
                self.limits.max_statements,
                statement
            );
            return Err(AsmError::ResourceLimitExceeded {
                resource: String::from("statements"),
                limit: self.limits.max_statements,
            });
        }
        log::trace!("append #{}: {}", self.statement_count, statement);
        self.statement_count += 1;
        self.sink.append(statement);
        Ok(self)
    }

    fn declare(&mut self, member: DataMember) -> Result<&mut Self, AsmError> {
        if self.data_member_count >= self.limits.max_data_members {
            log::warn!(
                "data member limit of {} reached, dropping `{}`",
                self.limits.max_data_members,
                member.name
            );
            return Err(AsmError::ResourceLimitExceeded {
                resource: String::from("data members"),
                limit: self.limits.max_data_members,
            });
        }
        log::trace!("data: {}", member);
        self.data_member_count += 1;
        self.sink.define_data(member);
        Ok(self)
    }
}

fn rejected(err: AsmError) -> AsmError {
    log::debug!("rejected: {}", err);
    err
}
