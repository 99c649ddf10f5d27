//! Intermediate representation types for the instruction stream.
//!
//! These types describe normalized operands and instruction descriptors.
//! They are produced by the resolver and handed to an instruction sink for
//! later encoding by an external assembler.

use alloc::string::String;
use core::fmt;

/// x86 register.
///
/// Covers the general-purpose registers for 8-bit through 64-bit widths
/// and the segment registers. Each variant encodes its own width
/// (see [`Register::size_bits`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Register {
    // -- 64-bit general-purpose registers (RAX–R15) --
    /// RAX: 64-bit accumulator.
    Rax,
    /// RCX: 64-bit counter.
    Rcx,
    /// RDX: 64-bit data.
    Rdx,
    /// RBX: 64-bit base.
    Rbx,
    /// RSP: 64-bit stack pointer.
    Rsp,
    /// RBP: 64-bit frame pointer.
    Rbp,
    /// RSI: 64-bit source index.
    Rsi,
    /// RDI: 64-bit destination index.
    Rdi,
    /// R8–R15: extended 64-bit registers.
    R8,
    /// Extended 64-bit register.
    R9,
    /// Extended 64-bit register.
    R10,
    /// Extended 64-bit register.
    R11,
    /// Extended 64-bit register.
    R12,
    /// Extended 64-bit register.
    R13,
    /// Extended 64-bit register.
    R14,
    /// Extended 64-bit register.
    R15,

    // -- 32-bit general-purpose registers --
    /// EAX: 32-bit accumulator.
    Eax,
    /// ECX: 32-bit counter.
    Ecx,
    /// EDX: 32-bit data.
    Edx,
    /// EBX: 32-bit base.
    Ebx,
    /// ESP: 32-bit stack pointer.
    Esp,
    /// EBP: 32-bit frame pointer.
    Ebp,
    /// ESI: 32-bit source index.
    Esi,
    /// EDI: 32-bit destination index.
    Edi,
    /// Low 32 bits of R8.
    R8d,
    /// Low 32 bits of R9.
    R9d,
    /// Low 32 bits of R10.
    R10d,
    /// Low 32 bits of R11.
    R11d,
    /// Low 32 bits of R12.
    R12d,
    /// Low 32 bits of R13.
    R13d,
    /// Low 32 bits of R14.
    R14d,
    /// Low 32 bits of R15.
    R15d,

    // -- 16-bit general-purpose registers --
    /// AX: 16-bit accumulator.
    Ax,
    /// CX: 16-bit counter.
    Cx,
    /// DX: 16-bit data (also the port register for `in`/`out`).
    Dx,
    /// BX: 16-bit base.
    Bx,
    /// SP: 16-bit stack pointer.
    Sp,
    /// BP: 16-bit frame pointer.
    Bp,
    /// SI: 16-bit source index.
    Si,
    /// DI: 16-bit destination index.
    Di,
    /// Low 16 bits of R8.
    R8w,
    /// Low 16 bits of R9.
    R9w,
    /// Low 16 bits of R10.
    R10w,
    /// Low 16 bits of R11.
    R11w,
    /// Low 16 bits of R12.
    R12w,
    /// Low 16 bits of R13.
    R13w,
    /// Low 16 bits of R14.
    R14w,
    /// Low 16 bits of R15.
    R15w,

    // -- 8-bit general-purpose registers --
    /// AL: low byte of AX.
    Al,
    /// CL: low byte of CX (the variable shift count register).
    Cl,
    /// DL: low byte of DX.
    Dl,
    /// BL: low byte of BX.
    Bl,
    /// SPL: low byte of SP.
    Spl,
    /// BPL: low byte of BP.
    Bpl,
    /// SIL: low byte of SI.
    Sil,
    /// DIL: low byte of DI.
    Dil,
    /// AH: high byte of AX.
    Ah,
    /// CH: high byte of CX.
    Ch,
    /// DH: high byte of DX.
    Dh,
    /// BH: high byte of BX.
    Bh,
    /// Low byte of R8.
    R8b,
    /// Low byte of R9.
    R9b,
    /// Low byte of R10.
    R10b,
    /// Low byte of R11.
    R11b,
    /// Low byte of R12.
    R12b,
    /// Low byte of R13.
    R13b,
    /// Low byte of R14.
    R14b,
    /// Low byte of R15.
    R15b,

    // -- Segment registers --
    /// Code segment.
    Cs,
    /// Data segment.
    Ds,
    /// Extra segment.
    Es,
    /// FS segment.
    Fs,
    /// GS segment.
    Gs,
    /// Stack segment.
    Ss,
}

impl Register {
    /// Size of the register in bits.
    pub fn size_bits(self) -> u16 {
        self.size().bits()
    }

    /// Width of the register as an operand size.
    pub fn size(self) -> OperandSize {
        use Register::*;
        match self {
            Rax | Rcx | Rdx | Rbx | Rsp | Rbp | Rsi | Rdi | R8 | R9 | R10 | R11 | R12 | R13
            | R14 | R15 => OperandSize::Qword,
            Eax | Ecx | Edx | Ebx | Esp | Ebp | Esi | Edi | R8d | R9d | R10d | R11d | R12d
            | R13d | R14d | R15d => OperandSize::Dword,
            Ax | Cx | Dx | Bx | Sp | Bp | Si | Di | R8w | R9w | R10w | R11w | R12w | R13w
            | R14w | R15w => OperandSize::Word,
            Al | Cl | Dl | Bl | Spl | Bpl | Sil | Dil | Ah | Ch | Dh | Bh | R8b | R9b | R10b
            | R11b | R12b | R13b | R14b | R15b => OperandSize::Byte,
            Cs | Ds | Es | Fs | Gs | Ss => OperandSize::Word,
        }
    }

    /// Whether this is a segment register.
    #[must_use]
    pub fn is_segment(self) -> bool {
        use Register::*;
        matches!(self, Cs | Ds | Es | Fs | Gs | Ss)
    }

    /// Whether this register can hold a near code or data address
    /// (32-bit or 64-bit general-purpose register).
    #[must_use]
    pub fn is_address_sized(self) -> bool {
        !self.is_segment() && matches!(self.size(), OperandSize::Dword | OperandSize::Qword)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Zero-allocation: write Debug chars lowercased directly to the formatter.
        use fmt::Write as _;
        struct LowerWriter<'a, 'b>(&'a mut fmt::Formatter<'b>);
        impl fmt::Write for LowerWriter<'_, '_> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                for c in s.chars() {
                    self.0.write_char(c.to_ascii_lowercase())?;
                }
                Ok(())
            }
        }
        write!(LowerWriter(f), "{:?}", self)
    }
}

/// Effective operand width of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperandSize {
    /// 8-bit (`byte ptr`).
    Byte,
    /// 16-bit (`word ptr`).
    Word,
    /// 32-bit (`dword ptr`).
    Dword,
    /// 64-bit (`qword ptr`).
    Qword,
}

impl OperandSize {
    /// Return the operand size in bits.
    pub fn bits(self) -> u16 {
        match self {
            OperandSize::Byte => 8,
            OperandSize::Word => 16,
            OperandSize::Dword => 32,
            OperandSize::Qword => 64,
        }
    }

    /// Look up the operand size for a bit-width.
    #[must_use]
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(OperandSize::Byte),
            16 => Some(OperandSize::Word),
            32 => Some(OperandSize::Dword),
            64 => Some(OperandSize::Qword),
            _ => None,
        }
    }

    /// NASM data directive for one element of this width (`db`, `dw`, …).
    pub(crate) fn data_directive(self) -> &'static str {
        match self {
            OperandSize::Byte => "db",
            OperandSize::Word => "dw",
            OperandSize::Dword => "dd",
            OperandSize::Qword => "dq",
        }
    }
}

impl fmt::Display for OperandSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandSize::Byte => write!(f, "byte"),
            OperandSize::Word => write!(f, "word"),
            OperandSize::Dword => write!(f, "dword"),
            OperandSize::Qword => write!(f, "qword"),
        }
    }
}

// The terms "above" and "below" refer to unsigned comparisons (CF);
// "greater" and "less" refer to signed comparisons (SF and OF).

/// Condition code for conditional jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    /// Overflow (`jo`).
    Overflow,
    /// No overflow (`jno`).
    NoOverflow,
    /// Below, unsigned `<` (`jb`).
    Below,
    /// Above or equal, unsigned `>=` (`jae`).
    AboveOrEqual,
    /// Equal / zero (`je`).
    Equal,
    /// Not equal / not zero (`jne`).
    NotEqual,
    /// Below or equal, unsigned `<=` (`jbe`).
    BelowOrEqual,
    /// Above, unsigned `>` (`ja`).
    Above,
    /// Sign set (`js`).
    Sign,
    /// Sign clear (`jns`).
    NotSign,
    /// Parity even (`jp`).
    Parity,
    /// Parity odd (`jnp`).
    NotParity,
    /// Less, signed `<` (`jl`).
    Less,
    /// Greater or equal, signed `>=` (`jge`).
    GreaterOrEqual,
    /// Less or equal, signed `<=` (`jle`).
    LessOrEqual,
    /// Greater, signed `>` (`jg`).
    Greater,
}

impl Condition {
    /// The condition that holds exactly when `self` does not.
    #[must_use]
    pub fn invert(self) -> Self {
        use Condition::*;
        match self {
            Overflow => NoOverflow,
            NoOverflow => Overflow,
            Below => AboveOrEqual,
            AboveOrEqual => Below,
            Equal => NotEqual,
            NotEqual => Equal,
            BelowOrEqual => Above,
            Above => BelowOrEqual,
            Sign => NotSign,
            NotSign => Sign,
            Parity => NotParity,
            NotParity => Parity,
            Less => GreaterOrEqual,
            GreaterOrEqual => Less,
            LessOrEqual => Greater,
            Greater => LessOrEqual,
        }
    }

    /// Mnemonic suffix (`e` in `je`).
    pub fn suffix(self) -> &'static str {
        use Condition::*;
        match self {
            Overflow => "o",
            NoOverflow => "no",
            Below => "b",
            AboveOrEqual => "ae",
            Equal => "e",
            NotEqual => "ne",
            BelowOrEqual => "be",
            Above => "a",
            Sign => "s",
            NotSign => "ns",
            Parity => "p",
            NotParity => "np",
            Less => "l",
            GreaterOrEqual => "ge",
            LessOrEqual => "le",
            Greater => "g",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Instruction kind.
///
/// A closed set: every instruction the builder can produce has a variant
/// here. The operand slots each kind requires are given by
/// [`Mnemonic::form`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mnemonic {
    // -- Data movement --
    /// Copy source into destination.
    Mov,
    /// Swap destination and source.
    Xchg,

    // -- Arithmetic and logic --
    /// Integer add.
    Add,
    /// Add with carry.
    Adc,
    /// Integer subtract.
    Sub,
    /// Subtract with borrow.
    Sbb,
    /// Bitwise and.
    And,
    /// Bitwise or.
    Or,
    /// Bitwise exclusive or.
    Xor,
    /// Compare (subtract, flags only).
    Cmp,
    /// Test (and, flags only).
    Test,
    /// Signed multiply, two-operand form.
    Imul,

    // -- Shifts and rotates --
    /// Shift left.
    Shl,
    /// Logical shift right.
    Shr,
    /// Rotate left.
    Rol,
    /// Rotate right.
    Ror,

    // -- Single operand --
    /// Increment.
    Inc,
    /// Decrement.
    Dec,
    /// Two's complement negate.
    Neg,
    /// One's complement.
    Not,
    /// Unsigned multiply of the accumulator.
    Mul,
    /// Unsigned divide of the accumulator.
    Div,
    /// Signed divide of the accumulator.
    Idiv,
    /// Push onto the stack.
    Push,
    /// Pop from the stack.
    Pop,

    // -- Control transfer --
    /// Unconditional jump.
    Jmp,
    /// Conditional jump.
    Jcc(Condition),
    /// Near call.
    Call,
    /// Near return.
    Ret,
    /// Interrupt return.
    Iret,

    // -- Port I/O --
    /// Read from the port in DX.
    In,
    /// Write to the port in DX.
    Out,

    // -- System --
    /// Load the global descriptor table register.
    Lgdt,
    /// Load the interrupt descriptor table register.
    Lidt,
    /// Clear the interrupt flag.
    Cli,
    /// Set the interrupt flag.
    Sti,
    /// Clear the direction flag.
    Cld,
    /// Halt until the next interrupt.
    Hlt,
    /// Breakpoint trap.
    Int3,
    /// No operation.
    Nop,
    /// Push all general-purpose registers.
    Pushad,
    /// Pop all general-purpose registers.
    Popad,
    /// Store AL at [EDI] and advance.
    Stosb,
    /// Store AX at [EDI] and advance.
    Stosw,
    /// Sign-extend the accumulator of the given width into the next wider
    /// register (`cbw`, `cwd`, `cdq` or `cqo`).
    SignExtendAx(OperandSize),
}

impl Mnemonic {
    /// Name of the sign-extension instruction for an accumulator width.
    fn sign_extend_name(size: OperandSize) -> &'static str {
        match size {
            OperandSize::Byte => "cbw",
            OperandSize::Word => "cwd",
            OperandSize::Dword => "cdq",
            OperandSize::Qword => "cqo",
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Mnemonic::*;
        let name = match self {
            Jcc(cond) => return write!(f, "j{}", cond),
            SignExtendAx(size) => return f.write_str(Self::sign_extend_name(*size)),
            Mov => "mov",
            Xchg => "xchg",
            Add => "add",
            Adc => "adc",
            Sub => "sub",
            Sbb => "sbb",
            And => "and",
            Or => "or",
            Xor => "xor",
            Cmp => "cmp",
            Test => "test",
            Imul => "imul",
            Shl => "shl",
            Shr => "shr",
            Rol => "rol",
            Ror => "ror",
            Inc => "inc",
            Dec => "dec",
            Neg => "neg",
            Not => "not",
            Mul => "mul",
            Div => "div",
            Idiv => "idiv",
            Push => "push",
            Pop => "pop",
            Jmp => "jmp",
            Call => "call",
            Ret => "ret",
            Iret => "iret",
            In => "in",
            Out => "out",
            Lgdt => "lgdt",
            Lidt => "lidt",
            Cli => "cli",
            Sti => "sti",
            Cld => "cld",
            Hlt => "hlt",
            Int3 => "int3",
            Nop => "nop",
            Pushad => "pushad",
            Popad => "popad",
            Stosb => "stosb",
            Stosw => "stosw",
        };
        f.write_str(name)
    }
}

/// A symbolic reference (label or data member) resolved later by the
/// assembler. The name is not validated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symbol(String);

impl Symbol {
    /// Create a reference to `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    /// The referenced name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol(String::from(name))
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an operand names: a register, an immediate, or a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// A register.
    Register(Register),
    /// An unsigned 32-bit immediate (or absolute address when indirect).
    Immediate(u32),
    /// A label or data member.
    Symbol(Symbol),
}

impl Value {
    /// The register, if this value is one.
    #[must_use]
    pub fn register(&self) -> Option<Register> {
        match self {
            Value::Register(r) => Some(*r),
            _ => None,
        }
    }
}

impl From<Register> for Value {
    fn from(r: Register) -> Self {
        Value::Register(r)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Immediate(v)
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

impl From<&str> for Value {
    fn from(name: &str) -> Self {
        Value::Symbol(Symbol::from(name))
    }
}

impl From<String> for Value {
    fn from(name: String) -> Self {
        Value::Symbol(Symbol::from(name))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Register(r) => write!(f, "{}", r),
            Value::Immediate(v) => write!(f, "0x{:X}", v),
            Value::Symbol(s) => write!(f, "{}", s),
        }
    }
}

/// How an operand is accessed.
///
/// An indirect operand names the memory at `value + displacement`. A
/// displacement of zero is the plain `[value]` form; there is no separate
/// "displacement present" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    /// The operand's own value.
    #[default]
    Direct,
    /// The memory addressed by the operand plus a byte displacement.
    Indirect {
        /// Signed byte offset added to the base.
        displacement: i32,
    },
}

impl Access {
    /// Whether this is an indirect access.
    #[must_use]
    pub fn is_indirect(self) -> bool {
        matches!(self, Access::Indirect { .. })
    }

    /// The displacement, or `None` for direct access and for a zero offset.
    #[must_use]
    pub fn displacement(self) -> Option<i32> {
        match self {
            Access::Indirect { displacement } if displacement != 0 => Some(displacement),
            _ => None,
        }
    }
}

/// A normalized operand.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operand {
    /// What the operand names.
    pub value: Value,
    /// How it is accessed.
    pub access: Access,
}

impl Operand {
    /// A direct operand.
    pub fn direct(value: impl Into<Value>) -> Self {
        Operand {
            value: value.into(),
            access: Access::Direct,
        }
    }

    /// An indirect operand at `value + displacement`.
    pub fn indirect(value: impl Into<Value>, displacement: i32) -> Self {
        Operand {
            value: value.into(),
            access: Access::Indirect { displacement },
        }
    }

    /// Whether the operand refers to memory.
    #[must_use]
    pub fn is_indirect(&self) -> bool {
        self.access.is_indirect()
    }

    /// Non-zero displacement of an indirect operand.
    #[must_use]
    pub fn displacement(&self) -> Option<i32> {
        self.access.displacement()
    }

    /// The register of a direct register operand.
    #[must_use]
    pub fn direct_register(&self) -> Option<Register> {
        match self.access {
            Access::Direct => self.value.register(),
            Access::Indirect { .. } => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.access {
            Access::Direct => write!(f, "{}", self.value),
            Access::Indirect { displacement } => {
                write!(f, "[{}", self.value)?;
                if displacement > 0 {
                    write!(f, "+0x{:X}", displacement)?;
                } else if displacement < 0 {
                    write!(f, "-0x{:X}", displacement.unsigned_abs())?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A resolved, emission-ready instruction.
///
/// Every descriptor produced by the resolver has at most one indirect
/// operand and carries a size whenever its instruction form needs one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstructionDescriptor {
    /// Instruction kind.
    pub kind: Mnemonic,
    /// Destination (or sole) operand.
    pub destination: Operand,
    /// Source operand for two-operand forms.
    pub source: Option<Operand>,
    /// Effective operand width.
    pub size: Option<OperandSize>,
}

impl fmt::Display for InstructionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.kind)?;
        write_sized(f, &self.destination, self.size)?;
        if let Some(src) = &self.source {
            write!(f, ", ")?;
            write_sized(f, src, self.size)?;
        }
        Ok(())
    }
}

/// Write an operand, prefixing memory references with their width.
fn write_sized(
    f: &mut fmt::Formatter<'_>,
    op: &Operand,
    size: Option<OperandSize>,
) -> fmt::Result {
    match size {
        Some(sz) if op.is_indirect() => write!(f, "{} ptr {}", sz, op),
        _ => write!(f, "{}", op),
    }
}

/// A named constant definition (`name equ value`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstDef {
    /// Constant name.
    pub name: String,
    /// Value text, passed through to the assembler unchanged.
    pub value: String,
}

/// Initial value of a data member.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataValue {
    /// An integer, stored with the member's element width.
    Integer(u32),
    /// A byte string, NUL-terminated in the output.
    Str(String),
}

/// A named data member declared alongside the code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataMember {
    /// Member name (referenced from code as a [`Symbol`]).
    pub name: String,
    /// Initial value of each element.
    pub value: DataValue,
    /// Width of one element.
    pub element: OperandSize,
    /// Number of repeated elements (1 for a scalar).
    pub count: u32,
}

impl fmt::Display for DataMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.name)?;
        if self.count != 1 {
            write!(f, "times {} ", self.count)?;
        }
        write!(f, "{} ", self.element.data_directive())?;
        match &self.value {
            DataValue::Integer(v) => write!(f, "0x{:X}", v),
            DataValue::Str(s) => {
                write_backquoted(f, s)?;
                f.write_str(", 0")
            }
        }
    }
}

/// NASM backquoted string: printable ASCII as is (backquote and backslash
/// escaped), everything else as
/// `\xHH` escapes of its UTF-8 bytes.
fn write_backquoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    use fmt::Write;

    f.write_char('`')?;
    for &b in s.as_bytes() {
        match b {
            b'`' | b'\\' => {
                f.write_char('\\')?;
                f.write_char(char::from(b))?;
            }
            0x20..=0x7E => f.write_char(char::from(b))?,
            _ => write!(f, "\\x{:02X}", b)?,
        }
    }
    f.write_char('`')
}

/// A statement in the instruction stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Statement {
    /// A resolved instruction with operands.
    Instruction(InstructionDescriptor),
    /// An instruction without explicit operands.
    Implicit(Mnemonic),
    /// A label definition.
    Label(String),
    /// A comment line.
    Comment(String),
    /// A constant definition.
    Const(ConstDef),
    /// Verbatim assembler text.
    Literal(String),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Instruction(instr) => write!(f, "{}", instr),
            Statement::Implicit(kind) => write!(f, "{}", kind),
            Statement::Label(name) => write!(f, "{}:", name),
            Statement::Comment(text) => write!(f, "; {}", text),
            Statement::Const(def) => write!(f, "{} equ {}", def.name, def.value),
            Statement::Literal(code) => f.write_str(code),
        }
    }
}
