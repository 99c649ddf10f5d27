//! Operand resolver: normalization and validation of caller operands.
//!
//! Every builder method funnels into [`resolve`], which turns a [`Request`]
//! (instruction kind plus raw operands) into an [`InstructionDescriptor`]:
//!
//! 1. **Normalize** each operand: a displacement implies indirect access,
//!    and a zero displacement is the plain `[base]` form.
//! 2. **Exclude** memory-to-memory pairs.
//! 3. **Size** the operation: explicit size, else the destination
//!    register's width; indirect destinations must be sized explicitly.
//!    Two direct registers must agree on width unless the check is skipped.
//! 4. **Construct** the descriptor.
//!
//! Nothing is returned unless all checks pass, so callers can append the
//! result without further validation.

use alloc::string::String;

use crate::error::AsmError;
use crate::ir::{
    Access, InstructionDescriptor, Mnemonic, Operand, OperandSize, Register, Symbol, Value,
};

/// Operand slots an instruction kind takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// One operand, no width (`jmp label`, `lgdt [eax]`).
    Destination,
    /// One operand with a width (`inc eax`, `push dword ptr [ebp+8]`).
    DestinationSized,
    /// Two operands, no width (`out dx, al`).
    DestinationSource,
    /// Two operands with a width (`mov`, `add`, `shl`, …).
    DestinationSourceSized,
}

impl Form {
    /// Whether the form takes a source operand.
    #[must_use]
    pub fn has_source(self) -> bool {
        matches!(self, Form::DestinationSource | Form::DestinationSourceSized)
    }

    /// Whether the form carries an operand width.
    #[must_use]
    pub fn is_sized(self) -> bool {
        matches!(self, Form::DestinationSized | Form::DestinationSourceSized)
    }
}

impl Mnemonic {
    /// Operand slots this instruction kind takes, or `None` for
    /// instructions without explicit operands (`ret`, `cli`, …).
    #[must_use]
    pub fn form(self) -> Option<Form> {
        use Mnemonic::*;
        match self {
            Mov | Xchg | Add | Adc | Sub | Sbb | And | Or | Xor | Cmp | Test | Imul | Shl | Shr
            | Rol | Ror => Some(Form::DestinationSourceSized),
            Inc | Dec | Neg | Not | Mul | Div | Idiv | Push | Pop => Some(Form::DestinationSized),
            In | Out => Some(Form::DestinationSource),
            Jmp | Jcc(_) | Call | Lgdt | Lidt => Some(Form::Destination),
            Ret | Iret | Cli | Sti | Cld | Hlt | Int3 | Nop | Pushad | Popad | Stosb | Stosw
            | SignExtendAx(_) => None,
        }
    }

    /// Whether this is a shift or rotate, whose source is a bit count.
    #[must_use]
    pub fn is_shift(self) -> bool {
        matches!(self, Mnemonic::Shl | Mnemonic::Shr | Mnemonic::Rol | Mnemonic::Ror)
    }
}

/// Whether two direct registers must have the same width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeCheck {
    /// Reject register pairs of different widths.
    #[default]
    Enforce,
    /// Accept any register pair (shift counts in `CL`).
    Skip,
}

/// A caller-supplied operand before normalization.
///
/// Built from a register, immediate or symbol and refined with
/// [`indirect`](Arg::indirect), [`displacement`](Arg::displacement) and
/// [`sized`](Arg::sized).
///
/// # Examples
///
/// ```
/// use asm_fluent::{Arg, Register};
///
/// // [ebp-8]
/// let local = Arg::from(Register::Ebp).displacement(-8);
/// assert!(local.is_indirect());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    value: Value,
    indirect: bool,
    displacement: Option<i32>,
    size: Option<OperandSize>,
}

impl Arg {
    /// A direct operand.
    pub fn new(value: impl Into<Value>) -> Self {
        Arg {
            value: value.into(),
            indirect: false,
            displacement: None,
            size: None,
        }
    }

    /// Access the memory this operand addresses.
    #[must_use]
    pub fn indirect(mut self) -> Self {
        self.indirect = true;
        self
    }

    /// Add a byte displacement. Implies [`indirect`](Arg::indirect).
    #[must_use]
    pub fn displacement(mut self, displacement: i32) -> Self {
        self.displacement = Some(displacement);
        self
    }

    /// Give the operation an explicit width (`dword ptr`).
    #[must_use]
    pub fn sized(mut self, size: OperandSize) -> Self {
        self.size = Some(size);
        self
    }

    /// What the operand names.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Explicit width, if one was given.
    #[must_use]
    pub fn size_hint(&self) -> Option<OperandSize> {
        self.size
    }

    /// Whether the operand will be indirect once normalized.
    #[must_use]
    pub fn is_indirect(&self) -> bool {
        self.indirect || self.displacement.is_some()
    }

    /// Normalize into an [`Operand`].
    ///
    /// A displacement forces indirect access; a zero displacement yields
    /// the same operand as a bare indirect reference.
    pub fn normalize(self) -> Operand {
        let access = match (self.indirect, self.displacement) {
            (_, Some(displacement)) => Access::Indirect { displacement },
            (true, None) => Access::Indirect { displacement: 0 },
            (false, None) => Access::Direct,
        };
        Operand {
            value: self.value,
            access,
        }
    }
}

impl From<Register> for Arg {
    fn from(r: Register) -> Self {
        Arg::new(r)
    }
}

impl From<u32> for Arg {
    fn from(v: u32) -> Self {
        Arg::new(v)
    }
}

impl From<Symbol> for Arg {
    fn from(s: Symbol) -> Self {
        Arg::new(s)
    }
}

impl From<&str> for Arg {
    fn from(name: &str) -> Self {
        Arg::new(name)
    }
}

impl From<String> for Arg {
    fn from(name: String) -> Self {
        Arg::new(name)
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::new(value)
    }
}

/// `[base]`: indirect access without displacement.
pub fn deref(base: impl Into<Value>) -> Arg {
    Arg::new(base).indirect()
}

/// `[base + displacement]`.
pub fn mem(base: impl Into<Value>, displacement: i32) -> Arg {
    Arg::new(base).displacement(displacement)
}

/// Shift or rotate count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// Constant bit count.
    Immediate(u8),
    /// Count held in a register; only `CL` is encodable.
    Register(Register),
}

impl From<u8> for Count {
    fn from(n: u8) -> Self {
        Count::Immediate(n)
    }
}

impl From<Register> for Count {
    fn from(r: Register) -> Self {
        Count::Register(r)
    }
}

impl Count {
    /// The source operand for a shift of kind `kind`, with the width check
    /// it needs. A register count other than `CL` is rejected here, before
    /// any operand is normalized.
    pub fn into_source(self, kind: Mnemonic) -> Result<(Arg, SizeCheck), AsmError> {
        match self {
            Count::Immediate(n) => Ok((Arg::from(u32::from(n)), SizeCheck::Enforce)),
            Count::Register(Register::Cl) => Ok((Arg::from(Register::Cl), SizeCheck::Skip)),
            Count::Register(register) => Err(AsmError::InvalidCountRegister { kind, register }),
        }
    }
}

/// Raw input to [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Instruction kind.
    pub kind: Mnemonic,
    /// Destination (or sole) operand.
    pub destination: Arg,
    /// Source operand, for two-operand forms.
    pub source: Option<Arg>,
    /// Explicit operand width.
    pub size: Option<OperandSize>,
    /// Register width policy.
    pub size_check: SizeCheck,
}

impl Request {
    /// A request with only a destination.
    pub fn new(kind: Mnemonic, destination: impl Into<Arg>) -> Self {
        Request {
            kind,
            destination: destination.into(),
            source: None,
            size: None,
            size_check: SizeCheck::Enforce,
        }
    }

    /// Set the source operand.
    #[must_use]
    pub fn source(mut self, source: impl Into<Arg>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set (or clear) the explicit width.
    #[must_use]
    pub fn size(mut self, size: Option<OperandSize>) -> Self {
        self.size = size;
        self
    }

    /// Set the register width policy.
    #[must_use]
    pub fn size_check(mut self, check: SizeCheck) -> Self {
        self.size_check = check;
        self
    }
}

/// Resolve a request into a validated descriptor.
///
/// # Errors
///
/// - [`AsmError::InvalidOperands`] if the kind takes no operands, the
///   source slot does not match its [`Form`], or a shift count is indirect
///   or a symbol.
/// - [`AsmError::InvalidCountRegister`] if a shift count is a register
///   other than `CL`. A `CL` count is exempt from the width check.
/// - [`AsmError::ConflictingIndirection`] if both operands are indirect.
/// - [`AsmError::MissingSize`] if a sized form has no explicit width and
///   none can be inferred.
/// - [`AsmError::SizeMismatch`] if two direct registers differ in width and
///   the check is enforced.
///
/// # Examples
///
/// ```
/// use asm_fluent::{resolve, Mnemonic, OperandSize, Register, Request};
///
/// let instr = resolve(Request::new(Mnemonic::Add, Register::Eax).source(Register::Ebx))?;
/// assert_eq!(instr.size, Some(OperandSize::Dword));
/// # Ok::<(), asm_fluent::AsmError>(())
/// ```
pub fn resolve(request: Request) -> Result<InstructionDescriptor, AsmError> {
    let Request {
        kind,
        destination,
        source,
        size,
        mut size_check,
    } = request;

    let form = kind.form().ok_or_else(|| AsmError::InvalidOperands {
        kind,
        detail: String::from("instruction takes no operands"),
    })?;
    match (form.has_source(), source.is_some()) {
        (true, false) => {
            return Err(AsmError::InvalidOperands {
                kind,
                detail: String::from("missing source operand"),
            })
        }
        (false, true) => {
            return Err(AsmError::InvalidOperands {
                kind,
                detail: String::from("unexpected source operand"),
            })
        }
        _ => {}
    }

    if kind.is_shift() {
        if let Some(count) = &source {
            if count_skips_width_check(kind, count)? {
                size_check = SizeCheck::Skip;
            }
        }
    }

    let destination = destination.normalize();
    let source = source.map(Arg::normalize);

    if let Some(src) = &source {
        if destination.is_indirect() && src.is_indirect() {
            return Err(AsmError::ConflictingIndirection { kind });
        }
    }

    let size = if form.is_sized() {
        if size_check == SizeCheck::Enforce {
            check_register_widths(kind, &destination, source.as_ref())?;
        }
        Some(resolve_size(kind, &destination, source.as_ref(), size)?)
    } else {
        None
    };

    Ok(InstructionDescriptor {
        kind,
        destination,
        source,
        size,
    })
}

/// A shift count is an immediate or a direct `CL`. Returns whether the
/// count is `CL`, whose width never matches the destination's.
fn count_skips_width_check(kind: Mnemonic, count: &Arg) -> Result<bool, AsmError> {
    if count.is_indirect() {
        return Err(AsmError::InvalidOperands {
            kind,
            detail: String::from("shift count cannot be indirect"),
        });
    }
    match count.value() {
        Value::Register(Register::Cl) => Ok(true),
        Value::Register(register) => Err(AsmError::InvalidCountRegister {
            kind,
            register: *register,
        }),
        Value::Immediate(_) => Ok(false),
        Value::Symbol(_) => Err(AsmError::InvalidOperands {
            kind,
            detail: String::from("shift count must be an immediate or cl"),
        }),
    }
}

/// Two direct registers must have the same width.
fn check_register_widths(
    kind: Mnemonic,
    destination: &Operand,
    source: Option<&Operand>,
) -> Result<(), AsmError> {
    let Some(src) = source else {
        return Ok(());
    };
    match (destination.direct_register(), src.direct_register()) {
        (Some(d), Some(s)) if d.size() != s.size() => Err(AsmError::SizeMismatch {
            kind,
            destination: d,
            source: s,
        }),
        _ => Ok(()),
    }
}

/// Pick the operation width: explicit, else the direct destination
/// register, else (for a direct non-register destination) a direct source
/// register. An indirect destination never supplies a width.
fn resolve_size(
    kind: Mnemonic,
    destination: &Operand,
    source: Option<&Operand>,
    explicit: Option<OperandSize>,
) -> Result<OperandSize, AsmError> {
    if let Some(size) = explicit {
        return Ok(size);
    }
    if destination.is_indirect() {
        return Err(AsmError::MissingSize { kind });
    }
    destination
        .direct_register()
        .or_else(|| source.and_then(Operand::direct_register))
        .map(Register::size)
        .ok_or(AsmError::MissingSize { kind })
}

/// `mov byte ptr [address], value`: a byte store to an absolute address.
///
/// Always valid, so it bypasses [`resolve`].
pub fn byte_store(address: u32, value: u8) -> InstructionDescriptor {
    InstructionDescriptor {
        kind: Mnemonic::Mov,
        destination: Operand::indirect(address, 0),
        source: Some(Operand::direct(u32::from(value))),
        size: Some(OperandSize::Byte),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two(kind: Mnemonic, dst: impl Into<Arg>, src: impl Into<Arg>) -> Request {
        Request::new(kind, dst).source(src)
    }

    #[test]
    fn register_pair_infers_size() {
        let instr = resolve(two(Mnemonic::Mov, Register::Eax, Register::Ebx)).unwrap();
        assert_eq!(instr.size, Some(OperandSize::Dword));
        assert!(!instr.destination.is_indirect());
        assert!(!instr.source.as_ref().unwrap().is_indirect());
    }

    #[test]
    fn displacement_implies_indirect() {
        let op = Arg::from(Register::Esi).displacement(12).normalize();
        assert_eq!(op.access, Access::Indirect { displacement: 12 });
        assert_eq!(op.displacement(), Some(12));
    }

    #[test]
    fn zero_displacement_matches_bare_indirect() {
        let zero = Arg::from(Register::Esi).displacement(0).normalize();
        let bare = Arg::from(Register::Esi).indirect().normalize();
        assert_eq!(zero, bare);
        assert!(zero.is_indirect());
        assert_eq!(zero.displacement(), None);
    }

    #[test]
    fn explicit_indirect_flag_with_displacement() {
        let op = Arg::from(Register::Esi).indirect().displacement(-4).normalize();
        assert_eq!(op, Operand::indirect(Register::Esi, -4));
    }

    #[test]
    fn both_indirect_rejected() {
        let err = resolve(two(Mnemonic::Mov, mem(Register::Eax, 4), deref(Register::Ebx)))
            .unwrap_err();
        assert_eq!(
            err,
            AsmError::ConflictingIndirection {
                kind: Mnemonic::Mov
            }
        );
    }

    #[test]
    fn both_indirect_rejected_even_when_sized() {
        let req = two(Mnemonic::Add, deref("counter"), mem(Register::Ebp, 8))
            .size(Some(OperandSize::Dword));
        assert!(matches!(
            resolve(req),
            Err(AsmError::ConflictingIndirection { .. })
        ));
    }

    #[test]
    fn indirect_destination_requires_size() {
        let err = resolve(two(Mnemonic::Mov, mem(Register::Eax, 8), Register::Ebx)).unwrap_err();
        assert_eq!(err, AsmError::MissingSize { kind: Mnemonic::Mov });
    }

    #[test]
    fn indirect_destination_with_explicit_size() {
        let req = two(Mnemonic::Mov, mem(Register::Eax, 8), Register::Ebx)
            .size(Some(OperandSize::Dword));
        let instr = resolve(req).unwrap();
        assert_eq!(instr.size, Some(OperandSize::Dword));
        assert_eq!(instr.destination, Operand::indirect(Register::Eax, 8));
    }

    #[test]
    fn register_width_mismatch_rejected() {
        let err = resolve(two(Mnemonic::Add, Register::Eax, Register::Bx)).unwrap_err();
        assert_eq!(
            err,
            AsmError::SizeMismatch {
                kind: Mnemonic::Add,
                destination: Register::Eax,
                source: Register::Bx,
            }
        );
    }

    #[test]
    fn register_width_mismatch_skipped() {
        let req = two(Mnemonic::Shl, Register::Eax, Register::Cl).size_check(SizeCheck::Skip);
        let instr = resolve(req).unwrap();
        assert_eq!(instr.size, Some(OperandSize::Dword));
    }

    #[test]
    fn width_mismatch_ignored_when_source_indirect() {
        let instr = resolve(two(Mnemonic::Mov, Register::Al, deref(Register::Esi))).unwrap();
        assert_eq!(instr.size, Some(OperandSize::Byte));
    }

    #[test]
    fn register_destination_with_immediate() {
        let instr = resolve(two(Mnemonic::Cmp, Register::Dx, 0x3F8u32)).unwrap();
        assert_eq!(instr.size, Some(OperandSize::Word));
    }

    #[test]
    fn register_destination_with_label() {
        let instr = resolve(two(Mnemonic::Mov, Register::Eax, "gdt_pointer")).unwrap();
        assert_eq!(instr.size, Some(OperandSize::Dword));
        assert_eq!(
            instr.source,
            Some(Operand::direct(Symbol::new("gdt_pointer")))
        );
    }

    #[test]
    fn symbol_destination_takes_source_register_width() {
        let instr = resolve(two(Mnemonic::Mov, "saved", Register::Ax)).unwrap();
        assert_eq!(instr.size, Some(OperandSize::Word));
    }

    #[test]
    fn symbol_destination_with_immediate_needs_size() {
        let err = resolve(two(Mnemonic::Mov, "saved", 1u32)).unwrap_err();
        assert_eq!(err, AsmError::MissingSize { kind: Mnemonic::Mov });
    }

    #[test]
    fn single_operand_register_width() {
        let instr = resolve(Request::new(Mnemonic::Inc, Register::Cx)).unwrap();
        assert_eq!(instr.size, Some(OperandSize::Word));
        assert_eq!(instr.source, None);
    }

    #[test]
    fn single_operand_indirect_needs_size() {
        let err = resolve(Request::new(Mnemonic::Neg, mem(Register::Ebp, -4))).unwrap_err();
        assert_eq!(err, AsmError::MissingSize { kind: Mnemonic::Neg });

        let instr = resolve(
            Request::new(Mnemonic::Neg, mem(Register::Ebp, -4)).size(Some(OperandSize::Word)),
        )
        .unwrap();
        assert_eq!(instr.size, Some(OperandSize::Word));
        assert_eq!(instr.destination.displacement(), Some(-4));
    }

    #[test]
    fn unsized_form_drops_size() {
        let instr =
            resolve(Request::new(Mnemonic::Jmp, "loop_top").size(Some(OperandSize::Dword)))
                .unwrap();
        assert_eq!(instr.size, None);
    }

    #[test]
    fn unsized_two_operand_form_skips_width_check() {
        let instr = resolve(two(Mnemonic::Out, Register::Dx, Register::Al)).unwrap();
        assert_eq!(instr.size, None);
        assert_eq!(instr.source, Some(Operand::direct(Register::Al)));
    }

    #[test]
    fn source_slot_must_match_form() {
        assert!(matches!(
            resolve(Request::new(Mnemonic::Mov, Register::Eax)),
            Err(AsmError::InvalidOperands { .. })
        ));
        assert!(matches!(
            resolve(two(Mnemonic::Push, Register::Eax, Register::Ebx)),
            Err(AsmError::InvalidOperands { .. })
        ));
    }

    #[test]
    fn operandless_kind_rejected() {
        let err = resolve(Request::new(Mnemonic::Ret, Register::Eax)).unwrap_err();
        assert!(matches!(err, AsmError::InvalidOperands { kind: Mnemonic::Ret, .. }));
    }

    #[test]
    fn count_register_must_be_cl() {
        let err = Count::Register(Register::Ch)
            .into_source(Mnemonic::Shr)
            .unwrap_err();
        assert_eq!(
            err,
            AsmError::InvalidCountRegister {
                kind: Mnemonic::Shr,
                register: Register::Ch,
            }
        );
        let (arg, check) = Count::Register(Register::Cl)
            .into_source(Mnemonic::Shr)
            .unwrap();
        assert_eq!(arg, Arg::from(Register::Cl));
        assert_eq!(check, SizeCheck::Skip);
    }

    #[test]
    fn count_immediate_widens() {
        let (arg, check) = Count::from(3u8).into_source(Mnemonic::Rol).unwrap();
        assert_eq!(arg.value(), &Value::Immediate(3));
        assert_eq!(check, SizeCheck::Enforce);
    }

    #[test]
    fn shift_count_register_other_than_cl_rejected() {
        let err = resolve(two(Mnemonic::Shl, Register::Al, Register::Dl)).unwrap_err();
        assert_eq!(
            err,
            AsmError::InvalidCountRegister {
                kind: Mnemonic::Shl,
                register: Register::Dl,
            }
        );
        // Same width as the destination, still not encodable.
        let err = resolve(two(Mnemonic::Rol, Register::Bl, Register::Ch)).unwrap_err();
        assert!(matches!(err, AsmError::InvalidCountRegister { .. }));
        // The width check policy does not matter.
        let req = two(Mnemonic::Shr, Register::Eax, Register::Ebx).size_check(SizeCheck::Skip);
        assert!(matches!(
            resolve(req),
            Err(AsmError::InvalidCountRegister { .. })
        ));
    }

    #[test]
    fn shift_count_cannot_be_indirect() {
        let err = resolve(two(Mnemonic::Ror, Register::Eax, deref(Register::Ebx))).unwrap_err();
        assert!(matches!(err, AsmError::InvalidOperands { kind: Mnemonic::Ror, .. }));
        let err = resolve(two(Mnemonic::Shl, Register::Eax, deref(Register::Cl))).unwrap_err();
        assert!(matches!(err, AsmError::InvalidOperands { .. }));
    }

    #[test]
    fn shift_count_symbol_rejected() {
        let err = resolve(two(Mnemonic::Shr, Register::Eax, "bits")).unwrap_err();
        assert!(matches!(err, AsmError::InvalidOperands { kind: Mnemonic::Shr, .. }));
    }

    #[test]
    fn shift_by_cl_skips_width_check() {
        let instr = resolve(two(Mnemonic::Shl, Register::Eax, Register::Cl)).unwrap();
        assert_eq!(instr.size, Some(OperandSize::Dword));
        assert_eq!(instr.source, Some(Operand::direct(Register::Cl)));

        let req = two(Mnemonic::Ror, mem(Register::Ebp, -4), Register::Cl)
            .size(Some(OperandSize::Word));
        assert_eq!(resolve(req).unwrap().size, Some(OperandSize::Word));
    }

    #[test]
    fn shift_by_immediate() {
        let instr = resolve(two(Mnemonic::Rol, Register::Dx, 4u32)).unwrap();
        assert_eq!(instr.size, Some(OperandSize::Word));
    }

    #[test]
    fn byte_store_shape() {
        let instr = byte_store(0xB8000, b'A');
        assert_eq!(instr.kind, Mnemonic::Mov);
        assert_eq!(instr.destination, Operand::indirect(0xB8000u32, 0));
        assert_eq!(instr.source, Some(Operand::direct(0x41u32)));
        assert_eq!(instr.size, Some(OperandSize::Byte));
    }

    #[test]
    fn form_table() {
        assert_eq!(Mnemonic::Xchg.form(), Some(Form::DestinationSourceSized));
        assert_eq!(Mnemonic::Pop.form(), Some(Form::DestinationSized));
        assert_eq!(Mnemonic::In.form(), Some(Form::DestinationSource));
        assert_eq!(
            Mnemonic::Jcc(crate::ir::Condition::Equal).form(),
            Some(Form::Destination)
        );
        assert_eq!(Mnemonic::Hlt.form(), None);
    }
}
