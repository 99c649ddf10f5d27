#![cfg(not(target_arch = "wasm32"))]
//! Property-based tests using proptest.
//!
//! These tests check resolver invariants across randomly generated operand
//! shapes, complementing the targeted unit/integration tests and the
//! libfuzzer-based fuzz target.

use asm_fluent::{
    resolve, Access, Arg, AsmError, Assembler, Mnemonic, OperandSize, Register, Request,
    SizeCheck, Value,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn arb_register() -> impl Strategy<Value = Register> {
    prop::sample::select(vec![
        Register::Rax,
        Register::R9,
        Register::Eax,
        Register::Ebx,
        Register::Esp,
        Register::Ebp,
        Register::R10d,
        Register::Ax,
        Register::Cx,
        Register::Si,
        Register::Al,
        Register::Ah,
        Register::Cl,
        Register::Dl,
        Register::Ds,
    ])
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        arb_register().prop_map(Value::Register),
        any::<u32>().prop_map(Value::Immediate),
        "[a-z_][a-z0-9_]{0,12}".prop_map(Value::from),
    ]
}

fn arb_size() -> impl Strategy<Value = OperandSize> {
    prop::sample::select(vec![
        OperandSize::Byte,
        OperandSize::Word,
        OperandSize::Dword,
        OperandSize::Qword,
    ])
}

/// An operand with any combination of indirect flag, displacement and size.
fn arb_arg() -> impl Strategy<Value = Arg> {
    (
        arb_value(),
        any::<bool>(),
        prop::option::of(any::<i32>()),
        prop::option::of(arb_size()),
    )
        .prop_map(|(value, indirect, displacement, size)| {
            let mut arg = Arg::new(value);
            if indirect {
                arg = arg.indirect();
            }
            if let Some(d) = displacement {
                arg = arg.displacement(d);
            }
            if let Some(s) = size {
                arg = arg.sized(s);
            }
            arg
        })
}

/// Two-operand kinds whose source is a full operand.
fn arb_binary_kind() -> impl Strategy<Value = Mnemonic> {
    prop::sample::select(vec![
        Mnemonic::Mov,
        Mnemonic::Add,
        Mnemonic::Sub,
        Mnemonic::And,
        Mnemonic::Or,
        Mnemonic::Xor,
        Mnemonic::Cmp,
        Mnemonic::Test,
        Mnemonic::Xchg,
        Mnemonic::Imul,
    ])
}

/// Two-operand kinds whose source is a bit count.
fn arb_shift_kind() -> impl Strategy<Value = Mnemonic> {
    prop::sample::select(vec![
        Mnemonic::Shl,
        Mnemonic::Shr,
        Mnemonic::Rol,
        Mnemonic::Ror,
    ])
}

fn arb_two_operand_kind() -> impl Strategy<Value = Mnemonic> {
    prop_oneof![arb_binary_kind(), arb_shift_kind()]
}

fn arb_one_operand_kind() -> impl Strategy<Value = Mnemonic> {
    prop::sample::select(vec![
        Mnemonic::Inc,
        Mnemonic::Dec,
        Mnemonic::Neg,
        Mnemonic::Not,
        Mnemonic::Mul,
        Mnemonic::Div,
        Mnemonic::Idiv,
        Mnemonic::Push,
        Mnemonic::Pop,
    ])
}

// ── Property: Normalization ─────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Any displacement makes the operand indirect.
    #[test]
    fn displacement_implies_indirect(value in arb_value(), d in any::<i32>()) {
        let op = Arg::new(value).displacement(d).normalize();
        prop_assert!(op.is_indirect());
        prop_assert_eq!(op.access, Access::Indirect { displacement: d });
    }

    /// A zero displacement is indistinguishable from a bare indirect operand.
    #[test]
    fn zero_displacement_is_bare_indirect(value in arb_value()) {
        let zero = Arg::new(value.clone()).displacement(0).normalize();
        let bare = Arg::new(value).indirect().normalize();
        prop_assert_eq!(zero.displacement(), None);
        prop_assert_eq!(&zero, &bare);
    }

    /// Descriptors report nonzero displacements unchanged.
    #[test]
    fn nonzero_displacement_survives(reg in arb_register(), d in any::<i32>().prop_filter("nonzero", |d| *d != 0)) {
        let instr = resolve(
            Request::new(Mnemonic::Mov, Arg::from(reg).displacement(d))
                .source(1u32)
                .size(Some(OperandSize::Dword)),
        )
        .unwrap();
        prop_assert_eq!(instr.destination.displacement(), Some(d));
    }
}

// ── Property: Validation ────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig { max_global_rejects: 8192, ..ProptestConfig::with_cases(1000) })]

    /// No descriptor ever has two indirect operands.
    #[test]
    fn never_memory_to_memory(kind in arb_two_operand_kind(), dst in arb_arg(), src in arb_arg()) {
        let both = dst.is_indirect() && src.is_indirect();
        let size = dst.size_hint();
        match resolve(Request::new(kind, dst).source(src).size(size)) {
            Ok(instr) => {
                prop_assert!(!both);
                let src = instr.source.unwrap();
                prop_assert!(!(instr.destination.is_indirect() && src.is_indirect()));
            }
            Err(e) if both && !kind.is_shift() => {
                prop_assert_eq!(e, AsmError::ConflictingIndirection { kind })
            }
            Err(_) => {}
        }
    }

    /// Register pairs of different widths fail unless the check is skipped;
    /// with the check skipped the destination width wins.
    #[test]
    fn register_width_mismatch(kind in arb_binary_kind(), a in arb_register(), b in arb_register()) {
        prop_assume!(a.size() != b.size());
        let err = resolve(Request::new(kind, a).source(b)).unwrap_err();
        prop_assert_eq!(err, AsmError::SizeMismatch { kind, destination: a, source: b });

        let instr = resolve(Request::new(kind, a).source(b).size_check(SizeCheck::Skip)).unwrap();
        prop_assert_eq!(instr.size, Some(a.size()));
    }

    /// Register pairs of equal widths always resolve to that width.
    #[test]
    fn register_width_match(kind in arb_binary_kind(), a in arb_register(), b in arb_register()) {
        prop_assume!(a.size() == b.size());
        let instr = resolve(Request::new(kind, a).source(b)).unwrap();
        prop_assert_eq!(instr.size, Some(a.size()));
    }

    /// An indirect destination with no explicit size always fails.
    #[test]
    fn indirect_destination_needs_size(kind in arb_binary_kind(), dst in arb_value(), d in any::<i32>(), src in arb_register()) {
        let err = resolve(Request::new(kind, Arg::new(dst).displacement(d)).source(src)).unwrap_err();
        prop_assert_eq!(err, AsmError::MissingSize { kind });
    }

    /// Same for single-operand forms.
    #[test]
    fn indirect_single_operand_needs_size(kind in arb_one_operand_kind(), dst in arb_value()) {
        let err = resolve(Request::new(kind, Arg::new(dst).indirect())).unwrap_err();
        prop_assert_eq!(err, AsmError::MissingSize { kind });
    }

    /// An explicit size always wins when resolution succeeds.
    #[test]
    fn explicit_size_wins(kind in arb_two_operand_kind(), dst in arb_arg(), src in arb_arg(), size in arb_size()) {
        if let Ok(instr) = resolve(
            Request::new(kind, dst)
                .source(src)
                .size(Some(size))
                .size_check(SizeCheck::Skip),
        ) {
            prop_assert_eq!(instr.size, Some(size));
        }
    }

    /// Any count register other than CL is rejected by every entry point,
    /// whatever the destination or width policy, and nothing is appended.
    #[test]
    fn shift_count_must_be_cl(
        kind in arb_shift_kind(),
        dst in arb_arg(),
        count in arb_register(),
        skip in any::<bool>(),
    ) {
        prop_assume!(count != Register::Cl);
        let expected = AsmError::InvalidCountRegister { kind, register: count };
        let check = if skip { SizeCheck::Skip } else { SizeCheck::Enforce };
        let request = Request::new(kind, dst.clone())
            .source(count)
            .size(Some(OperandSize::Dword))
            .size_check(check);
        prop_assert_eq!(resolve(request.clone()).unwrap_err(), expected.clone());

        let mut asm = Assembler::new();
        prop_assert_eq!(asm.instruction(request).map(|_| ()).unwrap_err(), expected.clone());
        let adapter = match kind {
            Mnemonic::Shl => asm.shift_left(dst, count),
            Mnemonic::Shr => asm.shift_right(dst, count),
            Mnemonic::Rol => asm.rotate_left(dst, count),
            _ => asm.rotate_right(dst, count),
        };
        prop_assert_eq!(adapter.map(|_| ()).unwrap_err(), expected);
        prop_assert_eq!(asm.statement_count(), 0);
    }

    /// A CL count works with a destination register of any width under the
    /// default policy, and the destination supplies the width.
    #[test]
    fn shift_by_cl_any_width(kind in arb_shift_kind(), dst in arb_register()) {
        let instr = resolve(Request::new(kind, dst).source(Register::Cl)).unwrap();
        prop_assert_eq!(instr.size, Some(dst.size()));

        let mut asm = Assembler::new();
        asm.instruction(Request::new(kind, dst).source(Register::Cl)).unwrap();
        prop_assert_eq!(asm.statement_count(), 1);
    }
}

// ── Property: No panics, nothing appended on failure ────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Builder calls never panic, and a failed call appends nothing.
    #[test]
    fn builder_appends_only_on_success(ops in prop::collection::vec((arb_two_operand_kind(), arb_arg(), arb_arg()), 0..32)) {
        let mut asm = Assembler::new();
        let mut expected = 0;
        for (kind, dst, src) in ops {
            let ok = match kind {
                Mnemonic::Mov => asm.set(dst, src).is_ok(),
                Mnemonic::Add => asm.add(dst, src).is_ok(),
                Mnemonic::Cmp => asm.compare(dst, src).is_ok(),
                Mnemonic::Xchg => asm.exchange(dst, src).is_ok(),
                _ => asm.instruction(Request::new(kind, dst).source(src)).is_ok(),
            };
            if ok {
                expected += 1;
            }
            prop_assert_eq!(asm.statement_count(), expected);
        }
        let program = asm.finish();
        prop_assert_eq!(program.len(), expected);
        let _ = program.listing();
    }
}
