#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use asm_fluent::{Arg, Assembler, Mnemonic, OperandSize, Register, Request};

const REGISTERS: [Register; 12] = [
    Register::Eax,
    Register::Ebx,
    Register::Ecx,
    Register::Esp,
    Register::Ebp,
    Register::Ax,
    Register::Dx,
    Register::Al,
    Register::Cl,
    Register::Ch,
    Register::Rax,
    Register::Ds,
];

const SHIFTS: [Mnemonic; 4] = [Mnemonic::Shl, Mnemonic::Shr, Mnemonic::Rol, Mnemonic::Ror];

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Register(u8),
    Immediate(u32),
    Symbol(String),
}

#[derive(Debug, Arbitrary)]
struct FuzzArg {
    value: FuzzValue,
    indirect: bool,
    displacement: Option<i32>,
    size: Option<u8>,
}

impl FuzzArg {
    fn build(self) -> Arg {
        let mut arg = match self.value {
            FuzzValue::Register(i) => Arg::from(REGISTERS[usize::from(i) % REGISTERS.len()]),
            FuzzValue::Immediate(v) => Arg::from(v),
            FuzzValue::Symbol(s) => Arg::from(s),
        };
        if self.indirect {
            arg = arg.indirect();
        }
        if let Some(d) = self.displacement {
            arg = arg.displacement(d);
        }
        if let Some(size) = self.size.and_then(|s| OperandSize::from_bits(u16::from(s) * 8)) {
            arg = arg.sized(size);
        }
        arg
    }
}

#[derive(Debug, Arbitrary)]
enum FuzzOp {
    Set(FuzzArg, FuzzArg),
    Add(FuzzArg, FuzzArg),
    Compare(FuzzArg, FuzzArg),
    Exchange(FuzzArg, FuzzArg),
    ShiftLeft(FuzzArg, u8),
    Shift(u8, FuzzArg, FuzzArg),
    Increment(FuzzArg),
    Push(FuzzArg),
    Call(FuzzArg),
    LoadGdt(FuzzArg),
    SetByte(u32, u8),
    Label(String),
}

fuzz_target!(|ops: Vec<FuzzOp>| {
    // Builder calls must never panic, only return Ok/Err, and a failed call
    // must leave the statement count unchanged.
    let mut asm = Assembler::new();
    for op in ops {
        let before = asm.statement_count();
        let ok = match op {
            FuzzOp::Set(d, s) => asm.set(d.build(), s.build()).is_ok(),
            FuzzOp::Add(d, s) => asm.add(d.build(), s.build()).is_ok(),
            FuzzOp::Compare(d, s) => asm.compare(d.build(), s.build()).is_ok(),
            FuzzOp::Exchange(d, s) => asm.exchange(d.build(), s.build()).is_ok(),
            FuzzOp::ShiftLeft(d, r) => {
                let count = REGISTERS[usize::from(r) % REGISTERS.len()];
                asm.shift_left(d.build(), count).is_ok()
            }
            FuzzOp::Shift(k, d, s) => {
                let kind = SHIFTS[usize::from(k) % SHIFTS.len()];
                asm.instruction(Request::new(kind, d.build()).source(s.build()))
                    .is_ok()
            }
            FuzzOp::Increment(d) => asm.increment(d.build()).is_ok(),
            FuzzOp::Push(d) => asm.push(d.build()).is_ok(),
            FuzzOp::Call(d) => asm.call(d.build()).is_ok(),
            FuzzOp::LoadGdt(d) => asm.load_gdt(d.build()).is_ok(),
            FuzzOp::SetByte(addr, v) => asm.set_byte(addr, v).is_ok(),
            FuzzOp::Label(name) => asm.label(&name).is_ok(),
        };
        let expected = if ok { before + 1 } else { before };
        assert_eq!(asm.statement_count(), expected);
    }
    let _ = asm.finish().listing();
});
