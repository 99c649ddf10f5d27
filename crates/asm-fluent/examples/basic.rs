//! Basic builder example: a tiny 32-bit kernel entry point.
//!
//! Run with: `RUST_LOG=trace cargo run --example basic`

use asm_fluent::{deref, mem, AsmError, Assembler, Condition, OperandSize, Register};

fn main() -> Result<(), AsmError> {
    env_logger::init();
    println!("=== asm_fluent basic example ===\n");

    let mut asm = Assembler::new();
    asm.constant("VGA_TEXT", "0xB8000")?
        .label("kernel_entry")?
        .disable_interrupts()?
        .set(Register::Esp, "stack_top")?
        .set(Register::Eax, "gdt_pointer")?
        .load_gdt(deref(Register::Eax))?;

    // Clear the first row of the screen.
    asm.set(Register::Edi, 0xB8000u32)?
        .set(Register::Ecx, 80u32)?
        .label("clear")?
        .set(deref(Register::Edi).sized(OperandSize::Word), 0x0F20u32)?
        .add(Register::Edi, 2u32)?
        .decrement(Register::Ecx)?
        .jump_if(Condition::NotEqual, "clear")?;

    // Local variable on the stack frame.
    asm.push(Register::Ebp)?
        .set(Register::Ebp, Register::Esp)?
        .set(mem(Register::Ebp, -4).sized(OperandSize::Dword), 0u32)?
        .increment(mem(Register::Ebp, -4).sized(OperandSize::Dword))?
        .pop(Register::Ebp)?;

    asm.set_byte(0xB8000, b'K')?
        .label("hang")?
        .halt()?
        .jump("hang")?;

    asm.data_array("stack", 4096, OperandSize::Byte, 0)?
        .data_member("stack_top", 0)?
        .data_string("banner", "kernel ready")?;

    // Rejected: memory-to-memory move.
    if let Err(e) = asm.set(deref(Register::Esi), deref(Register::Edi)) {
        println!("rejected: {}\n", e);
    }

    let program = asm.finish();
    print!("{}", program.listing());
    println!("\n{} statements, {} data members", program.len(), program.data_members().len());
    Ok(())
}
