//! RISC-V disassembly for raw instruction encodings.
//!
//! RTL traces store each committed instruction as its integer encoding. These helpers
//! turn the encoding back into assembly text so RTL and simulator traces can be
//! reported the same way.
//!
//! # Supported encodings
//!
//! - RV64I, M, A, F, D
//! - Privileged (`ecall`, `ebreak`, `xret`, `wfi`, `sfence.vma`, CSR access)
//! - RVC (16-bit), rendered with `c.` mnemonics

pub mod disasm;
pub mod fields;
pub mod opcodes;
pub mod rvc;

pub use disasm::disassemble;
pub use fields::InstructionBits;
pub use rvc::disassemble_compressed;

/// Disassembles a raw encoding of either width.
///
/// Encodings whose two low bits are not `0b11` are 16-bit. Values that fit neither
/// width render as `unknown (0x…)`.
pub fn disassemble_any(raw: u64) -> String {
    if raw & 0b11 != 0b11 {
        match u16::try_from(raw) {
            Ok(half) => disassemble_compressed(half),
            Err(_) => disasm::unknown(raw),
        }
    } else {
        match u32::try_from(raw) {
            Ok(word) => disassemble(word),
            Err(_) => disasm::unknown(raw),
        }
    }
}
