//! Major opcodes and fixed encodings of RV64GC.

/// Integer loads.
pub const LOAD: u32 = 0b000_0011;
/// FP loads.
pub const LOAD_FP: u32 = 0b000_0111;
/// Fences.
pub const MISC_MEM: u32 = 0b000_1111;
/// Register-immediate ALU.
pub const OP_IMM: u32 = 0b001_0011;
/// Add upper immediate to PC.
pub const AUIPC: u32 = 0b001_0111;
/// 32-bit register-immediate ALU.
pub const OP_IMM_32: u32 = 0b001_1011;
/// Integer stores.
pub const STORE: u32 = 0b010_0011;
/// FP stores.
pub const STORE_FP: u32 = 0b010_0111;
/// Atomics.
pub const AMO: u32 = 0b010_1111;
/// Register-register ALU.
pub const OP: u32 = 0b011_0011;
/// Load upper immediate.
pub const LUI: u32 = 0b011_0111;
/// 32-bit register-register ALU.
pub const OP_32: u32 = 0b011_1011;
/// Fused multiply-add.
pub const MADD: u32 = 0b100_0011;
/// Fused multiply-subtract.
pub const MSUB: u32 = 0b100_0111;
/// Negated fused multiply-subtract.
pub const NMSUB: u32 = 0b100_1011;
/// Negated fused multiply-add.
pub const NMADD: u32 = 0b100_1111;
/// FP arithmetic.
pub const OP_FP: u32 = 0b101_0011;
/// Conditional branches.
pub const BRANCH: u32 = 0b110_0011;
/// Indirect jump.
pub const JALR: u32 = 0b110_0111;
/// Direct jump.
pub const JAL: u32 = 0b110_1111;
/// Environment calls, CSR access, trap returns.
pub const SYSTEM: u32 = 0b111_0011;

/// Funct7 of the M extension.
pub const MULDIV: u32 = 0b000_0001;

/// `ecall`.
pub const ECALL: u32 = 0x0000_0073;
/// `ebreak`.
pub const EBREAK: u32 = 0x0010_0073;
/// `uret`.
pub const URET: u32 = 0x0020_0073;
/// `sret`.
pub const SRET: u32 = 0x1020_0073;
/// `mret`.
pub const MRET: u32 = 0x3020_0073;
/// `wfi`.
pub const WFI: u32 = 0x1050_0073;
/// `sfence.vma` with the register fields masked out.
pub const SFENCE_VMA: u32 = 0x1200_0073;
/// Mask applied before comparing with [`SFENCE_VMA`].
pub const SFENCE_VMA_MASK: u32 = 0xfe00_7fff;
