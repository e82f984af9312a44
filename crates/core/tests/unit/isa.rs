//! # Disassembler Tests
//!
//! Mnemonic and operand formatting for RV64GC, and the dispatch between 16- and
//! 32-bit encodings used when decoding RTL traces.

use cyclekit_core::isa::{InstructionBits, disassemble, disassemble_any, disassemble_compressed};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case(0x00a0_0513, "addi a0, zero, 10")]
#[case(0x00c5_8533, "add a0, a1, a2")]
#[case(0x40c5_8533, "sub a0, a1, a2")]
#[case(0x02c5_8533, "mul a0, a1, a2")]
#[case(0x1234_5537, "lui a0, 0x12345")]
#[case(0x0081_3503, "ld a0, 8(sp)")]
#[case(0x0011_3c23, "sd ra, 24(sp)")]
#[case(0x00b5_0463, "beq a0, a1, 8")]
#[case(0x0100_00ef, "jal ra, 16")]
#[case(0x0000_8067, "jalr zero, 0(ra)")]
#[case(0x3000_2573, "csrrs a0, 0x300, zero")]
#[case(0x02c5_8553, "fadd.d fa0, fa1, fa2")]
#[case(0x00b6_252f, "amoadd.w a0, a1, (a2)")]
#[case(0x0ff0_000f, "fence")]
#[case(0x0000_0073, "ecall")]
#[case(0x3020_0073, "mret")]
fn test_disassemble(#[case] inst: u32, #[case] text: &str) {
    assert_eq!(disassemble(inst), text);
}

#[test]
fn test_disassemble_unknown() {
    assert_eq!(disassemble(0xffff_ffff), "unknown (0xffffffff)");
}

#[rstest]
#[case(0x0001, "c.nop")]
#[case(0x4529, "c.li a0, 10")]
#[case(0x41c8, "c.lw a0, 4(a1)")]
#[case(0xc501, "c.beqz a0, 8")]
#[case(0xa001, "c.j 0")]
#[case(0x8082, "c.jr ra")]
#[case(0x852e, "c.mv a0, a1")]
#[case(0x952e, "c.add a0, a1")]
#[case(0xe406, "c.sdsp ra, 8(sp)")]
#[case(0x60a2, "c.ldsp ra, 8(sp)")]
fn test_disassemble_compressed(#[case] inst: u16, #[case] text: &str) {
    assert_eq!(disassemble_compressed(inst), text);
}

#[test]
fn test_compressed_zero_is_illegal() {
    assert_eq!(disassemble_compressed(0x0000), "unknown (0x0)");
}

#[rstest]
#[case(0x00a0_0513, "addi a0, zero, 10")]
#[case(0x8082, "c.jr ra")]
#[case(0x1_0000_0013, "unknown (0x100000013)")]
#[case(0x1_0001, "unknown (0x10001)")]
fn test_disassemble_any(#[case] raw: u64, #[case] text: &str) {
    assert_eq!(disassemble_any(raw), text);
}

#[test]
fn test_field_extraction() {
    // sd ra, 24(sp)
    let inst: u32 = 0x0011_3c23;
    assert_eq!(inst.opcode(), 0x23);
    assert_eq!(inst.rs1(), 2);
    assert_eq!(inst.rs2(), 1);
    assert_eq!(inst.funct3(), 3);
    assert_eq!(inst.imm_s(), 24);

    // beq a0, a1, 8
    assert_eq!(0x00b5_0463_u32.imm_b(), 8);
    // jal ra, 16
    assert_eq!(0x0100_00ef_u32.imm_j(), 16);
    // addi a0, zero, -1
    assert_eq!(0xfff0_0513_u32.imm_i(), -1);
}

proptest! {
    #[test]
    fn disassemble_never_panics(inst in any::<u32>()) {
        prop_assert!(!disassemble(inst).is_empty());
    }

    #[test]
    fn compressed_never_panics(inst in any::<u16>()) {
        prop_assert!(!disassemble_compressed(inst).is_empty());
    }

    #[test]
    fn full_width_encodings_dispatch_to_base(inst in any::<u32>()) {
        let inst = inst | 0b11;
        prop_assert_eq!(disassemble_any(u64::from(inst)), disassemble(inst));
    }
}
