//! Disassembly of 16-bit compressed encodings.
//!
//! Compressed instructions keep their own `c.` mnemonics rather than being expanded,
//! so a trace still shows which instructions were compressed.

use super::disasm::{freg, unknown, xreg};
use super::fields::sign_extend;

/// Bits `hi..=lo` of `inst`, shifted down.
#[inline]
const fn bits(inst: u16, hi: u32, lo: u32) -> u32 {
    ((inst as u32) >> lo) & ((1 << (hi - lo + 1)) - 1)
}

/// Bit `from` of `inst`, moved to position `to`.
#[inline]
const fn bit(inst: u16, from: u32, to: u32) -> u32 {
    bits(inst, from, from) << to
}

/// Popular-register field (`x8..x15`) starting at bit `lo`.
fn creg(inst: u16, lo: u32) -> &'static str {
    xreg(8 + bits(inst, lo + 2, lo) as usize)
}

fn cfreg(inst: u16, lo: u32) -> &'static str {
    freg(8 + bits(inst, lo + 2, lo) as usize)
}

fn imm6(inst: u16) -> i64 {
    sign_extend(u64::from(bit(inst, 12, 5) | bits(inst, 6, 2)), 6)
}

fn uimm6(inst: u16) -> u32 {
    bit(inst, 12, 5) | bits(inst, 6, 2)
}

/// Offset of word-sized loads/stores through `x8..x15`.
fn offset_w(inst: u16) -> u32 {
    (bits(inst, 12, 10) << 3) | bit(inst, 6, 2) | bit(inst, 5, 6)
}

/// Offset of doubleword-sized loads/stores through `x8..x15`.
fn offset_d(inst: u16) -> u32 {
    (bits(inst, 12, 10) << 3) | (bits(inst, 6, 5) << 6)
}

fn jump_offset(inst: u16) -> i64 {
    let v = bit(inst, 12, 11)
        | bit(inst, 11, 4)
        | (bits(inst, 10, 9) << 8)
        | bit(inst, 8, 10)
        | bit(inst, 7, 6)
        | bit(inst, 6, 7)
        | (bits(inst, 5, 3) << 1)
        | bit(inst, 2, 5);
    sign_extend(u64::from(v), 12)
}

fn branch_offset(inst: u16) -> i64 {
    let v = bit(inst, 12, 8)
        | (bits(inst, 11, 10) << 3)
        | (bits(inst, 6, 5) << 6)
        | (bits(inst, 4, 3) << 1)
        | bit(inst, 2, 5);
    sign_extend(u64::from(v), 9)
}

/// Disassembles one 16-bit instruction.
pub fn disassemble_compressed(inst: u16) -> String {
    let decoded = match inst & 0b11 {
        0b00 => quadrant0(inst),
        0b01 => quadrant1(inst),
        0b10 => quadrant2(inst),
        _ => None,
    };
    decoded.unwrap_or_else(|| unknown(u64::from(inst)))
}

fn quadrant0(inst: u16) -> Option<String> {
    let rd = creg(inst, 2);
    let rs1 = creg(inst, 7);
    let text = match bits(inst, 15, 13) {
        0b000 => {
            let nzuimm = (bits(inst, 12, 11) << 4)
                | (bits(inst, 10, 7) << 6)
                | bit(inst, 6, 2)
                | bit(inst, 5, 3);
            if nzuimm == 0 {
                return None;
            }
            format!("c.addi4spn {rd}, sp, {nzuimm}")
        }
        0b001 => format!("c.fld {}, {}({rs1})", cfreg(inst, 2), offset_d(inst)),
        0b010 => format!("c.lw {rd}, {}({rs1})", offset_w(inst)),
        0b011 => format!("c.ld {rd}, {}({rs1})", offset_d(inst)),
        0b101 => format!("c.fsd {}, {}({rs1})", cfreg(inst, 2), offset_d(inst)),
        0b110 => format!("c.sw {rd}, {}({rs1})", offset_w(inst)),
        0b111 => format!("c.sd {rd}, {}({rs1})", offset_d(inst)),
        _ => return None,
    };
    Some(text)
}

fn quadrant1(inst: u16) -> Option<String> {
    let rd_idx = bits(inst, 11, 7) as usize;
    let rd = xreg(rd_idx);
    let text = match bits(inst, 15, 13) {
        0b000 if rd_idx == 0 => "c.nop".to_string(),
        0b000 => format!("c.addi {rd}, {}", imm6(inst)),
        0b001 if rd_idx != 0 => format!("c.addiw {rd}, {}", imm6(inst)),
        0b010 => format!("c.li {rd}, {}", imm6(inst)),
        0b011 if rd_idx == 2 => {
            let v = bit(inst, 12, 9)
                | bit(inst, 6, 4)
                | bit(inst, 5, 6)
                | (bits(inst, 4, 3) << 7)
                | bit(inst, 2, 5);
            match sign_extend(u64::from(v), 10) {
                0 => return None,
                imm => format!("c.addi16sp sp, {imm}"),
            }
        }
        0b011 => match imm6(inst) {
            0 => return None,
            imm => format!("c.lui {rd}, {:#x}", imm & 0xf_ffff),
        },
        0b100 => misc_alu(inst)?,
        0b101 => format!("c.j {}", jump_offset(inst)),
        0b110 => format!("c.beqz {}, {}", creg(inst, 7), branch_offset(inst)),
        0b111 => format!("c.bnez {}, {}", creg(inst, 7), branch_offset(inst)),
        _ => return None,
    };
    Some(text)
}

fn misc_alu(inst: u16) -> Option<String> {
    let rd = creg(inst, 7);
    let text = match bits(inst, 11, 10) {
        0b00 => format!("c.srli {rd}, {}", uimm6(inst)),
        0b01 => format!("c.srai {rd}, {}", uimm6(inst)),
        0b10 => format!("c.andi {rd}, {}", imm6(inst)),
        _ => {
            let mn = match (bits(inst, 12, 12), bits(inst, 6, 5)) {
                (0, 0b00) => "c.sub",
                (0, 0b01) => "c.xor",
                (0, 0b10) => "c.or",
                (0, 0b11) => "c.and",
                (1, 0b00) => "c.subw",
                (1, 0b01) => "c.addw",
                _ => return None,
            };
            format!("{mn} {rd}, {}", creg(inst, 2))
        }
    };
    Some(text)
}

fn quadrant2(inst: u16) -> Option<String> {
    let rd_idx = bits(inst, 11, 7) as usize;
    let rs2_idx = bits(inst, 6, 2) as usize;
    let (rd, rs2) = (xreg(rd_idx), xreg(rs2_idx));
    let sp_d = (bits(inst, 12, 12) << 5) | (bits(inst, 6, 5) << 3) | (bits(inst, 4, 2) << 6);
    let store_d = (bits(inst, 12, 10) << 3) | (bits(inst, 9, 7) << 6);
    let text = match bits(inst, 15, 13) {
        0b000 if rd_idx != 0 => format!("c.slli {rd}, {}", uimm6(inst)),
        0b001 => format!("c.fldsp {}, {sp_d}(sp)", freg(rd_idx)),
        0b010 if rd_idx != 0 => {
            let off = (bits(inst, 12, 12) << 5) | (bits(inst, 6, 4) << 2) | (bits(inst, 3, 2) << 6);
            format!("c.lwsp {rd}, {off}(sp)")
        }
        0b011 if rd_idx != 0 => format!("c.ldsp {rd}, {sp_d}(sp)"),
        0b100 => match (bits(inst, 12, 12), rd_idx, rs2_idx) {
            (0, 0, 0) => return None,
            (0, _, 0) => format!("c.jr {rd}"),
            (0, _, _) => format!("c.mv {rd}, {rs2}"),
            (_, 0, 0) => "c.ebreak".to_string(),
            (_, _, 0) => format!("c.jalr {rd}"),
            _ => format!("c.add {rd}, {rs2}"),
        },
        0b101 => format!("c.fsdsp {}, {store_d}(sp)", freg(rs2_idx)),
        0b110 => {
            let off = (bits(inst, 12, 9) << 2) | (bits(inst, 8, 7) << 6);
            format!("c.swsp {rs2}, {off}(sp)")
        }
        0b111 => format!("c.sdsp {rs2}, {store_d}(sp)"),
        _ => return None,
    };
    Some(text)
}
