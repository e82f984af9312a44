//! Disassembly of 32-bit RV64IMAFD and privileged encodings.
//!
//! Output uses ABI register names and plain mnemonics, no pseudo-instructions:
//! `0x00a00513` renders as `addi a0, zero, 10`. Anything not recognised renders as
//! `unknown (0x…)`.

use super::fields::InstructionBits;
use super::opcodes as op;

const XREGS: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

const FREGS: [&str; 32] = [
    "ft0", "ft1", "ft2", "ft3", "ft4", "ft5", "ft6", "ft7", "fs0", "fs1", "fa0", "fa1", "fa2",
    "fa3", "fa4", "fa5", "fa6", "fa7", "fs2", "fs3", "fs4", "fs5", "fs6", "fs7", "fs8", "fs9",
    "fs10", "fs11", "ft8", "ft9", "ft10", "ft11",
];

/// ABI name of integer register `idx`.
pub fn xreg(idx: usize) -> &'static str {
    XREGS[idx & 0x1f]
}

/// ABI name of FP register `idx`.
pub fn freg(idx: usize) -> &'static str {
    FREGS[idx & 0x1f]
}

/// Placeholder text for an encoding that is not recognised.
pub fn unknown(raw: u64) -> String {
    format!("unknown ({raw:#x})")
}

/// Disassembles one 32-bit instruction.
pub fn disassemble(inst: u32) -> String {
    let decoded = match inst.opcode() {
        op::LOAD => load(inst),
        op::LOAD_FP => fp_load(inst),
        op::STORE => store(inst),
        op::STORE_FP => fp_store(inst),
        op::OP_IMM => alu_imm(inst, false),
        op::OP_IMM_32 => alu_imm(inst, true),
        op::OP => alu_reg(inst, false),
        op::OP_32 => alu_reg(inst, true),
        op::LUI => Some(format!("lui {}, {:#x}", xreg(inst.rd()), inst.imm_u())),
        op::AUIPC => Some(format!("auipc {}, {:#x}", xreg(inst.rd()), inst.imm_u())),
        op::JAL => Some(format!("jal {}, {}", xreg(inst.rd()), inst.imm_j())),
        op::JALR if inst.funct3() == 0 => Some(format!(
            "jalr {}, {}({})",
            xreg(inst.rd()),
            inst.imm_i(),
            xreg(inst.rs1())
        )),
        op::BRANCH => branch(inst),
        op::MADD | op::MSUB | op::NMSUB | op::NMADD => fused(inst),
        op::OP_FP => fp_arith(inst),
        op::AMO => atomic(inst),
        op::MISC_MEM => match inst.funct3() {
            0 => Some("fence".to_string()),
            1 => Some("fence.i".to_string()),
            _ => None,
        },
        op::SYSTEM => system(inst),
        _ => None,
    };
    decoded.unwrap_or_else(|| unknown(u64::from(inst)))
}

fn load(inst: u32) -> Option<String> {
    let mn = match inst.funct3() {
        0 => "lb",
        1 => "lh",
        2 => "lw",
        3 => "ld",
        4 => "lbu",
        5 => "lhu",
        6 => "lwu",
        _ => return None,
    };
    Some(format!(
        "{mn} {}, {}({})",
        xreg(inst.rd()),
        inst.imm_i(),
        xreg(inst.rs1())
    ))
}

fn fp_load(inst: u32) -> Option<String> {
    let mn = match inst.funct3() {
        2 => "flw",
        3 => "fld",
        _ => return None,
    };
    Some(format!(
        "{mn} {}, {}({})",
        freg(inst.rd()),
        inst.imm_i(),
        xreg(inst.rs1())
    ))
}

fn store(inst: u32) -> Option<String> {
    let mn = match inst.funct3() {
        0 => "sb",
        1 => "sh",
        2 => "sw",
        3 => "sd",
        _ => return None,
    };
    Some(format!(
        "{mn} {}, {}({})",
        xreg(inst.rs2()),
        inst.imm_s(),
        xreg(inst.rs1())
    ))
}

fn fp_store(inst: u32) -> Option<String> {
    let mn = match inst.funct3() {
        2 => "fsw",
        3 => "fsd",
        _ => return None,
    };
    Some(format!(
        "{mn} {}, {}({})",
        freg(inst.rs2()),
        inst.imm_s(),
        xreg(inst.rs1())
    ))
}

fn alu_imm(inst: u32, word: bool) -> Option<String> {
    let w = if word { "w" } else { "" };
    let (rd, rs1) = (xreg(inst.rd()), xreg(inst.rs1()));
    let shamt_mask = if word { 0x1f } else { 0x3f };
    let shamt = (inst >> 20) & shamt_mask;
    let text = match inst.funct3() {
        0 => format!("addi{w} {rd}, {rs1}, {}", inst.imm_i()),
        1 if inst >> 26 == 0 => format!("slli{w} {rd}, {rs1}, {shamt}"),
        5 if inst >> 26 == 0 => format!("srli{w} {rd}, {rs1}, {shamt}"),
        5 if inst >> 26 == 0b01_0000 => format!("srai{w} {rd}, {rs1}, {shamt}"),
        2 if !word => format!("slti {rd}, {rs1}, {}", inst.imm_i()),
        3 if !word => format!("sltiu {rd}, {rs1}, {}", inst.imm_i()),
        4 if !word => format!("xori {rd}, {rs1}, {}", inst.imm_i()),
        6 if !word => format!("ori {rd}, {rs1}, {}", inst.imm_i()),
        7 if !word => format!("andi {rd}, {rs1}, {}", inst.imm_i()),
        _ => return None,
    };
    Some(text)
}

fn alu_reg(inst: u32, word: bool) -> Option<String> {
    let mn = match (inst.funct7(), inst.funct3(), word) {
        (op::MULDIV, f3, false) => ["mul", "mulh", "mulhsu", "mulhu", "div", "divu", "rem", "remu"]
            [f3 as usize],
        (op::MULDIV, 0, true) => "mulw",
        (op::MULDIV, 4, true) => "divw",
        (op::MULDIV, 5, true) => "divuw",
        (op::MULDIV, 6, true) => "remw",
        (op::MULDIV, 7, true) => "remuw",
        (0, 0, false) => "add",
        (0x20, 0, false) => "sub",
        (0, 1, false) => "sll",
        (0, 2, false) => "slt",
        (0, 3, false) => "sltu",
        (0, 4, false) => "xor",
        (0, 5, false) => "srl",
        (0x20, 5, false) => "sra",
        (0, 6, false) => "or",
        (0, 7, false) => "and",
        (0, 0, true) => "addw",
        (0x20, 0, true) => "subw",
        (0, 1, true) => "sllw",
        (0, 5, true) => "srlw",
        (0x20, 5, true) => "sraw",
        _ => return None,
    };
    Some(format!(
        "{mn} {}, {}, {}",
        xreg(inst.rd()),
        xreg(inst.rs1()),
        xreg(inst.rs2())
    ))
}

fn branch(inst: u32) -> Option<String> {
    let mn = match inst.funct3() {
        0 => "beq",
        1 => "bne",
        4 => "blt",
        5 => "bge",
        6 => "bltu",
        7 => "bgeu",
        _ => return None,
    };
    Some(format!(
        "{mn} {}, {}, {}",
        xreg(inst.rs1()),
        xreg(inst.rs2()),
        inst.imm_b()
    ))
}

/// Precision suffix from the two-bit format field; half and quad are not handled.
fn precision(fmt: u32) -> Option<&'static str> {
    match fmt {
        0 => Some("s"),
        1 => Some("d"),
        _ => None,
    }
}

fn fused(inst: u32) -> Option<String> {
    let p = precision(inst.funct7() & 0x3)?;
    let mn = match inst.opcode() {
        op::MADD => "fmadd",
        op::MSUB => "fmsub",
        op::NMSUB => "fnmsub",
        _ => "fnmadd",
    };
    Some(format!(
        "{mn}.{p} {}, {}, {}, {}",
        freg(inst.rd()),
        freg(inst.rs1()),
        freg(inst.rs2()),
        freg(inst.rs3())
    ))
}

fn fp_arith(inst: u32) -> Option<String> {
    let f7 = inst.funct7();
    let p = precision(f7 & 0x3)?;
    let (rd, rs1, rs2) = (inst.rd(), inst.rs1(), inst.rs2());
    let f3 = inst.funct3();
    let int_fmt = |sel: usize| ["w", "wu", "l", "lu"].get(sel).copied();
    let three = |mn: &str| format!("{mn}.{p} {}, {}, {}", freg(rd), freg(rs1), freg(rs2));

    let text = match f7 >> 2 {
        0b00000 => three("fadd"),
        0b00001 => three("fsub"),
        0b00010 => three("fmul"),
        0b00011 => three("fdiv"),
        0b01011 if rs2 == 0 => format!("fsqrt.{p} {}, {}", freg(rd), freg(rs1)),
        0b00100 => three(["fsgnj", "fsgnjn", "fsgnjx"].get(f3 as usize)?),
        0b00101 => three(["fmin", "fmax"].get(f3 as usize)?),
        0b10100 => {
            let mn = ["fle", "flt", "feq"].get(f3 as usize)?;
            format!("{mn}.{p} {}, {}, {}", xreg(rd), freg(rs1), freg(rs2))
        }
        0b01000 => match (p, rs2) {
            ("s", 1) => format!("fcvt.s.d {}, {}", freg(rd), freg(rs1)),
            ("d", 0) => format!("fcvt.d.s {}, {}", freg(rd), freg(rs1)),
            _ => return None,
        },
        0b11000 => format!("fcvt.{}.{p} {}, {}", int_fmt(rs2)?, xreg(rd), freg(rs1)),
        0b11010 => format!("fcvt.{p}.{} {}, {}", int_fmt(rs2)?, freg(rd), xreg(rs1)),
        0b11100 if rs2 == 0 => match f3 {
            0 => {
                let w = if p == "d" { "d" } else { "w" };
                format!("fmv.x.{w} {}, {}", xreg(rd), freg(rs1))
            }
            1 => format!("fclass.{p} {}, {}", xreg(rd), freg(rs1)),
            _ => return None,
        },
        0b11110 if rs2 == 0 && f3 == 0 => {
            let w = if p == "d" { "d" } else { "w" };
            format!("fmv.{w}.x {}, {}", freg(rd), xreg(rs1))
        }
        _ => return None,
    };
    Some(text)
}

fn atomic(inst: u32) -> Option<String> {
    let width = match inst.funct3() {
        2 => "w",
        3 => "d",
        _ => return None,
    };
    let f7 = inst.funct7();
    let order = match f7 & 0x3 {
        0b11 => ".aqrl",
        0b10 => ".aq",
        0b01 => ".rl",
        _ => "",
    };
    let (rd, rs1, rs2) = (xreg(inst.rd()), xreg(inst.rs1()), xreg(inst.rs2()));
    let mn = match f7 >> 2 {
        0b00010 if inst.rs2() == 0 => return Some(format!("lr.{width}{order} {rd}, ({rs1})")),
        0b00011 => "sc",
        0b00001 => "amoswap",
        0b00000 => "amoadd",
        0b00100 => "amoxor",
        0b01100 => "amoand",
        0b01000 => "amoor",
        0b10000 => "amomin",
        0b10100 => "amomax",
        0b11000 => "amominu",
        0b11100 => "amomaxu",
        _ => return None,
    };
    Some(format!("{mn}.{width}{order} {rd}, {rs2}, ({rs1})"))
}

fn system(inst: u32) -> Option<String> {
    let fixed = match inst {
        op::ECALL => Some("ecall"),
        op::EBREAK => Some("ebreak"),
        op::URET => Some("uret"),
        op::SRET => Some("sret"),
        op::MRET => Some("mret"),
        op::WFI => Some("wfi"),
        _ => None,
    };
    if let Some(text) = fixed {
        return Some(text.to_string());
    }
    if inst & op::SFENCE_VMA_MASK == op::SFENCE_VMA {
        return Some(format!(
            "sfence.vma {}, {}",
            xreg(inst.rs1()),
            xreg(inst.rs2())
        ));
    }

    let (rd, csr) = (xreg(inst.rd()), inst.csr());
    let text = match inst.funct3() {
        1 => format!("csrrw {rd}, {csr:#x}, {}", xreg(inst.rs1())),
        2 => format!("csrrs {rd}, {csr:#x}, {}", xreg(inst.rs1())),
        3 => format!("csrrc {rd}, {csr:#x}, {}", xreg(inst.rs1())),
        5 => format!("csrrwi {rd}, {csr:#x}, {}", inst.rs1()),
        6 => format!("csrrsi {rd}, {csr:#x}, {}", inst.rs1()),
        7 => format!("csrrci {rd}, {csr:#x}, {}", inst.rs1()),
        _ => return None,
    };
    Some(text)
}
