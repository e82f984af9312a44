//! Field extraction for 32-bit encodings.

/// Bit-field accessors for a 32-bit instruction word.
pub trait InstructionBits {
    /// Major opcode, bits 6:0.
    fn opcode(&self) -> u32;
    /// Destination register, bits 11:7.
    fn rd(&self) -> usize;
    /// First source register, bits 19:15.
    fn rs1(&self) -> usize;
    /// Second source register, bits 24:20.
    fn rs2(&self) -> usize;
    /// Third source register of fused multiply-add, bits 31:27.
    fn rs3(&self) -> usize;
    /// Minor opcode, bits 14:12.
    fn funct3(&self) -> u32;
    /// Bits 31:25.
    fn funct7(&self) -> u32;
    /// CSR address, bits 31:20.
    fn csr(&self) -> u32;

    /// Sign-extended I-type immediate.
    fn imm_i(&self) -> i64;
    /// Sign-extended S-type immediate.
    fn imm_s(&self) -> i64;
    /// Sign-extended B-type branch offset.
    fn imm_b(&self) -> i64;
    /// Sign-extended J-type jump offset.
    fn imm_j(&self) -> i64;
    /// U-type immediate, the upper 20 bits unshifted.
    fn imm_u(&self) -> u32;
}

#[inline]
const fn reg(word: u32, shift: u32) -> usize {
    ((word >> shift) & 0x1f) as usize
}

/// Sign-extends the low `bits` bits of `value`.
#[inline]
pub(crate) const fn sign_extend(value: u64, bits: u32) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

impl InstructionBits for u32 {
    #[inline]
    fn opcode(&self) -> u32 {
        self & 0x7f
    }

    #[inline]
    fn rd(&self) -> usize {
        reg(*self, 7)
    }

    #[inline]
    fn rs1(&self) -> usize {
        reg(*self, 15)
    }

    #[inline]
    fn rs2(&self) -> usize {
        reg(*self, 20)
    }

    #[inline]
    fn rs3(&self) -> usize {
        reg(*self, 27)
    }

    #[inline]
    fn funct3(&self) -> u32 {
        (self >> 12) & 0x7
    }

    #[inline]
    fn funct7(&self) -> u32 {
        self >> 25
    }

    #[inline]
    fn csr(&self) -> u32 {
        self >> 20
    }

    fn imm_i(&self) -> i64 {
        sign_extend(u64::from(self >> 20), 12)
    }

    fn imm_s(&self) -> i64 {
        let v = ((self >> 25) << 5) | ((self >> 7) & 0x1f);
        sign_extend(u64::from(v), 12)
    }

    fn imm_b(&self) -> i64 {
        let v = ((self >> 31) << 12)
            | (((self >> 7) & 1) << 11)
            | (((self >> 25) & 0x3f) << 5)
            | (((self >> 8) & 0xf) << 1);
        sign_extend(u64::from(v), 13)
    }

    fn imm_j(&self) -> i64 {
        let v = ((self >> 31) << 20)
            | (((self >> 12) & 0xff) << 12)
            | (((self >> 20) & 1) << 11)
            | (((self >> 21) & 0x3ff) << 1);
        sign_extend(u64::from(v), 21)
    }

    fn imm_u(&self) -> u32 {
        self >> 12
    }
}
