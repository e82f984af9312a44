//! Functional units and the operation classes they execute.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operation class of an instruction, the unit of dispatch to issue queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OpClass {
    /// Integer add/logic/shift.
    IntAlu,
    /// Integer multiply.
    IntMult,
    /// Integer divide/remainder.
    IntDiv,
    /// Branches and jumps.
    Branch,
    /// CSR access, fences and other serialising integer ops.
    IprAccess,
    /// FP add/subtract.
    FloatAdd,
    /// FP compare.
    FloatCmp,
    /// FP conversion.
    FloatCvt,
    /// FP multiply.
    FloatMult,
    /// FP fused multiply-add.
    FloatMultAcc,
    /// FP sign injection, class, moves.
    FloatMisc,
    /// FP divide.
    FloatDiv,
    /// FP square root.
    FloatSqrt,
    /// Vector integer add.
    SimdAdd,
    /// Vector integer logic.
    SimdAlu,
    /// Vector compare.
    SimdCmp,
    /// Vector conversion.
    SimdCvt,
    /// Vector permutes and moves.
    SimdMisc,
    /// Vector integer multiply.
    SimdMult,
    /// Vector integer multiply-add.
    SimdMultAcc,
    /// Vector shift.
    SimdShift,
    /// Vector integer divide.
    SimdDiv,
    /// Vector FP add.
    SimdFloatAdd,
    /// Vector FP multiply.
    SimdFloatMult,
    /// Vector FP multiply-add.
    SimdFloatMultAcc,
    /// Vector FP divide.
    SimdFloatDiv,
    /// Integer load.
    MemRead,
    /// Integer store.
    MemWrite,
    /// FP load.
    FloatMemRead,
    /// FP store.
    FloatMemWrite,
}

impl OpClass {
    /// Every op class, in declaration order.
    pub const ALL: [Self; 30] = [
        Self::IntAlu,
        Self::IntMult,
        Self::IntDiv,
        Self::Branch,
        Self::IprAccess,
        Self::FloatAdd,
        Self::FloatCmp,
        Self::FloatCvt,
        Self::FloatMult,
        Self::FloatMultAcc,
        Self::FloatMisc,
        Self::FloatDiv,
        Self::FloatSqrt,
        Self::SimdAdd,
        Self::SimdAlu,
        Self::SimdCmp,
        Self::SimdCvt,
        Self::SimdMisc,
        Self::SimdMult,
        Self::SimdMultAcc,
        Self::SimdShift,
        Self::SimdDiv,
        Self::SimdFloatAdd,
        Self::SimdFloatMult,
        Self::SimdFloatMultAcc,
        Self::SimdFloatDiv,
        Self::MemRead,
        Self::MemWrite,
        Self::FloatMemRead,
        Self::FloatMemWrite,
    ];

    /// Dense index, usable as a table offset.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for OpClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One operation a functional unit can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpDesc {
    /// Operation class.
    pub op: OpClass,
    /// Execution latency in cycles.
    pub latency: u32,
    /// A new operation can start every cycle.
    pub pipelined: bool,
}

const fn op(op: OpClass, latency: u32) -> OpDesc {
    OpDesc {
        op,
        latency,
        pipelined: true,
    }
}

const fn unpiped(op: OpClass, latency: u32) -> OpDesc {
    OpDesc {
        op,
        latency,
        pipelined: false,
    }
}

const INT_ALU: &[OpDesc] = &[op(OpClass::IntAlu, 1)];
const INT_MULT: &[OpDesc] = &[op(OpClass::IntMult, 3)];
const INT_DIV: &[OpDesc] = &[unpiped(OpClass::IntDiv, 20)];
const INT_BRU: &[OpDesc] = &[op(OpClass::Branch, 1)];
const INT_MISC: &[OpDesc] = &[unpiped(OpClass::IprAccess, 1)];
const FP_ALU: &[OpDesc] = &[
    op(OpClass::FloatAdd, 3),
    op(OpClass::FloatCmp, 3),
    op(OpClass::FloatCvt, 3),
];
const FP_MAC: &[OpDesc] = &[op(OpClass::FloatMult, 3), op(OpClass::FloatMultAcc, 4)];
const FP_MISC: &[OpDesc] = &[op(OpClass::FloatMisc, 3)];
const FP_SLOW: &[OpDesc] = &[
    unpiped(OpClass::FloatDiv, 11),
    unpiped(OpClass::FloatSqrt, 14),
];
const SIMD_UNIT: &[OpDesc] = &[
    op(OpClass::SimdAdd, 2),
    op(OpClass::SimdAlu, 2),
    op(OpClass::SimdCmp, 2),
    op(OpClass::SimdCvt, 3),
    op(OpClass::SimdMisc, 2),
    op(OpClass::SimdMult, 3),
    op(OpClass::SimdMultAcc, 3),
    op(OpClass::SimdShift, 2),
    unpiped(OpClass::SimdDiv, 20),
    op(OpClass::SimdFloatAdd, 3),
    op(OpClass::SimdFloatMult, 3),
    op(OpClass::SimdFloatMultAcc, 4),
    unpiped(OpClass::SimdFloatDiv, 20),
];
const READ_PORT: &[OpDesc] = &[op(OpClass::MemRead, 1), op(OpClass::FloatMemRead, 1)];
const WRITE_PORT: &[OpDesc] = &[op(OpClass::MemWrite, 1), op(OpClass::FloatMemWrite, 1)];
const RD_WR_PORT: &[OpDesc] = &[
    op(OpClass::MemRead, 1),
    op(OpClass::FloatMemRead, 1),
    op(OpClass::MemWrite, 1),
    op(OpClass::FloatMemWrite, 1),
];

/// Functional unit kinds an issue port can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuncUnit {
    /// Integer ALU.
    #[serde(rename = "IntALU")]
    IntAlu,
    /// Integer multiplier.
    IntMult,
    /// Integer divider.
    IntDiv,
    /// Branch resolution unit.
    #[serde(rename = "IntBRU")]
    IntBru,
    /// CSR/fence unit.
    IntMisc,
    /// FP adder/comparator/converter.
    #[serde(rename = "FP_ALU")]
    FpAlu,
    /// FP multiply-accumulate.
    #[serde(rename = "FP_MAC")]
    FpMac,
    /// FP miscellaneous.
    #[serde(rename = "FP_MISC")]
    FpMisc,
    /// FP divide/sqrt.
    #[serde(rename = "FP_SLOW")]
    FpSlow,
    /// Vector unit.
    #[serde(rename = "SIMD_Unit")]
    SimdUnit,
    /// Load pipe.
    ReadPort,
    /// Store pipe.
    WritePort,
    /// Combined load/store pipe.
    RdWrPort,
}

impl FuncUnit {
    /// Operations executed by this unit.
    pub const fn ops(self) -> &'static [OpDesc] {
        match self {
            Self::IntAlu => INT_ALU,
            Self::IntMult => INT_MULT,
            Self::IntDiv => INT_DIV,
            Self::IntBru => INT_BRU,
            Self::IntMisc => INT_MISC,
            Self::FpAlu => FP_ALU,
            Self::FpMac => FP_MAC,
            Self::FpMisc => FP_MISC,
            Self::FpSlow => FP_SLOW,
            Self::SimdUnit => SIMD_UNIT,
            Self::ReadPort => READ_PORT,
            Self::WritePort => WRITE_PORT,
            Self::RdWrPort => RD_WR_PORT,
        }
    }
}
