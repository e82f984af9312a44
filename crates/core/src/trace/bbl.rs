//! Basic-block frequency report.

use std::io::Write;

use indexmap::IndexMap;

use super::{InstKey, Stage, TraceAnalysis, TraceEntry};

/// Blocks listed by [`write_report`].
pub const TOP_BLOCKS: usize = 10;

/// Mnemonic prefixes that end a basic block.
const BRANCH_PREFIXES: &[&str] = &[
    "beq", "bne", "blt", "bge", "bltu", "bgeu", "beqz", "bnez", "j", "jal", "jalr", "ret",
    "c_beqz", "c_bnez", "c_j", "c_jal", "c_jr", "c_jalr", "c.beqz", "c.bnez", "c.j", "c.jal",
    "c.jr", "c.jalr",
];

/// Whether `asm` is a control transfer, judged by its first word.
pub fn is_branch(asm: &str) -> bool {
    asm.split_whitespace()
        .next()
        .is_some_and(|mnemonic| BRANCH_PREFIXES.iter().any(|p| mnemonic.starts_with(p)))
}

/// A basic block and how often it executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCount {
    /// Instructions of the block, in order.
    pub insts: Vec<InstKey>,
    /// Executions.
    pub count: usize,
}

/// Splits `entries` into basic blocks and counts them, in first-seen order.
///
/// A block ends after each branch; a trailing block without one still counts.
pub fn basic_blocks(entries: &[TraceEntry]) -> Vec<BlockCount> {
    let mut counts: IndexMap<Vec<InstKey>, usize> = IndexMap::new();
    let mut current = Vec::new();
    for entry in entries {
        current.push(entry.key());
        if is_branch(&entry.asm) {
            *counts.entry(std::mem::take(&mut current)).or_default() += 1;
        }
    }
    if !current.is_empty() {
        *counts.entry(current).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(insts, count)| BlockCount { insts, count })
        .collect()
}

/// The `n` most frequent blocks; equal counts keep first-seen order.
pub fn most_common(mut blocks: Vec<BlockCount>, n: usize) -> Vec<BlockCount> {
    blocks.sort_by(|a, b| b.count.cmp(&a.count));
    blocks.truncate(n);
    blocks
}

/// Writes the top basic blocks of `analysis`.
///
/// In gap modes every instruction line carries its mean stage values.
pub fn write_report(out: &mut impl Write, analysis: &TraceAnalysis) -> std::io::Result<()> {
    let gap = analysis.mode.is_gap();
    let blocks = most_common(basic_blocks(&analysis.entries), TOP_BLOCKS);

    writeln!(
        out,
        "Top {TOP_BLOCKS} most common basic blocks (mode:{}):",
        analysis.mode
    )?;
    for block in &blocks {
        writeln!(out)?;
        writeln!(out, "Count: {}", block.count)?;
        writeln!(out, "Instructions:")?;
        if gap {
            let stages: Vec<String> = Stage::ALL
                .iter()
                .map(|stage| format!("{:>9}", stage.long_name()))
                .collect();
            writeln!(out, "  {:18} : {:30} : {}", "PC", "Instruction", stages.join(":"))?;
        } else {
            writeln!(out, "  {:18} : {:30} ", "PC", "Instruction")?;
        }

        for key in &block.insts {
            let (pc, asm) = key;
            let pc = format!("{pc:#x}");
            match analysis.averages.get(key).filter(|_| gap) {
                Some(means) => {
                    let clocks: Vec<String> = means.iter().map(|c| format!("{c:9.2}")).collect();
                    writeln!(out, "  {pc:18} : {asm:30} : {}", clocks.join(":"))?;
                }
                None => writeln!(out, "  {pc:18} : {asm:30} ")?,
            }
        }
    }
    Ok(())
}
