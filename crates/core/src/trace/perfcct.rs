//! Per-instruction pipeline view.

use std::io::Write;

use super::{Stage, TraceEntry};
use crate::common::{Error, Result};

/// Marker appended to attention PCs.
const ATTENTION_MARK: &str = "<<====";

/// Which instructions the pipeline view prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfCctOptions {
    /// Lowest PC printed.
    pub start_pc: u64,
    /// Highest PC printed; a blank line follows each instance of it.
    pub end_pc: u64,
    /// PCs to mark.
    pub attention_pcs: Vec<u64>,
    /// Print only attention PCs, ignoring the PC range.
    pub only_attention: bool,
}

impl Default for PerfCctOptions {
    fn default() -> Self {
        Self {
            start_pc: 0,
            end_pc: u64::MAX,
            attention_pcs: Vec::new(),
            only_attention: false,
        }
    }
}

impl PerfCctOptions {
    fn wants(&self, pc: u64) -> bool {
        if self.only_attention {
            self.attention_pcs.contains(&pc)
        } else {
            (self.start_pc..=self.end_pc).contains(&pc)
        }
    }
}

/// Parses a hexadecimal PC, with or without a `0x` prefix.
pub fn parse_pc(text: &str) -> Result<u64> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u64::from_str_radix(digits, 16).map_err(|_| Error::Trace(format!("invalid PC {text}")))
}

/// Formats one pipeline line, without the trailing newline.
pub fn format_line(entry: &TraceEntry, attention: bool) -> String {
    let mut line = format!("{:18} : {:30} : ", entry.pc_hex(), entry.asm);
    for (stage, clock) in Stage::ALL.iter().zip(&entry.clocks) {
        line.push_str(&format!("{} {} : ", stage.short_name(), clock.trunc() as i64));
    }
    if attention {
        line.push_str(ATTENTION_MARK);
        line.push(' ');
    }
    line
}

/// Writes the pipeline view of `entries`.
pub fn write_report(
    out: &mut impl Write,
    entries: &[TraceEntry],
    options: &PerfCctOptions,
) -> std::io::Result<()> {
    for entry in entries.iter().filter(|e| options.wants(e.pc)) {
        let attention = options.attention_pcs.contains(&entry.pc);
        writeln!(out, "{}", format_line(entry, attention))?;
        if entry.pc == options.end_pc {
            writeln!(out)?;
        }
    }
    Ok(())
}
