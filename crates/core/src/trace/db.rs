//! Reading `LifeTimeCommitTrace` tables.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

use indicatif::ProgressBar;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row, params_from_iter};
use tracing::{debug, info};

use super::{TABLE, TraceEntry};
use crate::common::{Error, Result};
use crate::isa::disassemble_any;

/// Ticks per clock cycle of the default simulated frequency.
pub const DEFAULT_PERIOD: u64 = 333;

/// Producer of the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// Simulator trace: ticks, assembly text.
    #[default]
    Gem5,
    /// RTL trace: cycles, raw instruction encodings.
    Rtl,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gem5 => "gem5",
            Self::Rtl => "rtl",
        })
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gem5" => Ok(Self::Gem5),
            "rtl" => Ok(Self::Rtl),
            _ => Err(Error::Unknown {
                what: "platform",
                value: s.to_string(),
            }),
        }
    }
}

/// Row selection for [`read_trace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceQuery {
    /// First commit clock to keep.
    pub start_clock: u64,
    /// Last commit clock to keep; ignored when before `start_clock`.
    pub end_clock: Option<u64>,
    /// Ticks per clock.
    pub period: u64,
    /// Trace producer.
    pub platform: Platform,
    /// Maximum number of rows.
    pub limit: Option<u64>,
}

impl Default for TraceQuery {
    fn default() -> Self {
        Self {
            start_clock: 0,
            end_clock: None,
            period: DEFAULT_PERIOD,
            platform: Platform::Gem5,
            limit: None,
        }
    }
}

impl TraceQuery {
    /// Period actually used; RTL traces are stamped in cycles.
    pub fn effective_period(&self) -> u64 {
        match self.platform {
            Platform::Rtl => 1,
            Platform::Gem5 => self.period.max(1),
        }
    }

    /// WHERE clause and its bound tick values.
    fn filter(&self) -> (String, Vec<i64>) {
        let period = self.effective_period();
        let to_tick = |clock: u64| i64::try_from(clock.saturating_mul(period)).unwrap_or(i64::MAX);
        let mut clause = "WHERE AtCommit >= ?1".to_string();
        let mut bounds = vec![to_tick(self.start_clock)];
        if let Some(end) = self.end_clock.filter(|end| *end >= self.start_clock) {
            clause.push_str(" AND AtCommit <= ?2");
            bounds.push(to_tick(end));
        }
        (clause, bounds)
    }

    /// SELECT statement for the trace rows.
    pub fn select_sql(&self) -> String {
        let (clause, _) = self.filter();
        match self.limit {
            Some(limit) => format!("SELECT * FROM {TABLE} {clause} ORDER BY ID ASC LIMIT {limit}"),
            None => format!("SELECT * FROM {TABLE} {clause} ORDER BY ID ASC"),
        }
    }

    fn count_sql(&self) -> String {
        let (clause, _) = self.filter();
        let limit = self
            .limit
            .map(|limit| format!(" LIMIT {limit}"))
            .unwrap_or_default();
        format!("SELECT COUNT(*) FROM (SELECT ID FROM {TABLE} {clause}{limit})")
    }
}

/// What a column carries, from its lower-cased name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRole {
    Clock,
    Pc,
    Disasm,
    Other,
}

impl ColumnRole {
    fn of(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.starts_with("at") {
            Self::Clock
        } else if lower.starts_with("pc") {
            Self::Pc
        } else if lower.starts_with("disasm") {
            Self::Disasm
        } else {
            Self::Other
        }
    }
}

/// Memoised disassembly of raw encodings; RTL traces repeat the same few thousand.
#[derive(Debug, Default)]
struct DisasmCache {
    memo: HashMap<u64, String>,
}

impl DisasmCache {
    fn get(&mut self, raw: u64) -> String {
        self.memo
            .entry(raw)
            .or_insert_with(|| disassemble_any(raw))
            .clone()
    }

    fn text(&mut self, value: ValueRef<'_>, platform: Platform) -> String {
        match (value, platform) {
            (ValueRef::Integer(raw), Platform::Rtl) => self.get(raw as u64),
            (ValueRef::Integer(raw), Platform::Gem5) => raw.to_string(),
            (ValueRef::Text(text), Platform::Rtl) => {
                let text = String::from_utf8_lossy(text);
                match parse_encoding(&text) {
                    Some(raw) => self.get(raw),
                    None => text.into_owned(),
                }
            }
            (ValueRef::Text(text), Platform::Gem5) => String::from_utf8_lossy(text).into_owned(),
            (ValueRef::Real(v), _) => v.to_string(),
            (ValueRef::Null | ValueRef::Blob(_), _) => String::new(),
        }
    }
}

struct RowDecoder {
    roles: Vec<ColumnRole>,
    period: i64,
    platform: Platform,
    cache: DisasmCache,
}

impl RowDecoder {
    fn decode(&mut self, row: &Row<'_>) -> Result<TraceEntry> {
        let mut clocks = Vec::new();
        let mut pc = None;
        let mut asm = None;
        // Column 0 is the row ID.
        for (offset, role) in self.roles.iter().enumerate() {
            let column = offset + 1;
            let value = row.get_ref(column)?;
            match *role {
                ColumnRole::Clock => clocks.push(self.clock(value, column)?),
                ColumnRole::Pc => pc = Some(pc_value(value, column)?),
                ColumnRole::Disasm => asm = Some(self.cache.text(value, self.platform)),
                ColumnRole::Other => {}
            }
        }
        let pc = pc.ok_or_else(|| Error::Trace("no PC column".to_string()))?;
        let asm = asm.ok_or_else(|| Error::Trace("no DISASM column".to_string()))?;
        Ok(TraceEntry { pc, asm, clocks })
    }

    fn clock(&self, value: ValueRef<'_>, column: usize) -> Result<f64> {
        match value {
            ValueRef::Integer(tick) => Ok(tick.div_euclid(self.period) as f64),
            ValueRef::Real(tick) => Ok((tick / self.period as f64).floor()),
            _ => Err(Error::Trace(format!(
                "column {column} holds a non-numeric tick"
            ))),
        }
    }
}

fn parse_encoding(text: &str) -> Option<u64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// SQLite integers are signed; PCs at or above 2^63 come back negative.
fn pc_value(value: ValueRef<'_>, column: usize) -> Result<u64> {
    match value {
        ValueRef::Integer(pc) => Ok(pc as u64),
        _ => Err(Error::Trace(format!("column {column} holds a non-integer PC"))),
    }
}

fn open_read_only(path: &Path) -> Result<Connection> {
    if !path.exists() {
        return Err(Error::Io {
            path: path.to_path_buf(),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
    }
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(conn)
}

/// Reads the rows `query` selects from the trace at `path`, in ID order.
///
/// When `progress` is given its length is set to the row count and it advances once
/// per row.
pub fn read_trace(
    path: &Path,
    query: &TraceQuery,
    progress: Option<&ProgressBar>,
) -> Result<Vec<TraceEntry>> {
    let conn = open_read_only(path)?;
    let (_, bounds) = query.filter();

    if let Some(pb) = progress {
        let total: i64 =
            conn.query_row(&query.count_sql(), params_from_iter(bounds.iter()), |r| r.get(0))?;
        pb.set_length(u64::try_from(total).unwrap_or(0));
    }

    let sql = query.select_sql();
    debug!("trace query: {sql}");
    let mut stmt = conn.prepare(&sql)?;
    let roles: Vec<ColumnRole> = stmt
        .column_names()
        .iter()
        .skip(1)
        .map(|name| ColumnRole::of(name))
        .collect();
    if !roles.contains(&ColumnRole::Clock) {
        return Err(Error::Trace(format!("{TABLE} has no stage columns")));
    }

    let period = i64::try_from(query.effective_period()).unwrap_or(i64::MAX);
    let mut decoder = RowDecoder {
        roles,
        period,
        platform: query.platform,
        cache: DisasmCache::default(),
    };

    let mut entries = Vec::new();
    let mut rows = stmt.query(params_from_iter(bounds.iter()))?;
    while let Some(row) = rows.next()? {
        entries.push(decoder.decode(row)?);
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }
    info!(
        "read {} instructions from {} ({} distinct encodings disassembled)",
        entries.len(),
        path.display(),
        decoder.cache.memo.len()
    );
    Ok(entries)
}
