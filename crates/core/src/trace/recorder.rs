//! Writing commit traces.
//!
//! The recorder keeps one slot per in-flight instruction, indexed by sequence number
//! modulo [`MAX_IN_FLIGHT`]. Stages stamp ticks into the slot; commit inserts the slot
//! as one row. A disabled recorder ignores every call.

use std::path::Path;

use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::{Connection, ToSql, params_from_iter};
use tracing::debug;

use super::{Stage, TABLE};
use crate::common::Result;

/// Slots in the in-flight ring; matches the simulator's dynamic instruction limit.
pub const MAX_IN_FLIGHT: usize = 1500;

/// Assembly column contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disasm {
    /// Simulator traces store text.
    Text(String),
    /// RTL traces store the raw encoding.
    Encoding(u64),
}

impl Default for Disasm {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for Disasm {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Disasm {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl ToSql for Disasm {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Text(text) => ToSqlOutput::from(text.as_str()),
            Self::Encoding(raw) => ToSqlOutput::Owned(Value::Integer(*raw as i64)),
        })
    }
}

#[derive(Debug, Clone, Default)]
struct InstMeta {
    seq: u64,
    ticks: [u64; Stage::COUNT],
    disasm: Disasm,
    pc: u64,
}

/// Records instruction lifetimes into a `LifeTimeCommitTrace` table.
#[derive(Debug)]
pub struct CommitTraceRecorder {
    db: Option<Connection>,
    metas: Vec<InstMeta>,
    committed: u64,
}

fn create_table_sql() -> String {
    let stages: Vec<String> = Stage::ALL
        .iter()
        .map(|stage| format!("{} INT NOT NULL", stage.column()))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {TABLE}(ID INTEGER PRIMARY KEY AUTOINCREMENT, {}, DISASM, PC INT NOT NULL)",
        stages.join(", ")
    )
}

const fn ring_index(seq: u64) -> usize {
    (seq % MAX_IN_FLIGHT as u64) as usize
}

fn insert_sql() -> String {
    let columns: Vec<&str> = Stage::ALL.iter().map(|stage| stage.column()).collect();
    let placeholders = vec!["?"; Stage::COUNT + 2].join(",");
    format!(
        "INSERT INTO {TABLE}({},DISASM,PC) VALUES({placeholders})",
        columns.join(",")
    )
}

impl CommitTraceRecorder {
    /// Recorder that ignores every call.
    pub fn disabled() -> Self {
        Self {
            db: None,
            metas: Vec::new(),
            committed: 0,
        }
    }

    /// Records into `conn`, creating the table if needed.
    pub fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(&create_table_sql())?;
        Ok(Self {
            db: Some(conn),
            metas: vec![InstMeta::default(); MAX_IN_FLIGHT],
            committed: 0,
        })
    }

    /// Records into the database file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Whether calls have any effect.
    pub fn is_enabled(&self) -> bool {
        self.db.is_some()
    }

    /// Rows inserted so far.
    pub fn committed(&self) -> u64 {
        self.committed
    }

    fn slot(&mut self, seq: u64) -> Option<&mut InstMeta> {
        if self.db.is_none() {
            return None;
        }
        self.metas.get_mut(ring_index(seq))
    }

    /// Starts tracking instruction `seq`, overwriting whatever held its slot.
    pub fn create_meta(&mut self, seq: u64, pc: u64, disasm: impl Into<Disasm>) {
        if let Some(meta) = self.slot(seq) {
            *meta = InstMeta {
                seq,
                ticks: [0; Stage::COUNT],
                disasm: disasm.into(),
                pc,
            };
        }
    }

    /// Stamps `tick` as the time `seq` reached `stage`.
    pub fn update_inst_pos(&mut self, seq: u64, stage: Stage, tick: u64) {
        if let Some(meta) = self.slot(seq) {
            meta.ticks[stage.index()] = tick;
        }
    }

    /// Writes `seq`'s row.
    pub fn commit_meta(&mut self, seq: u64) -> Result<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };
        let Some(meta) = self.metas.get(ring_index(seq)) else {
            return Ok(());
        };
        if meta.seq != seq {
            debug!("commit of {seq} finds slot reused by {}", meta.seq);
        }
        let mut values: Vec<Box<dyn ToSql>> = meta
            .ticks
            .iter()
            .map(|tick| Box::new(*tick as i64) as Box<dyn ToSql>)
            .collect();
        values.push(Box::new(meta.disasm.clone()));
        values.push(Box::new(meta.pc as i64));

        let mut stmt = db.prepare_cached(&insert_sql())?;
        let _ = stmt.execute(params_from_iter(values.iter()))?;
        self.committed += 1;
        Ok(())
    }

    /// Hands back the connection, if recording was enabled.
    pub fn into_connection(self) -> Option<Connection> {
        self.db
    }
}
