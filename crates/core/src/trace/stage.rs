//! Pipeline stages recorded in a commit trace.

use std::fmt;

/// A point in an instruction's lifetime where the simulator stamps the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Fetched.
    Fetch,
    /// Decoded.
    Decode,
    /// Renamed.
    Rename,
    /// Entered the dispatch queue.
    Dispatch,
    /// Entered an issue queue.
    Issue,
    /// Won read-port arbitration.
    Arb,
    /// Read its source registers.
    Read,
    /// Started executing.
    Execute,
    /// Result bypassed.
    Bypass,
    /// Result written back.
    Writeback,
    /// Committed.
    Commit,
}

impl Stage {
    /// Stages in pipeline order; also the column order of the trace table.
    pub const ALL: [Self; 11] = [
        Self::Fetch,
        Self::Decode,
        Self::Rename,
        Self::Dispatch,
        Self::Issue,
        Self::Arb,
        Self::Read,
        Self::Execute,
        Self::Bypass,
        Self::Writeback,
        Self::Commit,
    ];

    /// Number of stages.
    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`Stage::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Report name.
    pub const fn long_name(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Decode => "decode",
            Self::Rename => "rename",
            Self::Dispatch => "dispatch",
            Self::Issue => "issue",
            Self::Arb => "arb",
            Self::Read => "read",
            Self::Execute => "execute",
            Self::Bypass => "bypass",
            Self::Writeback => "writeback",
            Self::Commit => "commit",
        }
    }

    /// One-letter tag used by the pipeline view.
    pub const fn short_name(self) -> char {
        match self {
            Self::Fetch => 'f',
            Self::Decode => 'd',
            Self::Rename => 'r',
            Self::Dispatch => 'D',
            Self::Issue => 'i',
            Self::Arb => 'a',
            Self::Read => 'g',
            Self::Execute => 'e',
            Self::Bypass => 'b',
            Self::Writeback => 'w',
            Self::Commit => 'c',
        }
    }

    /// Column holding this stage's tick.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Fetch => "AtFetch",
            Self::Decode => "AtDecode",
            Self::Rename => "AtRename",
            Self::Dispatch => "AtDispQue",
            Self::Issue => "AtIssueQue",
            Self::Arb => "AtIssueArb",
            Self::Read => "AtIssueReadReg",
            Self::Execute => "AtFU",
            Self::Bypass => "AtBypassVal",
            Self::Writeback => "AtWriteVal",
            Self::Commit => "AtCommit",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}
