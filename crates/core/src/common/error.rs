//! Error definitions.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation failures carry
//! enough context (cache name, issue queue name, prefetch level, path) to be printed
//! directly to the user.

use std::path::{Path, PathBuf};

/// Errors raised while building configurations, reading traces or managing checkpoints.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Filesystem access failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The trace database could not be opened or queried.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// A JSON document could not be parsed or produced.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A memory size string such as `"64KiB"` could not be parsed.
    #[error("invalid memory size {0:?}")]
    InvalidSize(String),

    /// A cache parameter record is inconsistent.
    #[error("cache {name}: {reason}")]
    InvalidCache {
        /// Cache name (`l1d`, `l2`, ...).
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A register-file read port descriptor is out of range.
    #[error("register-file read port: {0}")]
    PortEncoding(String),

    /// The issue-queue topology is inconsistent.
    #[error("scheduler: {0}")]
    Topology(String),

    /// A prefetcher could not be constructed for a cache level.
    #[error("prefetcher at {level}: {reason}")]
    Prefetcher {
        /// Cache level (`l1d`, `l2`, `l3`).
        level: String,
        /// What is wrong.
        reason: String,
    },

    /// The commit trace or its query is malformed.
    #[error("trace: {0}")]
    Trace(String),

    /// The checkpoint directory layout or run bookkeeping is inconsistent.
    #[error("checkpoint: {0}")]
    Checkpoint(String),

    /// A named item (preset, benchmark, prefetcher kind) does not exist.
    #[error("unknown {what} {value:?}")]
    Unknown {
        /// Kind of item looked up.
        what: &'static str,
        /// Name that was not found.
        value: String,
    },
}

/// Result alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Attaches the offending path to an [`std::io::Error`].
pub trait IoContext<T> {
    /// Converts the I/O result into a crate result tagged with `path`.
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
