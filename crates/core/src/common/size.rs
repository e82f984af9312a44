//! Memory sizes as the simulator writes them.
//!
//! Sizes are binary multiples: `"1kB"` and `"1KiB"` are both 1024 bytes. A bare integer
//! (in a string or as a JSON number) is a byte count.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::Error;

const KIB: u64 = 1 << 10;
const MIB: u64 = 1 << 20;
const GIB: u64 = 1 << 30;

/// A size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "SizeRepr", into = "String")]
pub struct MemorySize(u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeRepr {
    Bytes(u64),
    Text(String),
}

impl TryFrom<SizeRepr> for MemorySize {
    type Error = Error;

    fn try_from(repr: SizeRepr) -> Result<Self, Self::Error> {
        match repr {
            SizeRepr::Bytes(bytes) => Ok(Self(bytes)),
            SizeRepr::Text(text) => text.parse(),
        }
    }
}

impl From<MemorySize> for String {
    fn from(size: MemorySize) -> Self {
        size.to_string()
    }
}

impl MemorySize {
    /// Size of `n` bytes.
    pub const fn bytes(n: u64) -> Self {
        Self(n)
    }

    /// Size of `n` KiB.
    pub const fn kib(n: u64) -> Self {
        Self(n * KIB)
    }

    /// Size of `n` MiB.
    pub const fn mib(n: u64) -> Self {
        Self(n * MIB)
    }

    /// Byte count.
    pub const fn as_bytes(self) -> u64 {
        self.0
    }
}

impl FromStr for MemorySize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let split = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let (digits, unit) = text.split_at(split);
        let value: u64 = digits
            .parse()
            .map_err(|_| Error::InvalidSize(s.to_string()))?;
        let scale = match unit.trim() {
            "" | "B" => 1,
            "kB" | "KB" | "KiB" => KIB,
            "MB" | "MiB" => MIB,
            "GB" | "GiB" => GIB,
            _ => return Err(Error::InvalidSize(s.to_string())),
        };
        value
            .checked_mul(scale)
            .map(Self)
            .ok_or_else(|| Error::InvalidSize(s.to_string()))
    }
}

impl fmt::Display for MemorySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        if n != 0 && n % GIB == 0 {
            write!(f, "{}GB", n / GIB)
        } else if n != 0 && n % MIB == 0 {
            write!(f, "{}MB", n / MIB)
        } else if n != 0 && n % KIB == 0 {
            write!(f, "{}kB", n / KIB)
        } else {
            write!(f, "{n}B")
        }
    }
}
