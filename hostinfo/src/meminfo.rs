//! Parsing of the kernel memory table (`/proc/meminfo`)
//!
//! Lines look like `MemTotal:       263921172 kB`. Values are kibibytes.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Default location of the kernel memory table
pub const PROC_MEMINFO: &str = "/proc/meminfo";

/// Kibibytes per gibibyte
pub const KIB_PER_GIB: f64 = 1024.0 * 1024.0;

const MEM_TOTAL: &str = "MemTotal";
const MEM_AVAILABLE: &str = "MemAvailable";

/// Errors reading or interpreting the memory table
#[derive(Error, Debug)]
pub enum MemInfoError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Malformed value on line {line}: '{content}'")]
    Malformed { line: usize, content: String },

    #[error("Field '{0}' missing from memory table")]
    MissingField(&'static str),

    #[error("MemTotal is zero")]
    ZeroTotal,
}

/// Parsed memory table, values in KiB keyed by field name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemInfo {
    fields: HashMap<String, u64>,
}

impl MemInfo {
    /// Parse the text of a memory table
    ///
    /// Lines without a `:` separator are ignored. A field whose value does
    /// not start with an unsigned integer is an error.
    pub fn parse(text: &str) -> Result<Self, MemInfoError> {
        let mut fields = HashMap::new();

        for (index, line) in text.lines().enumerate() {
            let Some((key, rest)) = line.split_once(':') else {
                continue;
            };

            let value = rest
                .split_whitespace()
                .next()
                .and_then(|v| v.parse::<u64>().ok())
                .ok_or_else(|| MemInfoError::Malformed {
                    line: index + 1,
                    content: line.to_string(),
                })?;

            fields.insert(key.trim().to_string(), value);
        }

        Ok(Self { fields })
    }

    /// Read and parse the memory table at `path`
    pub fn read(path: impl AsRef<Path>) -> Result<Self, MemInfoError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MemInfoError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&text)
    }

    pub fn get_kib(&self, key: &str) -> Option<u64> {
        self.fields.get(key).copied()
    }

    /// Total and available memory in GiB
    pub fn summary(&self) -> Result<MemorySummary, MemInfoError> {
        let total_kib = self
            .get_kib(MEM_TOTAL)
            .ok_or(MemInfoError::MissingField(MEM_TOTAL))?;
        let available_kib = self
            .get_kib(MEM_AVAILABLE)
            .ok_or(MemInfoError::MissingField(MEM_AVAILABLE))?;

        if total_kib == 0 {
            return Err(MemInfoError::ZeroTotal);
        }

        Ok(MemorySummary {
            total_gib: total_kib as f64 / KIB_PER_GIB,
            available_gib: available_kib as f64 / KIB_PER_GIB,
        })
    }
}

/// Memory totals in GiB
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemorySummary {
    pub total_gib: f64,
    pub available_gib: f64,
}

impl MemorySummary {
    pub fn percent_available(&self) -> f64 {
        if self.total_gib > 0.0 {
            self.available_gib / self.total_gib * 100.0
        } else {
            0.0
        }
    }
}
