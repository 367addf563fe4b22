//! Filesystem space queries

use std::io;
use std::path::Path;

/// Bytes per gibibyte
pub const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Size and free space of a filesystem, in bytes
///
/// `free_bytes` is the space available to unprivileged users, which is
/// what a miner process can actually write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl DiskUsage {
    pub fn from_gib(total_gib: u64, free_gib: u64) -> Self {
        const GIB: u64 = 1024 * 1024 * 1024;
        Self {
            total_bytes: total_gib * GIB,
            free_bytes: free_gib * GIB,
        }
    }

    pub fn total_gib(&self) -> f64 {
        self.total_bytes as f64 / BYTES_PER_GIB
    }

    pub fn free_gib(&self) -> f64 {
        self.free_bytes as f64 / BYTES_PER_GIB
    }

    pub fn percent_free(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.free_bytes as f64 / self.total_bytes as f64 * 100.0
    }
}

/// Source of filesystem space figures
pub trait SpaceSource: Send + Sync {
    fn usage(&self, path: &Path) -> io::Result<DiskUsage>;
}

/// Space figures from the operating system (`statvfs` on Unix)
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSpace;

impl SpaceSource for FsSpace {
    fn usage(&self, path: &Path) -> io::Result<DiskUsage> {
        Ok(DiskUsage {
            total_bytes: fs2::total_space(path)?,
            free_bytes: fs2::available_space(path)?,
        })
    }
}
