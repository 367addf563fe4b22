//! Host capability queries for miner health checks
//!
//! Everything in this crate touches the machine the miner runs on: spawning
//! external tools under a deadline, reading the kernel memory table, asking
//! the filesystem for free space and listing GPUs. Each capability sits
//! behind a small trait so callers can substitute fakes.

pub mod disk;
pub mod exec;
pub mod gpu;
pub mod meminfo;

pub use disk::{DiskUsage, FsSpace, SpaceSource, BYTES_PER_GIB};
pub use exec::{
    CommandExecutor, CommandOutput, CommandSpec, ExecError, ExecResult, SystemExecutor,
};
pub use gpu::{parse_query_output, DeviceProvider, GpuDevice, Inventory, NvidiaSmi};
pub use meminfo::{MemInfo, MemInfoError, MemorySummary, KIB_PER_GIB, PROC_MEMINFO};
