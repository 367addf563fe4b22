//! The built-in probes, in report order

pub mod disk;
pub mod env;
pub mod gpu;
pub mod memory;
pub mod storage;
pub mod wallet;

pub use disk::DiskSpaceProbe;
pub use env::{EnvironmentProbe, REQUIRED_VARS};
pub use gpu::GpuProbe;
pub use memory::MemoryProbe;
pub use storage::StorageProbe;
pub use wallet::WalletProbe;

use crate::probe::ProbeSet;

/// The standard miner checklist
pub fn default_probes() -> ProbeSet {
    ProbeSet::new()
        .with(Box::new(EnvironmentProbe))
        .with(Box::new(GpuProbe))
        .with(Box::new(WalletProbe))
        .with(Box::new(StorageProbe))
        .with(Box::new(DiskSpaceProbe))
        .with(Box::new(MemoryProbe))
}
