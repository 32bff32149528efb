//! Paged virtual-memory simulator: translates 20-bit virtual addresses
//! through a TLB and page table, faulting pages in from a backing store into
//! a fixed pool of frames under FIFO or LRU replacement.

pub mod address;
pub mod config;
pub mod error;
pub mod frame_store;
pub mod mmu;
pub mod page_loader;
pub mod page_replacer;
pub mod page_table;
pub mod stats;
pub mod tlb;

pub use address::VirtualAddress;
pub use config::{MmuConfig, ReplacementPolicy};
pub use error::VmError;
pub use mmu::Mmu;
pub use page_loader::{InMemoryPageLoader, PageLoader};
pub use stats::{Outcome, RunSummary, Statistics, Translation};
