use std::fmt;

use crate::address::VirtualAddress;

/// How an address was resolved to a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    TlbHit,
    PageTableHit,
    PageFault,
}

/// One line of the per-address trace.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Translation {
    pub virtual_address: VirtualAddress,
    pub physical_address: u32,
    pub value: i8,
    pub outcome: Outcome,
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Virtual address: {} Physical address: {} Value: {}",
            self.virtual_address, self.physical_address, self.value
        )
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub total_addresses: u64,
    pub tlb_hits: u64,
    pub page_table_hits: u64,
    pub page_faults: u64,
}

impl Statistics {
    pub fn record(&mut self, outcome: Outcome) {
        self.total_addresses += 1;

        match outcome {
            Outcome::TlbHit => self.tlb_hits += 1,
            Outcome::PageTableHit => self.page_table_hits += 1,
            Outcome::PageFault => self.page_faults += 1,
        }
    }

    fn rate(count: u64, total: u64) -> Option<f64> {
        if total == 0 {
            None
        } else {
            Some(count as f64 / total as f64)
        }
    }

    pub fn page_fault_rate(&self) -> Option<f64> {
        Self::rate(self.page_faults, self.total_addresses)
    }

    pub fn tlb_hit_rate(&self) -> Option<f64> {
        Self::rate(self.tlb_hits, self.total_addresses)
    }
}

/// Final report of a run.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub statistics: Statistics,
    pub skipped_addresses: u64,
}

struct Rate(Option<f64>);

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(rate) => write!(f, "{:.3}", rate),
            None => f.write_str("undefined"),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.statistics;

        writeln!(f, "Number of Translated Addresses = {}", stats.total_addresses)?;
        writeln!(f, "Page Faults = {}", stats.page_faults)?;
        writeln!(f, "Page Fault Rate = {}", Rate(stats.page_fault_rate()))?;
        writeln!(f, "TLB Hits = {}", stats.tlb_hits)?;
        write!(f, "TLB Hit Rate = {}", Rate(stats.tlb_hit_rate()))?;

        if self.skipped_addresses > 0 {
            write!(f, "\nSkipped Malformed Addresses = {}", self.skipped_addresses)?;
        }

        Ok(())
    }
}
