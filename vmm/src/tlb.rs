use crate::error::{Result, VmError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TlbEntry {
    pub page_number: usize,
    pub frame_index: usize,
}

/// Fully-associative translation cache. Slots are refilled oldest-first,
/// independently of whatever policy governs physical frames.
pub struct Tlb<const TLB_SIZE: usize> {
    entries: [Option<TlbEntry>; TLB_SIZE],
    insertions: usize,
}

impl<const TLB_SIZE: usize> Tlb<TLB_SIZE> {
    pub fn new() -> Self {
        Tlb {
            entries: [None; TLB_SIZE],
            insertions: 0,
        }
    }

    pub fn lookup(&self, page_number: usize) -> Option<usize> {
        self.entries
            .iter()
            .flatten()
            .find(|entry| entry.page_number == page_number)
            .map(|entry| entry.frame_index)
    }

    /// Overwrites the slot at `insertions % TLB_SIZE`.
    ///
    /// Fails if the page already has a valid entry: callers only insert after
    /// a miss, so a duplicate means a stale mapping survived an eviction.
    pub fn insert(&mut self, page_number: usize, frame_index: usize) -> Result<()> {
        if let Some(frame) = self.lookup(page_number) {
            return Err(VmError::InvariantViolation(format!(
                "tlb already maps page {:#05X} to frame {}",
                page_number, frame
            )));
        }

        let slot = self.insertions % TLB_SIZE;

        self.entries[slot] = Some(TlbEntry {
            page_number,
            frame_index,
        });
        self.insertions += 1;

        Ok(())
    }

    /// Drops any entry for `page_number`. Returns whether one was present.
    pub fn invalidate(&mut self, page_number: usize) -> bool {
        let mut found = false;

        for slot in self.entries.iter_mut() {
            if matches!(slot, Some(entry) if entry.page_number == page_number) {
                *slot = None;
                found = true;
            }
        }

        found
    }

    pub fn entries(&self) -> impl Iterator<Item = &TlbEntry> {
        self.entries.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const TLB_SIZE: usize> Default for Tlb<TLB_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}
