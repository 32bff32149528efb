use crate::error::{Result, VmError};

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct PageTableEntry {
    pub frame_index: usize,
}

/// Authoritative page -> frame mapping. `None` means unmapped.
pub struct PageTable<const PAGE_TABLE_SIZE: usize> {
    table: [Option<PageTableEntry>; PAGE_TABLE_SIZE],
}

impl<const PAGE_TABLE_SIZE: usize> PageTable<PAGE_TABLE_SIZE> {
    pub fn new() -> Self {
        PageTable {
            table: [None; PAGE_TABLE_SIZE],
        }
    }

    pub fn set(&mut self, page_number: usize, frame_index: usize) {
        self.table[page_number] = Some(PageTableEntry { frame_index });
    }

    pub fn get(&self, page_number: usize) -> Option<PageTableEntry> {
        self.table[page_number]
    }

    /// Clears whichever page currently maps to `frame_index` and returns it.
    ///
    /// Linear in the table size; only runs on eviction.
    pub fn unmap_page_at_frame(&mut self, frame_index: usize) -> Result<Option<usize>> {
        let mut mapped = self
            .table
            .iter()
            .enumerate()
            .filter(|(_, entry)| matches!(entry, Some(e) if e.frame_index == frame_index))
            .map(|(page_number, _)| page_number);

        let page_number = match mapped.next() {
            Some(page_number) => page_number,
            None => return Ok(None),
        };

        if let Some(other) = mapped.next() {
            return Err(VmError::InvariantViolation(format!(
                "frame {} is mapped by both page {:#05X} and page {:#05X}",
                frame_index, page_number, other
            )));
        }

        self.table[page_number] = None;

        Ok(Some(page_number))
    }

    pub fn mapped_pages(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.table
            .iter()
            .enumerate()
            .filter_map(|(page, entry)| entry.map(|e| (page, e.frame_index)))
    }
}

impl<const PAGE_TABLE_SIZE: usize> Default for PageTable<PAGE_TABLE_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_fully_unmapped() {
        let table = PageTable::<1024>::new();

        assert!((0..1024).all(|page| table.get(page).is_none()));
        assert_eq!(table.mapped_pages().count(), 0);
    }

    #[test]
    fn frame_zero_is_a_real_mapping() {
        let mut table = PageTable::<8>::new();
        table.set(3, 0);

        assert_eq!(table.get(3), Some(PageTableEntry { frame_index: 0 }));
    }

    #[test]
    fn unmap_by_frame_returns_previous_page() {
        let mut table = PageTable::<8>::new();
        table.set(2, 5);
        table.set(6, 1);

        assert_eq!(table.unmap_page_at_frame(5).unwrap(), Some(2));
        assert_eq!(table.get(2), None);
        assert_eq!(table.get(6), Some(PageTableEntry { frame_index: 1 }));
        assert_eq!(table.unmap_page_at_frame(5).unwrap(), None);
    }

    #[test]
    fn two_pages_on_one_frame_is_reported() {
        let mut table = PageTable::<8>::new();
        table.set(1, 4);
        table.set(2, 4);

        let err = table.unmap_page_at_frame(4).unwrap_err();

        assert!(matches!(err, VmError::InvariantViolation(_)));
    }
}
