use std::io;

use crate::{
    address::PAGE_SIZE,
    error::{Result, VmError},
};

/// Read-only, page-indexed source of page contents.
pub trait PageLoader {
    /// Fills `target` (exactly one page) with the bytes of `page_number`.
    fn load_page_into(&mut self, page_number: usize, target: &mut [u8]) -> Result<()>;
}

/// Backing store held entirely in memory.
#[derive(Debug, Clone)]
pub struct InMemoryPageLoader {
    bytes: Vec<u8>,
}

impl InMemoryPageLoader {
    pub fn new(bytes: Vec<u8>) -> Self {
        InMemoryPageLoader { bytes }
    }

    /// Builds a store where every byte of page `p` is `fill(p)`.
    pub fn from_fn(page_count: usize, fill: impl Fn(usize) -> u8) -> Self {
        let bytes = (0..page_count)
            .flat_map(|page| std::iter::repeat(fill(page)).take(PAGE_SIZE))
            .collect();

        InMemoryPageLoader { bytes }
    }
}

impl PageLoader for InMemoryPageLoader {
    fn load_page_into(&mut self, page_number: usize, target: &mut [u8]) -> Result<()> {
        let start = page_number * PAGE_SIZE;

        let page = self.bytes.get(start..start + PAGE_SIZE).ok_or_else(|| {
            VmError::backing_store(
                format!("page {:#05X} lies past the end of the store", page_number),
                io::Error::from(io::ErrorKind::UnexpectedEof),
            )
        })?;

        target.copy_from_slice(page);

        Ok(())
    }
}
