//! Address codec: splits a 20-bit virtual address into page number and
//! offset, and glues a frame number and offset back into a physical address.

use std::fmt;

use crate::error::{Result, VmError};

pub const OFFSET_BITS: u32 = 10;
pub const PAGE_SIZE: usize = 1 << OFFSET_BITS;
pub const PAGE_COUNT: usize = 1024;
pub const TLB_SIZE: usize = 16;

pub const OFFSET_MASK: u32 = 0x0000_03FF;
pub const PAGE_MASK: u32 = 0x000F_FC00;

/// Exclusive upper bound of the virtual address domain.
pub const ADDRESS_LIMIT: u32 = 1 << 20;

/// A virtual address already checked to lie in `[0, 2^20)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VirtualAddress(u32);

impl VirtualAddress {
    pub fn new(raw: u32) -> Result<Self> {
        if raw >= ADDRESS_LIMIT {
            return Err(VmError::malformed(
                raw.to_string(),
                format!("outside the virtual address range [0, {})", ADDRESS_LIMIT),
            ));
        }

        Ok(VirtualAddress(raw))
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    /// Returns `(page_number, offset)`.
    pub fn decode(self) -> (usize, usize) {
        let page_number = (self.0 & PAGE_MASK) >> OFFSET_BITS;
        let offset = self.0 & OFFSET_MASK;

        (page_number as usize, offset as usize)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composes `(frame_number << 10) | offset`.
pub fn encode(frame_number: usize, offset: usize) -> u32 {
    debug_assert!(frame_number < PAGE_COUNT);
    debug_assert!(offset < PAGE_SIZE);

    ((frame_number as u32) << OFFSET_BITS) | (offset as u32 & OFFSET_MASK)
}
