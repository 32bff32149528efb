use log::{debug, trace};

use crate::{
    address::{encode, VirtualAddress, PAGE_COUNT, TLB_SIZE},
    config::MmuConfig,
    error::{Result, VmError},
    frame_store::{FrameAllocation, FrameStore},
    page_loader::PageLoader,
    page_table::PageTable,
    stats::{Outcome, Statistics, Translation},
    tlb::Tlb,
};

/// Bytes of a freshly loaded page shown in trace logs.
const TRACE_PREVIEW_LEN: usize = 16;

/// Translation engine: TLB, page table, physical frames and the page source,
/// driven one virtual address at a time.
pub struct Mmu<LOADER: PageLoader> {
    tlb: Tlb<TLB_SIZE>,
    page_table: PageTable<PAGE_COUNT>,
    frames: FrameStore,
    loader: LOADER,
    stats: Statistics,
}

impl<LOADER> Mmu<LOADER>
where
    LOADER: PageLoader,
{
    pub fn new(config: MmuConfig, loader: LOADER) -> Result<Self> {
        config.validate()?;

        debug!(
            "mmu: {} frames, policy {}, tlb of {} entries",
            config.frame_count, config.policy, TLB_SIZE
        );

        Ok(Mmu {
            tlb: Tlb::new(),
            page_table: PageTable::new(),
            frames: FrameStore::new(&config),
            loader,
            stats: Statistics::default(),
        })
    }

    /// Unmaps whatever page lives in `frame_idx` and drops its TLB entry.
    fn evict(&mut self, frame_idx: usize) -> Result<()> {
        let evicted_page = self.page_table.unmap_page_at_frame(frame_idx)?.ok_or_else(|| {
            VmError::InvariantViolation(format!("victim frame {} is not mapped by any page", frame_idx))
        })?;

        let occupant = self.frames.occupant(frame_idx);
        if occupant != Some(evicted_page) {
            return Err(VmError::InvariantViolation(format!(
                "page table maps page {:#05X} to frame {}, but the frame holds {:?}",
                evicted_page, frame_idx, occupant
            )));
        }

        let had_tlb_entry = self.tlb.invalidate(evicted_page);

        debug!(
            "mmu: evicting page {:#05X} from frame {} (tlb entry dropped: {})",
            evicted_page, frame_idx, had_tlb_entry
        );

        Ok(())
    }

    fn handle_page_fault(&mut self, page_number: usize) -> Result<usize> {
        let frame_idx = match self.frames.allocate_frame()? {
            FrameAllocation::Free(frame_idx) => frame_idx,
            FrameAllocation::Victim(frame_idx) => {
                self.evict(frame_idx)?;
                frame_idx
            }
        };

        self.frames.load_page(frame_idx, page_number, &mut self.loader)?;
        self.page_table.set(page_number, frame_idx);

        debug!("mmu: page fault, page {:#05X} loaded into frame {}", page_number, frame_idx);
        trace!(
            "mmu: frame {} starts with {}",
            frame_idx,
            hex::encode(&self.frames.frame(frame_idx)[..TRACE_PREVIEW_LEN])
        );

        Ok(frame_idx)
    }

    fn resolve_frame(&mut self, page_number: usize) -> Result<(usize, Outcome)> {
        if let Some(frame_idx) = self.tlb.lookup(page_number) {
            let mapped = self.page_table.get(page_number).map(|entry| entry.frame_index);

            if mapped != Some(frame_idx) {
                return Err(VmError::InvariantViolation(format!(
                    "tlb maps page {:#05X} to frame {}, page table says {:?}",
                    page_number, frame_idx, mapped
                )));
            }

            trace!("mmu: tlb hit");
            return Ok((frame_idx, Outcome::TlbHit));
        }

        let (frame_idx, outcome) = match self.page_table.get(page_number) {
            Some(entry) => {
                trace!("mmu: tlb miss, page table hit");
                (entry.frame_index, Outcome::PageTableHit)
            }
            None => (self.handle_page_fault(page_number)?, Outcome::PageFault),
        };

        self.tlb.insert(page_number, frame_idx)?;

        Ok((frame_idx, outcome))
    }

    pub fn translate(&mut self, address: VirtualAddress) -> Result<Translation> {
        let (page_number, page_offset) = address.decode();

        trace!(
            "mmu: access addr {:#07X} page_num={:#05X} page_offset={:#05X}",
            address.raw(),
            page_number,
            page_offset
        );

        let (frame_idx, outcome) = self.resolve_frame(page_number)?;

        self.frames.touch(frame_idx);
        self.stats.record(outcome);

        Ok(Translation {
            virtual_address: address,
            physical_address: encode(frame_idx, page_offset),
            value: self.frames.byte_at(frame_idx, page_offset),
            outcome,
        })
    }

    /// Validates `raw` against the 20-bit domain, then translates it.
    pub fn translate_raw(&mut self, raw: u32) -> Result<Translation> {
        self.translate(VirtualAddress::new(raw)?)
    }

    /// Translates addresses in order, stopping at the first failure.
    pub fn translate_all<I>(&mut self, addresses: I) -> Result<Vec<Translation>>
    where
        I: IntoIterator<Item = VirtualAddress>,
    {
        addresses
            .into_iter()
            .map(|address| self.translate(address))
            .collect()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn tlb(&self) -> &Tlb<TLB_SIZE> {
        &self.tlb
    }

    pub fn page_table(&self) -> &PageTable<PAGE_COUNT> {
        &self.page_table
    }

    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }
}
