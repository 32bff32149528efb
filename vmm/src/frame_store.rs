//! Physical memory: a fixed pool of page-sized frames plus the replacement
//! policy that decides which occupied frame gives way when the pool is full.

use std::{collections::VecDeque, ops::Range};

use crate::{
    address::PAGE_SIZE,
    config::MmuConfig,
    error::{Result, VmError},
    page_loader::PageLoader,
    page_replacer::{replacer_for, PageEvent, PageReplacer},
};

/// Where a frame for a faulting page came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameAllocation {
    Free(usize),
    /// An occupied frame chosen by the policy. Its old page must be unmapped
    /// before the frame is reloaded.
    Victim(usize),
}

impl FrameAllocation {
    pub fn frame_index(self) -> usize {
        match self {
            FrameAllocation::Free(frame) | FrameAllocation::Victim(frame) => frame,
        }
    }
}

pub struct FrameStore {
    memory: Vec<u8>,
    occupants: Vec<Option<usize>>,
    free_frames: VecDeque<usize>,
    replacer: Box<dyn PageReplacer>,
}

impl FrameStore {
    pub fn new(config: &MmuConfig) -> Self {
        let frame_count = config.frame_count;

        FrameStore {
            memory: vec![0; frame_count * PAGE_SIZE],
            occupants: vec![None; frame_count],
            free_frames: (0..frame_count).collect(),
            replacer: replacer_for(config.policy, frame_count),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.occupants.len()
    }

    fn frame_idx_to_range(frame_idx: usize) -> Range<usize> {
        Range {
            start: frame_idx * PAGE_SIZE,
            end: (frame_idx + 1) * PAGE_SIZE,
        }
    }

    /// Lowest free frame if there is one, otherwise the policy's victim.
    pub fn allocate_frame(&mut self) -> Result<FrameAllocation> {
        if let Some(frame) = self.free_frames.pop_front() {
            return Ok(FrameAllocation::Free(frame));
        }

        match self.replacer.pick_replacement_frame() {
            Some(frame) if self.occupants[frame].is_some() => Ok(FrameAllocation::Victim(frame)),
            Some(frame) => Err(VmError::InvariantViolation(format!(
                "replacement policy picked frame {} which holds no page",
                frame
            ))),
            None => Err(VmError::InvariantViolation(format!(
                "all {} frames are occupied and the policy cannot evict",
                self.frame_count()
            ))),
        }
    }

    pub fn occupant(&self, frame_idx: usize) -> Option<usize> {
        self.occupants[frame_idx]
    }

    /// Copies one page verbatim into the frame and records its new occupant.
    /// Every load, including page faults, ends up here.
    pub fn load_bytes(&mut self, frame_idx: usize, page_number: usize, page: &[u8]) -> Result<()> {
        if page.len() != PAGE_SIZE {
            return Err(VmError::InvariantViolation(format!(
                "page {:#05X} is {} bytes, expected {}",
                page_number,
                page.len(),
                PAGE_SIZE
            )));
        }

        self.memory[Self::frame_idx_to_range(frame_idx)].copy_from_slice(page);
        self.mark_loaded(frame_idx, page_number);

        Ok(())
    }

    /// Reads `page_number` from `loader` into the frame. If the read fails the
    /// frame goes back to the free pool, so nothing leaks.
    pub fn load_page<L: PageLoader + ?Sized>(
        &mut self,
        frame_idx: usize,
        page_number: usize,
        loader: &mut L,
    ) -> Result<()> {
        let mut page = [0u8; PAGE_SIZE];

        if let Err(err) = loader.load_page_into(page_number, &mut page) {
            self.release(frame_idx);
            return Err(err);
        }

        self.load_bytes(frame_idx, page_number, &page)
    }

    /// Returns a frame to the free pool, keeping the pool sorted.
    fn release(&mut self, frame_idx: usize) {
        self.occupants[frame_idx] = None;
        self.replacer.page_event(PageEvent::Freed(frame_idx));

        if !self.free_frames.contains(&frame_idx) {
            let at = self.free_frames.partition_point(|&free| free < frame_idx);
            self.free_frames.insert(at, frame_idx);
        }
    }

    fn mark_loaded(&mut self, frame_idx: usize, page_number: usize) {
        self.occupants[frame_idx] = Some(page_number);
        self.replacer.page_event(PageEvent::Loaded(frame_idx));
    }

    /// Records an access to the frame for recency tracking.
    pub fn touch(&mut self, frame_idx: usize) {
        self.replacer.page_event(PageEvent::Touched(frame_idx));
    }

    pub fn frame(&self, frame_idx: usize) -> &[u8] {
        &self.memory[Self::frame_idx_to_range(frame_idx)]
    }

    pub fn byte_at(&self, frame_idx: usize, offset: usize) -> i8 {
        self.frame(frame_idx)[offset] as i8
    }
}
