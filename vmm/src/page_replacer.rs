use crate::config::ReplacementPolicy;

pub enum PageEvent {
    /// The frame was accessed by a translation (hit or fault).
    Touched(usize),
    /// A page was just loaded into the frame.
    Loaded(usize),
    /// The frame went back to the free pool without a page in it.
    Freed(usize),
}

/// Picks victim frames once the free pool is empty.
pub trait PageReplacer {
    fn page_event(&mut self, _event: PageEvent) {}

    /// `None` when this policy never evicts.
    fn pick_replacement_frame(&mut self) -> Option<usize>;
}

/// Never evicts; used when every page has its own frame.
pub struct UnboundedPageReplacer;

impl PageReplacer for UnboundedPageReplacer {
    fn pick_replacement_frame(&mut self) -> Option<usize> {
        None
    }
}

/// Evicts the frame whose current occupant was loaded earliest.
pub struct FIFOPageReplacer {
    loaded_at: Vec<Option<u64>>,
    next_sequence: u64,
}

impl FIFOPageReplacer {
    pub fn new(frame_count: usize) -> Self {
        FIFOPageReplacer {
            loaded_at: vec![None; frame_count],
            next_sequence: 0,
        }
    }
}

impl PageReplacer for FIFOPageReplacer {
    fn page_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Loaded(frame) => {
                self.loaded_at[frame] = Some(self.next_sequence);
                self.next_sequence += 1;
            }
            PageEvent::Freed(frame) => self.loaded_at[frame] = None,
            PageEvent::Touched(_) => {}
        }
    }

    fn pick_replacement_frame(&mut self) -> Option<usize> {
        self.loaded_at
            .iter()
            .enumerate()
            .filter_map(|(frame, seq)| seq.map(|seq| (seq, frame)))
            .min()
            .map(|(_, frame)| frame)
    }
}

/// Evicts the frame with the largest age counter. Every access ages all
/// frames by one and resets the touched frame to zero; ties go to the
/// lowest frame index.
pub struct LRUPageReplacer {
    age: Vec<u64>,
}

impl LRUPageReplacer {
    pub fn new(frame_count: usize) -> Self {
        LRUPageReplacer {
            age: vec![0; frame_count],
        }
    }

    pub fn age(&self, frame: usize) -> u64 {
        self.age[frame]
    }
}

impl PageReplacer for LRUPageReplacer {
    fn page_event(&mut self, event: PageEvent) {
        if let PageEvent::Touched(frame) = event {
            for age in self.age.iter_mut() {
                *age = age.saturating_add(1);
            }

            self.age[frame] = 0;
        }
    }

    fn pick_replacement_frame(&mut self) -> Option<usize> {
        let mut victim: Option<(usize, u64)> = None;

        for (frame, &age) in self.age.iter().enumerate() {
            match victim {
                Some((_, oldest)) if age <= oldest => {}
                _ => victim = Some((frame, age)),
            }
        }

        victim.map(|(frame, _)| frame)
    }
}

pub fn replacer_for(policy: ReplacementPolicy, frame_count: usize) -> Box<dyn PageReplacer> {
    match policy {
        ReplacementPolicy::Unbounded => Box::new(UnboundedPageReplacer),
        ReplacementPolicy::Fifo => Box::new(FIFOPageReplacer::new(frame_count)),
        ReplacementPolicy::Lru => Box::new(LRUPageReplacer::new(frame_count)),
    }
}
