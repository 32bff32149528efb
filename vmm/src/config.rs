use std::{fmt, str::FromStr};

use crate::{
    address::PAGE_COUNT,
    error::{Result, VmError},
};

pub const DEFAULT_BOUNDED_FRAMES: usize = 256;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReplacementPolicy {
    /// One frame per page; nothing is ever evicted.
    Unbounded,
    Fifo,
    Lru,
}

impl FromStr for ReplacementPolicy {
    type Err = VmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unbounded" => Ok(ReplacementPolicy::Unbounded),
            "fifo" | "0" => Ok(ReplacementPolicy::Fifo),
            "lru" | "1" => Ok(ReplacementPolicy::Lru),
            other => Err(VmError::Configuration(format!(
                "unknown replacement policy {:?} (expected fifo, lru, 0 or 1)",
                other
            ))),
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplacementPolicy::Unbounded => "unbounded",
            ReplacementPolicy::Fifo => "fifo",
            ReplacementPolicy::Lru => "lru",
        };

        f.write_str(name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MmuConfig {
    pub policy: ReplacementPolicy,
    pub frame_count: usize,
}

impl MmuConfig {
    pub fn unbounded() -> Self {
        MmuConfig {
            policy: ReplacementPolicy::Unbounded,
            frame_count: PAGE_COUNT,
        }
    }

    pub fn bounded(policy: ReplacementPolicy, frame_count: usize) -> Result<Self> {
        let config = MmuConfig {
            policy,
            frame_count,
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.policy {
            ReplacementPolicy::Unbounded if self.frame_count != PAGE_COUNT => {
                Err(VmError::Configuration(format!(
                    "the unbounded configuration needs exactly {} frames, got {}",
                    PAGE_COUNT, self.frame_count
                )))
            }
            ReplacementPolicy::Unbounded => Ok(()),
            ReplacementPolicy::Fifo | ReplacementPolicy::Lru
                if self.frame_count == 0 || self.frame_count > PAGE_COUNT =>
            {
                Err(VmError::Configuration(format!(
                    "frame count must be between 1 and {}, got {}",
                    PAGE_COUNT, self.frame_count
                )))
            }
            ReplacementPolicy::Fifo | ReplacementPolicy::Lru => Ok(()),
        }
    }
}

impl Default for MmuConfig {
    fn default() -> Self {
        Self::unbounded()
    }
}
