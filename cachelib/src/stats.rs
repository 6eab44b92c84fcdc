use std::fmt;
use serde::{Deserialize, Serialize};
use crate::history::MissKind;

/// Counters for a simulation run. Prefetch-origin accesses only ever show up in `prefetches`
/// and `dirty_evictions`
///
/// `accesses == hits + misses` and `misses == compulsory_misses + conflict_misses` hold after
/// every access, until a counter saturates at `u32::MAX` (past four billion references)
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub struct Statistics {
    pub accesses: u32,
    pub hits: u32,
    pub misses: u32,
    pub prefetches: u32,
    pub compulsory_misses: u32,
    pub conflict_misses: u32,
    pub dirty_evictions: u32,
}

impl Statistics {
    pub(crate) fn record_hit(&mut self) {
        self.accesses = self.accesses.saturating_add(1);
        self.hits = self.hits.saturating_add(1);
    }

    pub(crate) fn record_miss(&mut self, kind: MissKind) {
        self.accesses = self.accesses.saturating_add(1);
        self.misses = self.misses.saturating_add(1);
        match kind {
            MissKind::Compulsory => self.compulsory_misses = self.compulsory_misses.saturating_add(1),
            MissKind::Conflict => self.conflict_misses = self.conflict_misses.saturating_add(1),
        }
    }

    pub(crate) fn record_dirty_eviction(&mut self) {
        self.dirty_evictions = self.dirty_evictions.saturating_add(1);
    }

    pub(crate) fn record_prefetches(&mut self, count: u32) {
        self.prefetches = self.prefetches.saturating_add(count);
    }

    /// hits / accesses, NaN when nothing was accessed
    pub fn hit_ratio(&self) -> f64 {
        if self.accesses == 0 {
            f64::NAN
        } else {
            self.hits as f64 / self.accesses as f64
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics")?;
        writeln!(f, "==========")?;
        writeln!(f, "OUTPUT ACCESSES {}", self.accesses)?;
        writeln!(f, "OUTPUT HITS {}", self.hits)?;
        writeln!(f, "OUTPUT MISSES {}", self.misses)?;
        writeln!(f, "OUTPUT PREFETCHES {}", self.prefetches)?;
        writeln!(f, "OUTPUT COMPULSORY MISSES {}", self.compulsory_misses)?;
        writeln!(f, "OUTPUT CONFLICT MISSES {}", self.conflict_misses)?;
        writeln!(f, "OUTPUT DIRTY EVICTIONS {}", self.dirty_evictions)?;
        write!(f, "OUTPUT HIT RATIO {:.8}", self.hit_ratio())
    }
}
