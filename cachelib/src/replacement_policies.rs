use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::cache::{CacheLine, LineStatus};

/// A generic trait for implementing new replacement policies. Used to parameterise a CacheCore.
pub trait ReplacementPolicy {
    /// Updates the policy when a line is used, either on a hit or right after it was installed
    ///
    /// Not applicable for some policies, a default which does nothing is provided
    ///
    /// # Arguments
    ///
    /// * `set`: The set the line belongs to
    /// * `slot`: The position of the line within the set
    /// * `is_write`: Whether the access wrote to the line
    ///
    /// returns: ()
    fn on_access(&mut self, _set: u32, _slot: usize, _is_write: bool) {}

    /// Used by the cache to choose a line to evict when a set is full.
    ///
    /// The cache only calls this when every line of the set is valid, and checks the returned
    /// slot is one of them
    ///
    /// # Arguments
    ///
    /// * `set`: The cache set
    /// * `lines`: The current lines of the set, indexed by slot
    ///
    /// returns: usize, the slot to evict
    fn select_victim(&mut self, set: u32, lines: &[CacheLine]) -> usize;
}

/// Least Recently Used replacement policy
///
/// This implementation keeps track of when each line was last used, and also keeps track of a
/// logical clock, which is updated each time a line is used. Every use gets a distinct timestamp,
/// so the recency order within a set is total and there are never ties to break
pub struct LeastRecentlyUsed {
    last_used_times: Vec<u64>,
    associativity: usize,
    time: u64,
}

impl LeastRecentlyUsed {
    pub fn new(num_sets: u32, associativity: u32) -> Self {
        Self {
            last_used_times: vec![0; num_sets as usize * associativity as usize],
            associativity: associativity as usize,
            time: 0,
        }
    }

    fn last_used(&self, set: u32, slot: usize) -> u64 {
        self.last_used_times[set as usize * self.associativity + slot]
    }

    /// The least recently used slot among those accepted by `filter`
    fn oldest_where(&self, set: u32, lines: &[CacheLine], filter: impl Fn(&CacheLine) -> bool) -> Option<usize> {
        let mut min_value = u64::MAX;
        let mut min_index = None;
        for (slot, line) in lines.iter().enumerate() {
            let used = self.last_used(set, slot);
            if filter(line) && used < min_value {
                min_value = used;
                min_index = Some(slot);
            }
        }
        min_index
    }
}

impl ReplacementPolicy for LeastRecentlyUsed {
    fn on_access(&mut self, set: u32, slot: usize, _is_write: bool) {
        // Start at 1, so a used line is always more recent than an untouched one
        self.time += 1;
        self.last_used_times[set as usize * self.associativity + slot] = self.time;
    }

    fn select_victim(&mut self, set: u32, lines: &[CacheLine]) -> usize {
        // An empty set has no victim, usize::MAX is rejected by the cache as out of range
        self.oldest_where(set, lines, CacheLine::is_valid).unwrap_or(usize::MAX)
    }
}

/// Random replacement policy, picks any slot of the set with equal probability
///
/// The generator is owned by the policy, seeding it makes a run reproducible
pub struct Random {
    associativity: usize,
    rng: StdRng,
}

impl Random {
    pub fn new(associativity: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            associativity: associativity as usize,
            rng,
        }
    }
}

impl ReplacementPolicy for Random {
    fn select_victim(&mut self, _set: u32, _lines: &[CacheLine]) -> usize {
        self.rng.gen_range(0..self.associativity)
    }
}

/// LRU which avoids write-backs: evicts the least recently used clean line, and only falls back
/// to plain LRU when every line in the set is dirty
pub struct LeastRecentlyUsedPreferClean {
    recency: LeastRecentlyUsed,
}

impl LeastRecentlyUsedPreferClean {
    pub fn new(num_sets: u32, associativity: u32) -> Self {
        Self {
            recency: LeastRecentlyUsed::new(num_sets, associativity),
        }
    }
}

impl ReplacementPolicy for LeastRecentlyUsedPreferClean {
    fn on_access(&mut self, set: u32, slot: usize, is_write: bool) {
        self.recency.on_access(set, slot, is_write);
    }

    fn select_victim(&mut self, set: u32, lines: &[CacheLine]) -> usize {
        match self.recency.oldest_where(set, lines, |line| line.status == LineStatus::Clean) {
            Some(slot) => slot,
            None => {
                trace!("set {set} is entirely dirty, falling back to LRU");
                self.recency.select_victim(set, lines)
            }
        }
    }
}

/// Enum for all 3 provided replacement policies
///
/// The variant set is fixed, so explicitly branching on it lets the compiler reason about the
/// concrete types and inline the policy calls, which a trait object would hide
pub enum GenericPolicy {
    LeastRecentlyUsed(LeastRecentlyUsed),
    Random(Random),
    LeastRecentlyUsedPreferClean(LeastRecentlyUsedPreferClean),
}

impl From<LeastRecentlyUsed> for GenericPolicy {
    fn from(value: LeastRecentlyUsed) -> Self {
        Self::LeastRecentlyUsed(value)
    }
}

impl From<Random> for GenericPolicy {
    fn from(value: Random) -> Self {
        Self::Random(value)
    }
}

impl From<LeastRecentlyUsedPreferClean> for GenericPolicy {
    fn from(value: LeastRecentlyUsedPreferClean) -> Self {
        Self::LeastRecentlyUsedPreferClean(value)
    }
}

impl ReplacementPolicy for GenericPolicy {
    fn on_access(&mut self, set: u32, slot: usize, is_write: bool) {
        match self {
            GenericPolicy::LeastRecentlyUsed(p) => p.on_access(set, slot, is_write),
            GenericPolicy::Random(p) => p.on_access(set, slot, is_write),
            GenericPolicy::LeastRecentlyUsedPreferClean(p) => p.on_access(set, slot, is_write),
        }
    }

    fn select_victim(&mut self, set: u32, lines: &[CacheLine]) -> usize {
        match self {
            GenericPolicy::LeastRecentlyUsed(p) => p.select_victim(set, lines),
            GenericPolicy::Random(p) => p.select_victim(set, lines),
            GenericPolicy::LeastRecentlyUsedPreferClean(p) => p.select_victim(set, lines),
        }
    }
}
