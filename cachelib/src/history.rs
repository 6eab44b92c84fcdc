use std::collections::HashSet;

/// Identifies one line-sized region of memory: the set it maps to plus its tag
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LineIdentity {
    pub set: u32,
    pub tag: u32,
}

/// Whether a miss was the first ever reference to a line, or a line which was evicted earlier
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MissKind {
    Compulsory,
    Conflict,
}

/// Every line identity ever installed in the cache. Append-only, so a line which was evicted and
/// is missing again is recognised as a conflict miss
#[derive(Debug, Default)]
pub struct AccessHistory {
    seen: HashSet<LineIdentity>,
}

impl AccessHistory {
    /// Classifies a miss on `id` and records it as installed
    pub fn classify_and_record(&mut self, id: LineIdentity) -> MissKind {
        if self.seen.insert(id) {
            MissKind::Compulsory
        } else {
            MissKind::Conflict
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
