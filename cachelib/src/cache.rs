/// The state of a single cache line
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LineStatus {
    /// Holds nothing, the tag is meaningless
    #[default]
    Invalid,
    /// Holds a line identical to memory
    Clean,
    /// Holds a line which was written since install, and needs written back on eviction
    Dirty,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct CacheLine {
    pub tag: u32,
    pub status: LineStatus,
}

impl CacheLine {
    pub fn is_valid(&self) -> bool {
        self.status != LineStatus::Invalid
    }

    pub fn is_dirty(&self) -> bool {
        self.status == LineStatus::Dirty
    }
}

/// The cache lines, stored in one flat array where set `s` occupies
/// `s * associativity..(s + 1) * associativity`
///
/// The store has no opinion about eviction. Callers pick the slot to install into, either the
/// first invalid line of the set or a victim chosen by a replacement policy
#[derive(Debug)]
pub struct CacheStore {
    lines: Vec<CacheLine>,
    associativity: usize,
}

impl CacheStore {
    pub fn new(num_sets: u32, associativity: u32) -> Self {
        Self {
            lines: vec![CacheLine::default(); num_sets as usize * associativity as usize],
            associativity: associativity as usize,
        }
    }

    /// The lines of a set, indexed by slot
    pub fn set(&self, set: u32) -> &[CacheLine] {
        let lower = set as usize * self.associativity;
        &self.lines[lower..lower + self.associativity]
    }

    fn set_mut(&mut self, set: u32) -> &mut [CacheLine] {
        let lower = set as usize * self.associativity;
        &mut self.lines[lower..lower + self.associativity]
    }

    /// Finds the slot of the valid line holding `tag` in `set`, if any
    pub fn find(&self, set: u32, tag: u32) -> Option<usize> {
        self.set(set)
            .iter()
            .position(|line| line.is_valid() && line.tag == tag)
    }

    pub fn first_invalid(&self, set: u32) -> Option<usize> {
        self.set(set).iter().position(|line| !line.is_valid())
    }

    pub fn is_full(&self, set: u32) -> bool {
        self.first_invalid(set).is_none()
    }

    pub fn line(&self, set: u32, slot: usize) -> &CacheLine {
        &self.set(set)[slot]
    }

    /// Overwrites the line in `slot`, whatever it held before
    pub fn install(&mut self, set: u32, slot: usize, tag: u32, status: LineStatus) {
        self.set_mut(set)[slot] = CacheLine { tag, status };
    }

    /// Marks a valid line as written. Invalid lines are left alone
    pub fn mark_dirty(&mut self, set: u32, slot: usize) {
        let line = &mut self.set_mut(set)[slot];
        if line.is_valid() {
            line.status = LineStatus::Dirty;
        }
    }

    /// Gets the number of lines which were never filled. Useful for analysing cache performance
    /// or debugging
    pub fn invalid_line_count(&self) -> usize {
        self.lines.iter().filter(|line| !line.is_valid()).count()
    }
}
