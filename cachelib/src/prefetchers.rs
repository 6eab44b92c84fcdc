use log::{debug, warn};
use crate::engine::{AccessOrigin, MemoryPort, Operation};

/// A generic trait for prefetch strategies. Used to parameterise a CacheEngine.
pub trait Prefetcher {
    /// Called after every demand access, to prefetch any lines the strategy deems necessary
    ///
    /// Prefetches must go through `port` with `AccessOrigin::Prefetch`, so they don't trigger
    /// prefetching themselves and stay out of the hit and miss counters
    ///
    /// # Arguments
    ///
    /// * `port`: The cache which was accessed
    /// * `address`: The address of the demand access
    /// * `was_miss`: Whether the demand access missed
    ///
    /// returns: u32, the number of lines prefetched
    fn on_access<M: MemoryPort>(&mut self, port: &mut M, address: u32, was_miss: bool) -> u32;
}

/// Prefetches the line holding `address`. Prefetching is best effort, a failed access is logged
/// and dropped
fn prefetch<M: MemoryPort>(port: &mut M, address: u32) -> bool {
    match port.memory_access(address, Operation::Read, AccessOrigin::Prefetch) {
        Ok(_) => true,
        Err(e) => {
            warn!("dropping prefetch of {address:#x}: {e}");
            false
        }
    }
}

/// Never prefetches
#[derive(Debug, Default, Copy, Clone)]
pub struct NullPrefetcher;

impl Prefetcher for NullPrefetcher {
    fn on_access<M: MemoryPort>(&mut self, _port: &mut M, _address: u32, _was_miss: bool) -> u32 {
        0
    }
}

/// Prefetches the line after every accessed line, hit or miss
#[derive(Debug, Default, Copy, Clone)]
pub struct AdjacentPrefetcher;

impl Prefetcher for AdjacentPrefetcher {
    fn on_access<M: MemoryPort>(&mut self, port: &mut M, address: u32, _was_miss: bool) -> u32 {
        let next = address.wrapping_add(port.decoder().line_size());
        prefetch(port, next) as u32
    }
}

/// Prefetches the next `amount` lines after every accessed line
#[derive(Debug, Default, Copy, Clone)]
pub struct SequentialPrefetcher {
    amount: u32,
}

impl SequentialPrefetcher {
    pub fn new(amount: u32) -> Self {
        Self { amount }
    }
}

impl Prefetcher for SequentialPrefetcher {
    fn on_access<M: MemoryPort>(&mut self, port: &mut M, address: u32, _was_miss: bool) -> u32 {
        let line_size = port.decoder().line_size();
        let mut prefetched = 0;
        for i in 1..=self.amount {
            if prefetch(port, address.wrapping_add(i.wrapping_mul(line_size))) {
                prefetched += 1;
            }
        }
        prefetched
    }
}

/// Number of streams tracked by the stride prefetcher
pub const STREAM_TABLE_SIZE: usize = 16;
/// Number of times a stride must be seen in a row before prefetching
pub const CONFIDENCE_THRESHOLD: u8 = 2;
/// Maximum number of strides to prefetch ahead
pub const MAX_PREFETCH_DISTANCE: u8 = 4;
/// How close, in lines, an unpredicted access must be to a stream which hasn't confirmed a stride
/// yet for the distance between them to become a candidate stride
pub const TRAINING_WINDOW_LINES: u32 = 64;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct StreamEntry {
    last_address: u32,
    stride: i32,
    confidence: u8,
    valid: bool,
}

impl StreamEntry {
    fn predicts(&self, line_address: u32) -> bool {
        self.last_address == line_address
            || (self.stride != 0 && self.last_address.wrapping_add(self.stride as u32) == line_address)
    }
}

/// Stride prefetcher
///
/// Keeps a small table of streams, each with the last line it touched, the stride between its
/// last two lines, and a saturating confidence counter for that stride. Once a stream has seen
/// the same stride `CONFIDENCE_THRESHOLD` times in a row it prefetches up to
/// `MAX_PREFETCH_DISTANCE` strides ahead, reaching further as confidence grows.
///
/// An access is matched to a stream whose next line it was predicted to be. Failing that, it
/// starts a new stream, in the first free slot or replacing slots round robin. If the nearest
/// stream still training (below the confidence threshold) lies within `TRAINING_WINDOW_LINES`,
/// the new stream starts out with the distance from it as its stride and a confidence of one.
/// The stream it was measured from is left as it was, so nearby streams don't disturb each other.
#[derive(Debug, Default)]
pub struct StridePrefetcher {
    streams: [StreamEntry; STREAM_TABLE_SIZE],
    next_victim: usize,
}

impl StridePrefetcher {
    /// Index of the stream which predicted `line_address`. An unpredicted line starts a new
    /// stream and gives `None`, there's nothing to confirm yet
    fn find_or_allocate_stream(&mut self, line_address: u32, line_size: u32) -> Option<usize> {
        if let Some(index) = self.streams.iter().position(|s| s.valid && s.predicts(line_address)) {
            return Some(index);
        }
        let window = TRAINING_WINDOW_LINES.saturating_mul(line_size);
        let candidate = self.streams.iter()
            .filter(|s| s.valid && s.confidence < CONFIDENCE_THRESHOLD)
            .map(|s| line_address.wrapping_sub(s.last_address) as i32)
            .filter(|stride| stride.unsigned_abs() <= window)
            .min_by_key(|stride| stride.unsigned_abs());
        let index = match self.streams.iter().position(|s| !s.valid) {
            Some(index) => index,
            None => {
                let victim = self.next_victim;
                self.next_victim = (victim + 1) % STREAM_TABLE_SIZE;
                victim
            }
        };
        self.streams[index] = StreamEntry {
            last_address: line_address,
            stride: candidate.unwrap_or(0),
            confidence: u8::from(candidate.is_some()),
            valid: true,
        };
        None
    }

    /// Number of streams currently tracked
    pub fn active_streams(&self) -> usize {
        self.streams.iter().filter(|s| s.valid).count()
    }
}

impl Prefetcher for StridePrefetcher {
    fn on_access<M: MemoryPort>(&mut self, port: &mut M, address: u32, _was_miss: bool) -> u32 {
        let line_size = port.decoder().line_size();
        let line_address = port.decoder().line_address(address);
        let Some(index) = self.find_or_allocate_stream(line_address, line_size) else {
            return 0;
        };
        let stream = &mut self.streams[index];

        // The same line again has no stride to learn from
        if stream.last_address == line_address {
            return 0;
        }
        let observed = line_address.wrapping_sub(stream.last_address) as i32;
        if observed == stream.stride {
            stream.confidence = stream.confidence.saturating_add(1);
        } else {
            stream.stride = observed;
            stream.confidence = 1;
        }
        stream.last_address = line_address;
        if stream.confidence < CONFIDENCE_THRESHOLD {
            return 0;
        }

        let distance = (stream.confidence / 5 + 1).min(MAX_PREFETCH_DISTANCE) as u32;
        let stride = stream.stride as u32;
        debug!("stream {index} stride {} confidence {}, prefetching {distance} ahead", stream.stride, stream.confidence);
        let mut prefetched = 0;
        for i in 1..=distance {
            if prefetch(port, line_address.wrapping_add(stride.wrapping_mul(i))) {
                prefetched += 1;
            }
        }
        prefetched
    }
}

/// Enum for all 4 provided prefetch strategies, dispatched statically like `GenericPolicy`
pub enum GenericPrefetcher {
    Null(NullPrefetcher),
    Adjacent(AdjacentPrefetcher),
    Sequential(SequentialPrefetcher),
    Stride(StridePrefetcher),
}

impl From<NullPrefetcher> for GenericPrefetcher {
    fn from(value: NullPrefetcher) -> Self {
        Self::Null(value)
    }
}

impl From<AdjacentPrefetcher> for GenericPrefetcher {
    fn from(value: AdjacentPrefetcher) -> Self {
        Self::Adjacent(value)
    }
}

impl From<SequentialPrefetcher> for GenericPrefetcher {
    fn from(value: SequentialPrefetcher) -> Self {
        Self::Sequential(value)
    }
}

impl From<StridePrefetcher> for GenericPrefetcher {
    fn from(value: StridePrefetcher) -> Self {
        Self::Stride(value)
    }
}

impl Prefetcher for GenericPrefetcher {
    fn on_access<M: MemoryPort>(&mut self, port: &mut M, address: u32, was_miss: bool) -> u32 {
        match self {
            GenericPrefetcher::Null(p) => p.on_access(port, address, was_miss),
            GenericPrefetcher::Adjacent(p) => p.on_access(port, address, was_miss),
            GenericPrefetcher::Sequential(p) => p.on_access(port, address, was_miss),
            GenericPrefetcher::Stride(p) => p.on_access(port, address, was_miss),
        }
    }
}
