use std::fmt;
use log::{debug, trace};
use crate::address::{AddressDecoder, DecodedAddress};
use crate::cache::{CacheStore, LineStatus};
use crate::config::{CacheGeometry, ConfigResult, SimulationConfig};
use crate::error::SimError;
use crate::history::{AccessHistory, LineIdentity, MissKind};
use crate::prefetchers::{GenericPrefetcher, Prefetcher};
use crate::replacement_policies::{GenericPolicy, ReplacementPolicy};
use crate::stats::Statistics;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Write => write!(f, "write"),
        }
    }
}

/// Who asked for an access. Prefetch-origin accesses never trigger further prefetching and are
/// left out of the primary hit and miss counters
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessOrigin {
    Demand,
    Prefetch,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit,
    Miss {
        kind: MissKind,
        /// Whether installing the line evicted a dirty line
        dirty_eviction: bool,
    },
}

impl AccessOutcome {
    pub fn is_miss(&self) -> bool {
        matches!(self, AccessOutcome::Miss { .. })
    }
}

/// The access entry point handed to prefetchers, so they can issue their own accesses through
/// the cache which triggered them
pub trait MemoryPort {
    fn memory_access(&mut self, address: u32, op: Operation, origin: AccessOrigin) -> Result<AccessOutcome, SimError>;

    fn decoder(&self) -> &AddressDecoder;
}

/// Everything of the engine except the prefetcher: lines, history, replacement policy and
/// counters
///
/// Keeping the prefetcher outside means a prefetcher can borrow the core mutably while it runs,
/// and since the core can't reach the prefetcher, prefetches can't recurse
pub struct CacheCore<R: ReplacementPolicy> {
    decoder: AddressDecoder,
    store: CacheStore,
    history: AccessHistory,
    policy: R,
    stats: Statistics,
}

impl<R: ReplacementPolicy> CacheCore<R> {
    pub fn new(geometry: CacheGeometry, policy: R) -> Self {
        Self {
            decoder: AddressDecoder::new(geometry.line_size, geometry.num_sets),
            store: CacheStore::new(geometry.num_sets, geometry.associativity),
            history: AccessHistory::default(),
            policy,
            stats: Statistics::default(),
        }
    }

    /// Performs one access, updating lines, history, policy and counters
    ///
    /// Fails only if the replacement policy picks a victim which isn't a valid line of the set
    fn access(&mut self, address: u32, op: Operation, origin: AccessOrigin) -> Result<AccessOutcome, SimError> {
        let DecodedAddress { tag, set, .. } = self.decoder.decode(address);
        let is_write = op == Operation::Write;
        let demand = origin == AccessOrigin::Demand;
        trace!("{op} at {address:#x} ({origin:?})");
        let outcome = match self.store.find(set, tag) {
            Some(slot) => {
                if demand {
                    self.stats.record_hit();
                }
                if is_write {
                    self.store.mark_dirty(set, slot);
                }
                self.policy.on_access(set, slot, is_write);
                AccessOutcome::Hit
            }
            None => {
                let kind = self.history.classify_and_record(LineIdentity { set, tag });
                if demand {
                    self.stats.record_miss(kind);
                }
                let (slot, dirty_eviction) = self.choose_slot(set)?;
                // Counted for prefetch-origin accesses too
                if dirty_eviction {
                    self.stats.record_dirty_eviction();
                }
                let status = if is_write { LineStatus::Dirty } else { LineStatus::Clean };
                self.store.install(set, slot, tag, status);
                self.policy.on_access(set, slot, is_write);
                AccessOutcome::Miss { kind, dirty_eviction }
            }
        };
        Ok(outcome)
    }

    /// Picks the slot a missing line goes into: the first invalid line, or the policy's victim
    /// once the set is full. Returns the slot and whether the line leaving it is dirty
    fn choose_slot(&mut self, set: u32) -> Result<(usize, bool), SimError> {
        if let Some(slot) = self.store.first_invalid(set) {
            return Ok((slot, false));
        }
        let victim = self.policy.select_victim(set, self.store.set(set));
        let line = self.store.set(set)
            .get(victim)
            .filter(|line| line.is_valid())
            .ok_or_else(|| SimError::InvariantViolation(format!(
                "replacement policy chose slot {victim} of set {set}, which holds no valid line"
            )))?;
        debug!("evicting {:?} line with tag {:#x} from set {set}, slot {victim}", line.status, line.tag);
        Ok((victim, line.is_dirty()))
    }
}

impl<R: ReplacementPolicy> MemoryPort for CacheCore<R> {
    fn memory_access(&mut self, address: u32, op: Operation, origin: AccessOrigin) -> Result<AccessOutcome, SimError> {
        self.access(address, op, origin)
    }

    fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }
}

/// A single level set-associative cache, parameterised by a replacement policy and a prefetcher
///
/// As with the policies, static dispatch is used throughout; `CacheEngine::from_config` builds the
/// enum-backed engine used by the simulator, while tests can plug in concrete types directly
pub struct CacheEngine<R: ReplacementPolicy = GenericPolicy, P: Prefetcher = GenericPrefetcher> {
    core: CacheCore<R>,
    prefetcher: P,
}

impl CacheEngine {
    /// Validates the configuration and builds the matching policy and prefetcher
    pub fn from_config(config: &SimulationConfig) -> ConfigResult<Self> {
        let geometry = config.geometry()?;
        Ok(Self::new(geometry, config.build_policy(&geometry), config.build_prefetcher()))
    }
}

impl<R: ReplacementPolicy, P: Prefetcher> CacheEngine<R, P> {
    pub fn new(geometry: CacheGeometry, policy: R, prefetcher: P) -> Self {
        Self {
            core: CacheCore::new(geometry, policy),
            prefetcher,
        }
    }

    /// Accesses the line containing `address`
    ///
    /// Demand accesses are followed by the prefetcher, whose accesses are made with
    /// `AccessOrigin::Prefetch` and counted in `prefetches`. Calling this with
    /// `AccessOrigin::Prefetch` performs the access alone
    ///
    /// # Arguments
    ///
    /// * `address`: Any byte address within the line
    /// * `op`: Read or write, a write leaves the line dirty
    /// * `origin`: Demand for trace references, Prefetch for speculative fetches
    ///
    /// returns: Result<AccessOutcome, SimError>, an error means the simulation can't continue
    pub fn memory_access(&mut self, address: u32, op: Operation, origin: AccessOrigin) -> Result<AccessOutcome, SimError> {
        let outcome = self.core.access(address, op, origin)?;
        if origin == AccessOrigin::Demand {
            let prefetched = self.prefetcher.on_access(&mut self.core, address, outcome.is_miss());
            self.core.stats.record_prefetches(prefetched);
        }
        Ok(outcome)
    }

    pub fn statistics(&self) -> &Statistics {
        &self.core.stats
    }

    pub fn store(&self) -> &CacheStore {
        &self.core.store
    }

    pub fn history(&self) -> &AccessHistory {
        &self.core.history
    }

    pub fn decoder(&self) -> &AddressDecoder {
        &self.core.decoder
    }

    pub fn prefetcher(&self) -> &P {
        &self.prefetcher
    }
}
