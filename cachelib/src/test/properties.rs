use std::collections::HashSet;
use proptest::prelude::*;
use crate::config::{PrefetchStrategyConfig, ReplacementPolicyConfig, SimulationConfig};
use crate::engine::{AccessOrigin, AccessOutcome, CacheEngine, Operation};
use crate::history::{LineIdentity, MissKind};
use crate::util::{ALL_POLICIES, ALL_STRATEGIES};

/// A tiny cache (16 lines of 16 bytes, 2-way) so short traces over a few KiB evict constantly
fn small_config(policy: ReplacementPolicyConfig, strategy: PrefetchStrategyConfig) -> SimulationConfig {
    SimulationConfig {
        replacement_policy: policy,
        cache_size: 256,
        cache_lines: 16,
        associativity: 2,
        prefetch_strategy: strategy,
        prefetch_amount: 2,
        seed: Some(7),
    }
}

fn trace() -> impl Strategy<Value = Vec<(Operation, u32)>> {
    let op = prop_oneof![Just(Operation::Read), Just(Operation::Write)];
    prop::collection::vec((op, 0u32..4096), 0..300)
}

fn policy() -> impl Strategy<Value = ReplacementPolicyConfig> {
    prop::sample::select(ALL_POLICIES.to_vec())
}

fn strategy() -> impl Strategy<Value = PrefetchStrategyConfig> {
    prop::sample::select(ALL_STRATEGIES.to_vec())
}

proptest! {
    #[test]
    fn counters_stay_consistent(trace in trace(), policy in policy(), strategy in strategy()) {
        let mut engine = CacheEngine::from_config(&small_config(policy, strategy)).unwrap();
        for (op, address) in trace {
            engine.memory_access(address, op, AccessOrigin::Demand).unwrap();
            let stats = engine.statistics();
            prop_assert_eq!(stats.accesses, stats.hits + stats.misses);
            prop_assert_eq!(stats.misses, stats.compulsory_misses + stats.conflict_misses);
        }
    }

    #[test]
    fn first_miss_on_a_line_is_compulsory(trace in trace(), policy in policy()) {
        let mut engine = CacheEngine::from_config(&small_config(policy, PrefetchStrategyConfig::Null)).unwrap();
        let mut seen = HashSet::new();
        for (op, address) in trace {
            let decoded = engine.decoder().decode(address);
            let first_time = seen.insert(LineIdentity { set: decoded.set, tag: decoded.tag });
            match engine.memory_access(address, op, AccessOrigin::Demand).unwrap() {
                AccessOutcome::Miss { kind, .. } => {
                    let expected = if first_time { MissKind::Compulsory } else { MissKind::Conflict };
                    prop_assert_eq!(kind, expected);
                }
                AccessOutcome::Hit => prop_assert!(!first_time),
            }
        }
    }

    #[test]
    fn dirty_evictions_match_evicted_dirty_lines(trace in trace(), policy in policy()) {
        let mut engine = CacheEngine::from_config(&small_config(policy, PrefetchStrategyConfig::Null)).unwrap();
        let mut dirty_evictions = 0;
        for (op, address) in trace {
            let decoded = engine.decoder().decode(address);
            let set = engine.store().set(decoded.set).to_vec();
            let outcome = engine.memory_access(address, op, AccessOrigin::Demand).unwrap();
            if let AccessOutcome::Miss { dirty_eviction, .. } = outcome {
                // Whichever line disappeared from the set is the one that was evicted
                let after = engine.store().set(decoded.set);
                let evicted = set.iter().zip(after).find(|(before, now)| before.is_valid() && before != now);
                prop_assert_eq!(dirty_eviction, evicted.map_or(false, |(before, _)| before.is_dirty()));
                if dirty_eviction {
                    dirty_evictions += 1;
                }
            }
        }
        prop_assert_eq!(engine.statistics().dirty_evictions, dirty_evictions);
    }

    #[test]
    fn prefetching_never_changes_demand_access_count(trace in trace(), policy in policy(), strategy in strategy()) {
        let mut engine = CacheEngine::from_config(&small_config(policy, strategy)).unwrap();
        let length = trace.len() as u32;
        for (op, address) in trace {
            engine.memory_access(address, op, AccessOrigin::Demand).unwrap();
        }
        prop_assert_eq!(engine.statistics().accesses, length);
        if strategy == PrefetchStrategyConfig::Null {
            prop_assert_eq!(engine.statistics().prefetches, 0);
        }
        if strategy == PrefetchStrategyConfig::Adjacent {
            prop_assert_eq!(engine.statistics().prefetches, length);
        }
    }
}
