use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::config::{PrefetchStrategyConfig, ReplacementPolicyConfig, SimulationConfig};
use crate::engine::Operation;
use crate::simulator::TraceRecord;

pub const ALL_POLICIES: [ReplacementPolicyConfig; 3] = [
    ReplacementPolicyConfig::LeastRecentlyUsed,
    ReplacementPolicyConfig::Random,
    ReplacementPolicyConfig::LeastRecentlyUsedPreferClean,
];

pub const ALL_STRATEGIES: [PrefetchStrategyConfig; 4] = [
    PrefetchStrategyConfig::Null,
    PrefetchStrategyConfig::Adjacent,
    PrefetchStrategyConfig::Sequential,
    PrefetchStrategyConfig::Custom,
];

/// A 32KiB, 512 line, 4-way cache with a seeded random policy
pub fn example_config(policy: ReplacementPolicyConfig, strategy: PrefetchStrategyConfig) -> SimulationConfig {
    SimulationConfig {
        replacement_policy: policy,
        cache_size: 32768,
        cache_lines: 512,
        associativity: 4,
        prefetch_strategy: strategy,
        prefetch_amount: 3,
        seed: Some(4202),
    }
}

/// `count` references starting at `start`, `stride` bytes apart
pub fn strided_trace(start: u32, stride: u32, count: usize, op: Operation) -> Vec<TraceRecord> {
    (0..count as u32)
        .map(|i| TraceRecord { op, address: start.wrapping_add(stride.wrapping_mul(i)) })
        .collect()
}

/// `count` uniformly random references below `max_address`, a quarter of them writes
pub fn random_trace(seed: u64, count: usize, max_address: u32) -> Vec<TraceRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| TraceRecord {
            op: if rng.gen_ratio(1, 4) { Operation::Write } else { Operation::Read },
            address: rng.gen_range(0..max_address),
        })
        .collect()
}

/// Writes records in the `<R|W> <hex address>` trace format
pub fn render_trace(records: &[TraceRecord]) -> String {
    records
        .iter()
        .map(|r| {
            let op = match r.op {
                Operation::Read => 'R',
                Operation::Write => 'W',
            };
            format!("{op} 0x{:x}\n", r.address)
        })
        .collect()
}
