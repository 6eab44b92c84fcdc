use crate::config::{CacheGeometry, PrefetchStrategyConfig, ReplacementPolicyConfig, SimulationConfig};
use crate::engine::CacheEngine;
use crate::error::ConfigError;
use crate::prefetchers::GenericPrefetcher;
use crate::replacement_policies::GenericPolicy;

fn config(cache_size: u32, cache_lines: u32, associativity: u32) -> SimulationConfig {
    SimulationConfig {
        replacement_policy: ReplacementPolicyConfig::LeastRecentlyUsed,
        cache_size,
        cache_lines,
        associativity,
        prefetch_strategy: PrefetchStrategyConfig::Null,
        prefetch_amount: 0,
        seed: None,
    }
}

#[test]
fn derives_line_size_and_sets() {
    assert_eq!(
        config(32768, 512, 4).geometry(),
        Ok(CacheGeometry { line_size: 64, num_sets: 128, associativity: 4 })
    );
    // Fully associative
    assert_eq!(
        config(1024, 16, 16).geometry(),
        Ok(CacheGeometry { line_size: 64, num_sets: 1, associativity: 16 })
    );
}

#[test]
fn rejects_non_power_of_two_line_size() {
    assert_eq!(
        config(3000, 100, 1).geometry(),
        Err(ConfigError::NotPowerOfTwo { what: "line size", value: 30 })
    );
}

#[test]
fn rejects_non_power_of_two_set_count() {
    assert_eq!(
        config(768, 12, 4).geometry(),
        Err(ConfigError::NotPowerOfTwo { what: "number of sets", value: 3 })
    );
}

#[test]
fn allows_non_power_of_two_associativity() {
    // 12 lines in 4 sets of 3
    assert_eq!(
        config(768, 12, 3).geometry(),
        Ok(CacheGeometry { line_size: 64, num_sets: 4, associativity: 3 })
    );
}

#[test]
fn rejects_associativity_not_dividing_lines() {
    assert_eq!(
        config(1024, 16, 32).geometry(),
        Err(ConfigError::UnevenSets { associativity: 32, cache_lines: 16 })
    );
    assert_eq!(
        config(1024, 16, 6).geometry(),
        Err(ConfigError::UnevenSets { associativity: 6, cache_lines: 16 })
    );
}

#[test]
fn rejects_cache_size_not_dividing_into_lines() {
    assert_eq!(
        config(1000, 16, 1).geometry(),
        Err(ConfigError::UnevenLineSize { cache_size: 1000, cache_lines: 16 })
    );
}

#[test]
fn rejects_zeroes() {
    assert_eq!(config(0, 16, 1).geometry(), Err(ConfigError::Zero("cache size")));
    assert_eq!(config(1024, 0, 1).geometry(), Err(ConfigError::Zero("cache lines")));
    assert_eq!(config(1024, 16, 0).geometry(), Err(ConfigError::Zero("associativity")));
}

#[test]
fn invalid_config_builds_no_engine() {
    assert!(CacheEngine::from_config(&config(3000, 100, 1)).is_err());
    assert!(CacheEngine::from_config(&config(32768, 512, 4)).is_ok());
}

#[test]
fn parses_canonical_names() {
    assert_eq!("LRU".parse::<ReplacementPolicyConfig>(), Ok(ReplacementPolicyConfig::LeastRecentlyUsed));
    assert_eq!("RAND".parse::<ReplacementPolicyConfig>(), Ok(ReplacementPolicyConfig::Random));
    assert_eq!("LRU_PREFER_CLEAN".parse::<ReplacementPolicyConfig>(), Ok(ReplacementPolicyConfig::LeastRecentlyUsedPreferClean));
    assert_eq!("NULL".parse::<PrefetchStrategyConfig>(), Ok(PrefetchStrategyConfig::Null));
    assert_eq!("ADJACENT".parse::<PrefetchStrategyConfig>(), Ok(PrefetchStrategyConfig::Adjacent));
    assert_eq!("SEQUENTIAL".parse::<PrefetchStrategyConfig>(), Ok(PrefetchStrategyConfig::Sequential));
    assert_eq!("CUSTOM".parse::<PrefetchStrategyConfig>(), Ok(PrefetchStrategyConfig::Custom));
}

#[test]
fn rejects_unknown_names() {
    assert_eq!(
        "FIFO".parse::<ReplacementPolicyConfig>(),
        Err(ConfigError::UnknownReplacementPolicy("FIFO".to_string()))
    );
    assert_eq!(
        "lru".parse::<ReplacementPolicyConfig>(),
        Err(ConfigError::UnknownReplacementPolicy("lru".to_string()))
    );
    assert_eq!(
        "STREAM".parse::<PrefetchStrategyConfig>(),
        Err(ConfigError::UnknownPrefetchStrategy("STREAM".to_string()))
    );
}

#[test]
fn builds_the_configured_variants() {
    let mut config = config(32768, 512, 4);
    config.replacement_policy = ReplacementPolicyConfig::Random;
    config.prefetch_strategy = PrefetchStrategyConfig::Custom;
    let geometry = config.geometry().unwrap();
    assert!(matches!(config.build_policy(&geometry), GenericPolicy::Random(_)));
    assert!(matches!(config.build_prefetcher(), GenericPrefetcher::Stride(_)));
    config.prefetch_strategy = PrefetchStrategyConfig::Sequential;
    assert!(matches!(config.build_prefetcher(), GenericPrefetcher::Sequential(_)));
}

#[test]
fn deserialises_json_with_defaults_and_aliases() {
    let json = r#"{
        "replacement_policy": "lru_prefer_clean",
        "cache_size": 4096,
        "lines": 64,
        "associativity": 2
    }"#;
    let parsed: SimulationConfig = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.replacement_policy, ReplacementPolicyConfig::LeastRecentlyUsedPreferClean);
    assert_eq!(parsed.cache_lines, 64);
    assert_eq!(parsed.prefetch_strategy, PrefetchStrategyConfig::Null);
    assert_eq!(parsed.prefetch_amount, 0);
    assert_eq!(parsed.seed, None);
}

#[test]
fn serialises_canonical_names() {
    let mut config = config(4096, 64, 2);
    config.prefetch_strategy = PrefetchStrategyConfig::Sequential;
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["replacement_policy"], "LRU");
    assert_eq!(json["prefetch_strategy"], "SEQUENTIAL");
    assert!(json.get("seed").is_none());
}

#[test]
fn parameter_info_matches_report_layout() {
    let text = config(32768, 512, 4).to_string();
    assert!(text.starts_with("Parameter Info\n==============\n"));
    assert!(text.contains("Replacement Policy: LRU\n"));
    assert!(text.contains("Line Size: 64B\n"));
    assert!(text.ends_with("Number of Sets: 128"));
}
