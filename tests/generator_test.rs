//! Property-based tests for candidate generation
//!
//! Invariants:
//! - batch size never exceeds the configured cap
//! - only above-average-bandwidth relays appear in candidates
//! - output is grouped by exit, pairings within a group are distinct
//! - regeneration through the refresh plan is destructive

use hopwatch::candidate::{regenerate, CandidateGenerator, GenerationCap};
use hopwatch::relay::{Geography, RelayRecord, RelayRole, Strategy};
use hopwatch::store::{CandidateStore, MemoryStore};
use proptest::prelude::*;
use std::collections::HashSet;

fn population(role: RelayRole, count: usize, above_avg_every: usize) -> Vec<RelayRecord> {
    (0..count)
        .map(|i| {
            RelayRecord::new(
                format!("{role:?}-{i:03}"),
                role,
                above_avg_every != 0 && i % above_avg_every == 0,
            )
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: the global cap bounds the whole batch
    #[test]
    fn prop_global_cap_bounds_batch(
        guards in 0usize..20,
        middles in 0usize..20,
        exits in 0usize..10,
        cap in 1usize..30,
    ) {
        let generator = CandidateGenerator::with_cap(GenerationCap::Global(cap));
        let batch = generator.generate(
            Strategy::Continent,
            &Geography::new("EU"),
            &population(RelayRole::Guard, guards, 1),
            &population(RelayRole::Middle, middles, 1),
            &population(RelayRole::Exit, exits, 1),
        );
        prop_assert!(batch.len() <= cap);
    }

    /// Property: batch size is exits * variation_limit when uncapped
    #[test]
    fn prop_uncapped_batch_size_is_exact(
        guards in 3usize..12,
        middles in 3usize..12,
        exits in 1usize..6,
    ) {
        let generator = CandidateGenerator::with_cap(GenerationCap::Global(10_000));
        let batch = generator.generate(
            Strategy::Continent,
            &Geography::new("EU"),
            &population(RelayRole::Guard, guards, 1),
            &population(RelayRole::Middle, middles, 1),
            &population(RelayRole::Exit, exits, 1),
        );
        let variation_limit = guards.min(middles).saturating_sub(2);
        prop_assert_eq!(batch.len(), exits * variation_limit);
    }

    /// Property: below-average relays never appear in any hop
    #[test]
    fn prop_only_above_average_relays_used(
        guards in 4usize..16,
        middles in 4usize..16,
        exits in 1usize..6,
    ) {
        let generator = CandidateGenerator::new();
        let guard_pop = population(RelayRole::Guard, guards, 2);
        let middle_pop = population(RelayRole::Middle, middles, 2);
        let exit_pop = population(RelayRole::Exit, exits, 2);

        let above_avg: HashSet<String> = guard_pop
            .iter()
            .chain(&middle_pop)
            .chain(&exit_pop)
            .filter(|r| r.above_avg_bandwidth())
            .map(|r| r.fingerprint().to_string())
            .collect();

        let batch = generator.generate(
            Strategy::Continent,
            &Geography::new("EU"),
            &guard_pop,
            &middle_pop,
            &exit_pop,
        );
        for candidate in &batch {
            for hop in candidate.hops() {
                prop_assert!(above_avg.contains(hop));
            }
        }
    }

    /// Property: output is grouped by exit in contiguous runs
    #[test]
    fn prop_output_grouped_by_exit(
        guards in 4usize..10,
        middles in 4usize..10,
        exits in 2usize..6,
    ) {
        let generator = CandidateGenerator::with_cap(GenerationCap::Global(10_000));
        let batch = generator.generate(
            Strategy::Continent,
            &Geography::new("EU"),
            &population(RelayRole::Guard, guards, 1),
            &population(RelayRole::Middle, middles, 1),
            &population(RelayRole::Exit, exits, 1),
        );

        let mut seen_exits: Vec<&str> = Vec::new();
        for candidate in &batch {
            match seen_exits.last() {
                Some(last) if *last == candidate.exit_fp() => {}
                _ => {
                    // a new run must be a new exit
                    prop_assert!(!seen_exits.contains(&candidate.exit_fp()));
                    seen_exits.push(candidate.exit_fp());
                }
            }
        }
    }

    /// Property: pairings within one exit group never repeat a guard or middle
    #[test]
    fn prop_pairings_distinct_within_exit(
        guards in 4usize..10,
        middles in 4usize..10,
    ) {
        let generator = CandidateGenerator::with_cap(GenerationCap::Global(10_000));
        let batch = generator.generate(
            Strategy::Continent,
            &Geography::new("EU"),
            &population(RelayRole::Guard, guards, 1),
            &population(RelayRole::Middle, middles, 1),
            &population(RelayRole::Exit, 1, 1),
        );

        let distinct_guards: HashSet<&str> = batch.iter().map(|c| c.guard_fp()).collect();
        let distinct_middles: HashSet<&str> = batch.iter().map(|c| c.middle_fp()).collect();
        prop_assert_eq!(distinct_guards.len(), batch.len());
        prop_assert_eq!(distinct_middles.len(), batch.len());
    }

    /// Property: the per-exit cap gives every exit the same coverage
    #[test]
    fn prop_per_exit_cap_covers_all_exits(
        exits in 1usize..8,
        cap in 1usize..4,
    ) {
        let generator = CandidateGenerator::with_cap(GenerationCap::PerExit(cap));
        let batch = generator.generate(
            Strategy::Continent,
            &Geography::new("EU"),
            &population(RelayRole::Guard, 10, 1),
            &population(RelayRole::Middle, 10, 1),
            &population(RelayRole::Exit, exits, 1),
        );
        prop_assert_eq!(batch.len(), exits * cap);
    }
}

fn geo_population() -> Vec<RelayRecord> {
    let mut relays = Vec::new();
    for (continent, country, count) in [("EU", "DE", 8), ("EU", "FR", 8), ("NA", "US", 8)] {
        for role in [RelayRole::Guard, RelayRole::Middle, RelayRole::Exit] {
            for i in 0..count {
                relays.push(
                    RelayRecord::builder(format!("{role:?}-{country}-{i}"), role, true)
                        .continent_code(continent)
                        .country_code(country)
                        .build(),
                );
            }
        }
    }
    relays
}

#[tokio::test]
async fn test_regenerate_fills_standard_batches() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let generator = CandidateGenerator::new();

    let written = regenerate(&generator, &geo_population(), &store).await?;

    assert_eq!(written, store.candidate_count());
    assert!(written > 0);

    // EU slice holds 16 relays per role => variation_limit 14 per exit
    let eu = store
        .candidates_for(Strategy::Continent, &Geography::new("EU"))
        .await?;
    assert_eq!(eu.len(), 16 * 14);

    // no relays on OC at all
    let oc = store
        .candidates_for(Strategy::Continent, &Geography::new("OC"))
        .await?;
    assert!(oc.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_regenerate_is_destructive() {
    let store = MemoryStore::new();
    let generator = CandidateGenerator::new();
    let population = geo_population();

    let first = regenerate(&generator, &population, &store).await.unwrap();
    let second = regenerate(&generator, &population, &store).await.unwrap();

    // the second refresh replaces, not appends
    assert_eq!(first, second);
    assert_eq!(store.candidate_count(), second);
}

#[tokio::test]
async fn test_regenerate_with_sparse_population_writes_nothing() {
    let store = MemoryStore::new();
    let generator = CandidateGenerator::new();

    // two relays per role is below the variation threshold everywhere
    let mut population = Vec::new();
    for role in [RelayRole::Guard, RelayRole::Middle, RelayRole::Exit] {
        for i in 0..2 {
            population.push(
                RelayRecord::builder(format!("{role:?}-{i}"), role, true)
                    .continent_code("EU")
                    .country_code("DE")
                    .build(),
            );
        }
    }

    let written = regenerate(&generator, &population, &store).await.unwrap();
    assert_eq!(written, 0);
    assert_eq!(store.candidate_count(), 0);
}
