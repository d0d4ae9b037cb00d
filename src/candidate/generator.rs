//! Candidate circuit generation
//!
//! Builds a bounded batch of three-hop candidate paths from role-sliced
//! relay population slices. The shape of a batch:
//!
//! - only above-average-bandwidth relays participate
//! - each slice is shuffled independently to avoid positional bias
//! - the exit stays fixed while guards and middles vary: for each exit,
//!   `guards[i]` is paired with `middles[i]` for `i` below the variation
//!   limit `min(|guards|, |middles|) - 2`
//! - a cap bounds the batch size; see [`GenerationCap`]
//!
//! Generation is pure computation; persisting the batch is the caller's
//! concern.

use crate::candidate::CandidateCircuit;
use crate::relay::{Geography, RelayRecord, Strategy};
use rand::seq::SliceRandom;
use rand::Rng;

/// Default cap on the number of candidates in one batch.
pub const DEFAULT_CIRCUIT_LIMIT: usize = 1000;

/// Scope of the generation cap.
///
/// The historical behavior is a single counter across the whole batch:
/// exits late in the shuffle order can receive zero candidates once the
/// counter runs out. `PerExit` caps each exit's pairings instead, giving
/// every exit equal coverage at the cost of a larger batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationCap {
    /// One running counter across all exits in the batch.
    Global(usize),
    /// A fresh counter for each exit.
    PerExit(usize),
}

impl Default for GenerationCap {
    fn default() -> Self {
        Self::Global(DEFAULT_CIRCUIT_LIMIT)
    }
}

/// Generator for candidate circuit batches.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateGenerator {
    cap: GenerationCap,
}

impl CandidateGenerator {
    /// Create a generator with the default global cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator with an explicit cap.
    #[must_use]
    pub const fn with_cap(cap: GenerationCap) -> Self {
        Self { cap }
    }

    /// Get the configured cap.
    #[must_use]
    pub const fn cap(&self) -> GenerationCap {
        self.cap
    }

    /// Generate a candidate batch using the thread-local RNG.
    ///
    /// Returns an empty batch when fewer than three above-average guards
    /// or middles remain after filtering (variation limit reaches zero).
    #[must_use]
    pub fn generate(
        &self,
        strategy: Strategy,
        geography: &Geography,
        guards: &[RelayRecord],
        middles: &[RelayRecord],
        exits: &[RelayRecord],
    ) -> Vec<CandidateCircuit> {
        self.generate_with(&mut rand::thread_rng(), strategy, geography, guards, middles, exits)
    }

    /// Generate a candidate batch with a caller-supplied RNG.
    ///
    /// Output order is grouped by exit in shuffle order, then by
    /// increasing pairing index within each exit.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        strategy: Strategy,
        geography: &Geography,
        guards: &[RelayRecord],
        middles: &[RelayRecord],
        exits: &[RelayRecord],
    ) -> Vec<CandidateCircuit> {
        let mut guards = above_average(guards);
        let mut middles = above_average(middles);
        let mut exits = above_average(exits);

        guards.shuffle(rng);
        middles.shuffle(rng);
        exits.shuffle(rng);

        let variation_limit = guards.len().min(middles.len()).saturating_sub(2);
        if variation_limit == 0 {
            return Vec::new();
        }

        let mut circuits = Vec::new();
        let mut generated = 0usize;

        'exits: for exit in &exits {
            let mut per_exit = 0usize;

            for pairing in 0..variation_limit {
                match self.cap {
                    GenerationCap::Global(limit) if generated >= limit => break 'exits,
                    GenerationCap::PerExit(limit) if per_exit >= limit => break,
                    _ => {}
                }

                circuits.push(CandidateCircuit::new(
                    guards[pairing].fingerprint(),
                    middles[pairing].fingerprint(),
                    exit.fingerprint(),
                    strategy,
                    geography.clone(),
                ));

                generated += 1;
                per_exit += 1;
            }
        }

        circuits
    }
}

fn above_average(records: &[RelayRecord]) -> Vec<&RelayRecord> {
    records.iter().filter(|r| r.above_avg_bandwidth()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelayRole;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn relays(role: RelayRole, count: usize, above_avg: bool) -> Vec<RelayRecord> {
        (0..count)
            .map(|i| RelayRecord::new(format!("{role:?}-{i}"), role, above_avg))
            .collect()
    }

    fn generate(
        generator: &CandidateGenerator,
        guards: &[RelayRecord],
        middles: &[RelayRecord],
        exits: &[RelayRecord],
    ) -> Vec<CandidateCircuit> {
        let mut rng = SmallRng::seed_from_u64(7);
        generator.generate_with(
            &mut rng,
            Strategy::Continent,
            &Geography::new("EU"),
            guards,
            middles,
            exits,
        )
    }

    #[test]
    fn test_variation_limit_bounds_pairings_per_exit() {
        let generator = CandidateGenerator::new();
        let guards = relays(RelayRole::Guard, 5, true);
        let middles = relays(RelayRole::Middle, 5, true);
        let exits = relays(RelayRole::Exit, 2, true);

        let circuits = generate(&generator, &guards, &middles, &exits);

        // variation_limit = min(5, 5) - 2 = 3, two exits => 6 candidates
        assert_eq!(circuits.len(), 6);

        // grouped by exit: first three share one exit, last three the other
        let first_exit = circuits[0].exit_fp().to_owned();
        assert!(circuits[..3].iter().all(|c| c.exit_fp() == first_exit));
        let second_exit = circuits[3].exit_fp().to_owned();
        assert_ne!(first_exit, second_exit);
        assert!(circuits[3..].iter().all(|c| c.exit_fp() == second_exit));

        // pairings within a group are distinct
        for group in circuits.chunks(3) {
            for (a, b) in [(0, 1), (0, 2), (1, 2)] {
                assert_ne!(group[a].guard_fp(), group[b].guard_fp());
                assert_ne!(group[a].middle_fp(), group[b].middle_fp());
            }
        }
    }

    #[test]
    fn test_too_small_population_generates_nothing() {
        let generator = CandidateGenerator::new();
        let guards = relays(RelayRole::Guard, 2, true);
        let middles = relays(RelayRole::Middle, 2, true);
        let exits = relays(RelayRole::Exit, 4, true);

        assert!(generate(&generator, &guards, &middles, &exits).is_empty());
    }

    #[test]
    fn test_below_average_records_are_filtered() {
        let generator = CandidateGenerator::new();
        let guards = relays(RelayRole::Guard, 8, false);
        let middles = relays(RelayRole::Middle, 8, true);
        let exits = relays(RelayRole::Exit, 2, true);

        // all guards filtered out => variation limit 0 => nothing
        assert!(generate(&generator, &guards, &middles, &exits).is_empty());
    }

    #[test]
    fn test_global_cap_stops_mid_exit() {
        let generator = CandidateGenerator::with_cap(GenerationCap::Global(4));
        let guards = relays(RelayRole::Guard, 5, true);
        let middles = relays(RelayRole::Middle, 5, true);
        let exits = relays(RelayRole::Exit, 3, true);

        let circuits = generate(&generator, &guards, &middles, &exits);

        // variation limit 3, cap 4: the second exit gets a single pairing
        // and the third exit none
        assert_eq!(circuits.len(), 4);
        let distinct_exits: std::collections::HashSet<_> =
            circuits.iter().map(CandidateCircuit::exit_fp).collect();
        assert_eq!(distinct_exits.len(), 2);
    }

    #[test]
    fn test_per_exit_cap_covers_every_exit() {
        let generator = CandidateGenerator::with_cap(GenerationCap::PerExit(2));
        let guards = relays(RelayRole::Guard, 6, true);
        let middles = relays(RelayRole::Middle, 6, true);
        let exits = relays(RelayRole::Exit, 4, true);

        let circuits = generate(&generator, &guards, &middles, &exits);

        assert_eq!(circuits.len(), 8);
        let distinct_exits: std::collections::HashSet<_> =
            circuits.iter().map(CandidateCircuit::exit_fp).collect();
        assert_eq!(distinct_exits.len(), 4);
    }

    #[test]
    fn test_candidates_are_tagged_with_batch_strategy() {
        let generator = CandidateGenerator::new();
        let guards = relays(RelayRole::Guard, 4, true);
        let middles = relays(RelayRole::Middle, 4, true);
        let exits = relays(RelayRole::Exit, 1, true);

        let circuits = generate(&generator, &guards, &middles, &exits);

        assert_eq!(circuits.len(), 2);
        for circuit in &circuits {
            assert_eq!(circuit.strategy(), Strategy::Continent);
            assert_eq!(circuit.geography().as_str(), "EU");
        }
    }
}
