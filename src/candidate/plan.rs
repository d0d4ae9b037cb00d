//! Population refresh plan
//!
//! The candidate store is regenerated wholesale from the relay population:
//! for every (strategy, geography) batch in the standard matrix, slice the
//! population by role and geography, run the generator, and replace the
//! store contents with the combined result. Regeneration is destructive —
//! previously stored candidates do not survive a refresh.

use crate::candidate::CandidateGenerator;
use crate::relay::{Geography, RelayRecord, RelayRole, Strategy};
use crate::store::CandidateStore;
use crate::Result;
use tracing::info;

/// Continents measured under [`Strategy::Continent`].
pub const CONTINENT_CODES: [&str; 5] = ["EU", "NA", "OC", "SA", "AS"];

/// Top ten countries by relay count, measured under [`Strategy::Country`].
pub const COUNTRY_CODES: [&str; 10] =
    ["DE", "US", "FR", "NL", "RU", "GB", "CA", "CH", "UA", "SE"];

/// The standard (strategy, geography) batches a refresh regenerates.
#[must_use]
pub fn standard_batches() -> Vec<(Strategy, Geography)> {
    let continents = CONTINENT_CODES
        .iter()
        .map(|code| (Strategy::Continent, Geography::new(*code)));
    let countries = COUNTRY_CODES
        .iter()
        .map(|code| (Strategy::Country, Geography::new(*code)));
    continents.chain(countries).collect()
}

/// Regenerate the candidate store from a relay population.
///
/// Runs the generator once per batch in [`standard_batches`] and replaces
/// the store contents with the combined result. Returns the number of
/// candidates written.
///
/// # Errors
///
/// Returns [`crate::Error::Persistence`] when the store rejects the
/// replacement write.
pub async fn regenerate<S: CandidateStore>(
    generator: &CandidateGenerator,
    population: &[RelayRecord],
    store: &S,
) -> Result<usize> {
    let mut batch = Vec::new();

    for (strategy, geography) in standard_batches() {
        let guards = slice(population, RelayRole::Guard, strategy, &geography);
        let middles = slice(population, RelayRole::Middle, strategy, &geography);
        let exits = slice(population, RelayRole::Exit, strategy, &geography);

        let circuits = generator.generate(strategy, &geography, &guards, &middles, &exits);
        info!(
            strategy = %strategy,
            geography = %geography,
            candidates = circuits.len(),
            "generated candidate batch"
        );
        batch.extend(circuits);
    }

    let written = batch.len();
    store.replace(&batch).await?;
    Ok(written)
}

fn slice(
    population: &[RelayRecord],
    role: RelayRole,
    strategy: Strategy,
    geography: &Geography,
) -> Vec<RelayRecord> {
    population
        .iter()
        .filter(|r| r.role() == role && r.in_geography(strategy, geography))
        .cloned()
        .collect()
}
