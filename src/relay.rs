//! Relay population value types
//!
//! Rows of the relay population are read-only inputs produced by the
//! consensus ingest (out of scope here). `RelayRecord` carries the fields
//! the generator and the refresh plan need: the stable fingerprint, the
//! role flag, the above-average-bandwidth flag, and geography codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a relay plays within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayRole {
    /// First hop, chosen for session continuity.
    Guard,
    /// Second hop, providing path diversity.
    #[serde(rename = "relay")]
    Middle,
    /// Final hop, through which application traffic egresses.
    Exit,
}

/// Relay-selection policy for a measurement session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Let the control-protocol client choose the full path with its
    /// normal bandwidth-weighted guard-selection algorithm.
    #[serde(rename = "weighted")]
    Weighted,
    /// Restrict relay selection to one continent.
    #[serde(rename = "continent_code")]
    Continent,
    /// Restrict relay selection to one country.
    #[serde(rename = "country_code")]
    Country,
}

impl Strategy {
    /// Whether path selection is delegated to the control-protocol client.
    #[must_use]
    pub const fn is_automatic(&self) -> bool {
        matches!(self, Self::Weighted)
    }

    /// Stable name used in persisted rows.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weighted => "weighted",
            Self::Continent => "continent_code",
            Self::Country => "country_code",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geography code a fixed strategy restricts selection to.
///
/// A continent code (`"EU"`) under [`Strategy::Continent`], a country code
/// (`"DE"`) under [`Strategy::Country`]. Sessions using the weighted
/// strategy still carry a geography tag for persisted rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Geography(String);

impl Geography {
    /// Create a geography tag from a code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Tag used when selection is not geographically restricted.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::new("ANY")
    }

    /// Get the raw code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Geography {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Coarse time-of-day tag attached to a measurement session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// Daytime, 6am to 6pm local.
    #[serde(rename = "da")]
    Day,
    /// Nighttime, 6pm to 6am local.
    #[serde(rename = "ni")]
    Night,
}

impl Period {
    /// Stable tag used in persisted rows.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "da",
            Self::Night => "ni",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the relay population.
///
/// Immutable once read. The generator only consumes the fingerprint and
/// the above-average flag; role and geography codes drive the slicing in
/// [`crate::candidate::regenerate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRecord {
    fingerprint: String,
    role: RelayRole,
    above_avg_bandwidth: bool,
    #[serde(default)]
    continent_code: String,
    #[serde(default)]
    country_code: String,
    #[serde(default)]
    bandwidth: u64,
}

impl RelayRecord {
    /// Create a relay record with empty geography codes.
    #[must_use]
    pub fn new(fingerprint: impl Into<String>, role: RelayRole, above_avg_bandwidth: bool) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            role,
            above_avg_bandwidth,
            continent_code: String::new(),
            country_code: String::new(),
            bandwidth: 0,
        }
    }

    /// Create a builder for a record with geography and bandwidth detail.
    #[must_use]
    pub fn builder(
        fingerprint: impl Into<String>,
        role: RelayRole,
        above_avg_bandwidth: bool,
    ) -> RelayRecordBuilder {
        RelayRecordBuilder::new(fingerprint, role, above_avg_bandwidth)
    }

    /// Get the relay fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Get the relay's role flag.
    #[must_use]
    pub const fn role(&self) -> RelayRole {
        self.role
    }

    /// Whether the relay advertises above-average bandwidth.
    #[must_use]
    pub const fn above_avg_bandwidth(&self) -> bool {
        self.above_avg_bandwidth
    }

    /// Get the continent code, empty if unknown.
    #[must_use]
    pub fn continent_code(&self) -> &str {
        &self.continent_code
    }

    /// Get the country code, empty if unknown.
    #[must_use]
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Get the advertised bandwidth in bytes per second.
    #[must_use]
    pub const fn bandwidth(&self) -> u64 {
        self.bandwidth
    }

    /// Whether this relay falls inside the given strategy's geography.
    ///
    /// The weighted strategy never restricts by geography.
    #[must_use]
    pub fn in_geography(&self, strategy: Strategy, geography: &Geography) -> bool {
        match strategy {
            Strategy::Weighted => true,
            Strategy::Continent => self.continent_code == geography.as_str(),
            Strategy::Country => self.country_code == geography.as_str(),
        }
    }
}

/// Builder for [`RelayRecord`].
#[derive(Debug)]
pub struct RelayRecordBuilder {
    record: RelayRecord,
}

impl RelayRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        fingerprint: impl Into<String>,
        role: RelayRole,
        above_avg_bandwidth: bool,
    ) -> Self {
        Self {
            record: RelayRecord::new(fingerprint, role, above_avg_bandwidth),
        }
    }

    /// Set the continent code.
    #[must_use]
    pub fn continent_code(mut self, code: impl Into<String>) -> Self {
        self.record.continent_code = code.into();
        self
    }

    /// Set the country code.
    #[must_use]
    pub fn country_code(mut self, code: impl Into<String>) -> Self {
        self.record.country_code = code.into();
        self
    }

    /// Set the advertised bandwidth in bytes per second.
    #[must_use]
    pub const fn bandwidth(mut self, bandwidth: u64) -> Self {
        self.record.bandwidth = bandwidth;
        self
    }

    /// Build the [`RelayRecord`].
    #[must_use]
    pub fn build(self) -> RelayRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names_are_stable() {
        assert_eq!(Strategy::Weighted.as_str(), "weighted");
        assert_eq!(Strategy::Continent.as_str(), "continent_code");
        assert_eq!(Strategy::Country.as_str(), "country_code");
    }

    #[test]
    fn test_only_weighted_is_automatic() {
        assert!(Strategy::Weighted.is_automatic());
        assert!(!Strategy::Continent.is_automatic());
        assert!(!Strategy::Country.is_automatic());
    }

    #[test]
    fn test_period_tags() {
        assert_eq!(Period::Day.as_str(), "da");
        assert_eq!(Period::Night.as_str(), "ni");
    }

    #[test]
    fn test_geography_matching() {
        let relay = RelayRecord::builder("FP1", RelayRole::Guard, true)
            .continent_code("EU")
            .country_code("DE")
            .build();

        assert!(relay.in_geography(Strategy::Continent, &Geography::new("EU")));
        assert!(!relay.in_geography(Strategy::Continent, &Geography::new("NA")));
        assert!(relay.in_geography(Strategy::Country, &Geography::new("DE")));
        assert!(!relay.in_geography(Strategy::Country, &Geography::new("US")));
        assert!(relay.in_geography(Strategy::Weighted, &Geography::new("ZZ")));
    }

    #[test]
    fn test_record_serde_round_trip() {
        let relay = RelayRecord::builder("FP1", RelayRole::Middle, true)
            .continent_code("NA")
            .country_code("US")
            .bandwidth(1_500_000)
            .build();

        let json = serde_json::to_string(&relay).unwrap();
        assert!(json.contains("\"relay\""));
        let back: RelayRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, relay);
    }
}
