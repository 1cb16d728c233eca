use std::collections::HashMap;

use super::types::InfrastructureRecord;

/// Static infrastructure data used when every live query for a region has
/// failed. Built from configuration and read-only afterwards, so concurrent
/// scoring runs cannot interfere with each other.
#[derive(Debug, Clone, Default)]
pub struct RegionalInfrastructureDatabase {
    records: HashMap<String, InfrastructureRecord>,
}

impl RegionalInfrastructureDatabase {
    pub fn new(records: HashMap<String, InfrastructureRecord>) -> Self {
        Self { records }
    }

    /// Small built-in table used by `init` to seed demo configs.
    pub fn with_defaults() -> Self {
        Self::new(default_entries())
    }

    pub fn get(&self, key: &str) -> Option<&InfrastructureRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Seed records for a handful of US metros, precomputed with the analyzer's
/// aggregation weights.
pub fn default_entries() -> HashMap<String, InfrastructureRecord> {
    let mut records = HashMap::new();
    records.insert(
        "austin-tx".to_string(),
        InfrastructureRecord { infra_score: 50, highways: 12, airports: 2, railways: 5, ports: 0 },
    );
    records.insert(
        "denver-co".to_string(),
        InfrastructureRecord { infra_score: 70, highways: 14, airports: 3, railways: 8, ports: 0 },
    );
    records.insert(
        "houston-tx".to_string(),
        InfrastructureRecord { infra_score: 91, highways: 18, airports: 3, railways: 9, ports: 4 },
    );
    records.insert(
        "boise-id".to_string(),
        InfrastructureRecord { infra_score: 26, highways: 6, airports: 1, railways: 3, ports: 0 },
    );
    records
}
