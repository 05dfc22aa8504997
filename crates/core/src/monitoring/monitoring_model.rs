//! Monitoring domain models.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tickwatch_market_data::Symbol;

/// One row per monitored symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringConfig {
    pub id: String,
    pub symbol: Symbol,
    pub is_active: bool,
    pub last_fetch: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MonitoringConfig {
    /// A freshly enabled config. Ids are UUIDv7 so they sort by creation.
    pub fn new_active(symbol: Symbol, now: DateTime<Utc>) -> Self {
        let now = now.trunc_subsecs(6);
        Self {
            id: Uuid::now_v7().to_string(),
            symbol,
            is_active: true,
            last_fetch: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> MonitoringState {
        if self.is_active {
            MonitoringState::Active
        } else {
            MonitoringState::Inactive
        }
    }
}

/// Lifecycle state of a symbol in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitoringState {
    Absent,
    Active,
    Inactive,
}

impl MonitoringState {
    pub fn of(config: Option<&MonitoringConfig>) -> Self {
        config.map_or(MonitoringState::Absent, MonitoringConfig::state)
    }
}
