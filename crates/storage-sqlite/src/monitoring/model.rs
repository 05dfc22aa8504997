//! Database models for monitoring configs.

use diesel::prelude::*;

use tickwatch_core::monitoring::MonitoringConfig;
use tickwatch_market_data::Symbol;

use crate::errors::StorageError;
use crate::prices::model::{format_instant, parse_instant};

/// Database model for stock monitoring
#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::stock_monitoring)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockMonitoringDB {
    pub id: String,
    pub symbol: String,
    pub is_active: bool,
    pub last_fetch: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&MonitoringConfig> for StockMonitoringDB {
    fn from(config: &MonitoringConfig) -> Self {
        Self {
            id: config.id.clone(),
            symbol: config.symbol.to_string(),
            is_active: config.is_active,
            last_fetch: config.last_fetch.as_ref().map(format_instant),
            created_at: format_instant(&config.created_at),
            updated_at: format_instant(&config.updated_at),
        }
    }
}

impl TryFrom<StockMonitoringDB> for MonitoringConfig {
    type Error = StorageError;

    fn try_from(row: StockMonitoringDB) -> Result<Self, Self::Error> {
        Ok(MonitoringConfig {
            symbol: Symbol::parse(&row.symbol)
                .map_err(|e| StorageError::CorruptRow(e.to_string()))?,
            last_fetch: row.last_fetch.as_deref().map(parse_instant).transpose()?,
            created_at: parse_instant(&row.created_at)?,
            updated_at: parse_instant(&row.updated_at)?,
            is_active: row.is_active,
            id: row.id,
        })
    }
}
