use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;

use super::model::StockMonitoringDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{is_unique_violation, IntoCore};
use crate::prices::model::format_instant;
use crate::schema::stock_monitoring::dsl as monitoring_dsl;
use tickwatch_core::monitoring::{MonitoringConfig, MonitoringStore};
use tickwatch_core::{Error, Result};
use tickwatch_market_data::Symbol;

pub struct MonitoringRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl MonitoringRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn to_domain(row: StockMonitoringDB) -> Result<MonitoringConfig> {
    MonitoringConfig::try_from(row).map_err(Error::from)
}

#[async_trait]
impl MonitoringStore for MonitoringRepository {
    fn get(&self, symbol: &Symbol) -> Result<Option<MonitoringConfig>> {
        let mut conn = get_connection(&self.pool)?;

        monitoring_dsl::stock_monitoring
            .filter(monitoring_dsl::symbol.eq(symbol.as_str()))
            .select(StockMonitoringDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?
            .map(to_domain)
            .transpose()
    }

    fn list(&self, active_only: bool) -> Result<Vec<MonitoringConfig>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = monitoring_dsl::stock_monitoring
            .select(StockMonitoringDB::as_select())
            .order((monitoring_dsl::created_at.asc(), monitoring_dsl::id.asc()))
            .into_boxed();
        if active_only {
            query = query.filter(monitoring_dsl::is_active.eq(true));
        }

        query
            .load(&mut conn)
            .into_core()?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn insert(&self, config: MonitoringConfig) -> Result<MonitoringConfig> {
        let row = StockMonitoringDB::from(&config);
        let symbol = config.symbol.to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                match diesel::insert_into(monitoring_dsl::stock_monitoring)
                    .values(&row)
                    .execute(conn)
                {
                    Ok(_) => Ok(()),
                    Err(e) if is_unique_violation(&e) => Err(Error::MonitoringConflict(symbol)),
                    Err(e) => Err(e).into_core(),
                }
            })
            .await?;

        Ok(config)
    }

    async fn set_active(
        &self,
        symbol: &Symbol,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<MonitoringConfig> {
        let symbol = symbol.to_string();
        let updated_at = format_instant(&now);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MonitoringConfig> {
                let row = diesel::update(
                    monitoring_dsl::stock_monitoring.filter(monitoring_dsl::symbol.eq(&symbol)),
                )
                .set((
                    monitoring_dsl::is_active.eq(is_active),
                    monitoring_dsl::updated_at.eq(updated_at),
                ))
                .returning(StockMonitoringDB::as_returning())
                .get_result(conn)
                .optional()
                .into_core()?;

                row.map(to_domain)
                    .transpose()?
                    .ok_or(Error::MonitoringNotFound(symbol))
            })
            .await
    }

    async fn set_last_fetch(
        &self,
        symbol: &Symbol,
        instant: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<MonitoringConfig> {
        let symbol = symbol.to_string();
        let last_fetch = format_instant(&instant);
        let updated_at = format_instant(&now);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MonitoringConfig> {
                let row = diesel::update(
                    monitoring_dsl::stock_monitoring.filter(monitoring_dsl::symbol.eq(&symbol)),
                )
                .set((
                    monitoring_dsl::last_fetch.eq(Some(last_fetch)),
                    monitoring_dsl::updated_at.eq(updated_at),
                ))
                .returning(StockMonitoringDB::as_returning())
                .get_result(conn)
                .optional()
                .into_core()?;

                row.map(to_domain)
                    .transpose()?
                    .ok_or(Error::MonitoringNotFound(symbol))
            })
            .await
    }
}
