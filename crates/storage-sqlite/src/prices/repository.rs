use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::StockPriceDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::stock_prices::dsl as stock_prices_dsl;
use tickwatch_core::prices::{PriceStore, Tick};
use tickwatch_core::{Error, Result};
use tickwatch_market_data::Symbol;

pub struct PriceRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PriceRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PriceStore for PriceRepository {
    async fn append(&self, tick: Tick) -> Result<Tick> {
        let row = StockPriceDB::from_tick(&tick, Utc::now());

        let inserted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::insert_or_ignore_into(stock_prices_dsl::stock_prices)
                    .values(&row)
                    .execute(conn)
                    .into_core()
            })
            .await?;

        if inserted == 0 {
            return Err(Error::DuplicateEntry {
                symbol: tick.symbol.to_string(),
                instant: tick.instant,
            });
        }

        Ok(tick)
    }

    fn latest(&self, symbol: &Symbol) -> Result<Option<Tick>> {
        let mut conn = get_connection(&self.pool)?;

        let row = stock_prices_dsl::stock_prices
            .filter(stock_prices_dsl::symbol.eq(symbol.as_str()))
            .order(stock_prices_dsl::timestamp.desc())
            .select(StockPriceDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?;

        row.map(Tick::try_from).transpose().map_err(Error::from)
    }

    fn recent(&self, symbol: &Symbol, limit: usize) -> Result<Vec<Tick>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = get_connection(&self.pool)?;

        let rows = stock_prices_dsl::stock_prices
            .filter(stock_prices_dsl::symbol.eq(symbol.as_str()))
            .order(stock_prices_dsl::timestamp.desc())
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .select(StockPriceDB::as_select())
            .load(&mut conn)
            .into_core()?;

        rows.into_iter()
            .map(|row| Tick::try_from(row).map_err(Error::from))
            .collect()
    }
}
