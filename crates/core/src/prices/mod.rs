//! Prices module - tick time series, price store port and moving averages.

mod moving_average;
mod prices_model;
mod prices_service;
mod prices_traits;

pub use moving_average::{fixed_point_average, MovingAverage, MovingAverageEngine};
pub use prices_model::{to_fixed, Price, Tick};
pub use prices_service::PriceService;
pub use prices_traits::{PriceServiceTrait, PriceStore};
