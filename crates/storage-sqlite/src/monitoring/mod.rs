pub mod model;
mod repository;

pub use repository::MonitoringRepository;
