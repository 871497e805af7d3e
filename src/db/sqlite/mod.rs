mod common;
mod statistics;

pub use statistics::SqliteStatisticsRepo;
