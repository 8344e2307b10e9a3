pub mod config;
pub mod error;
pub mod executor;

pub use config::{Config, HistoryConfig, RankOrder, RankingConfig};
pub use error::*;
pub use executor::*;
