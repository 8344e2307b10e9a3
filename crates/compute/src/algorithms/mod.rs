pub mod congestion;
pub mod etp;
pub mod ranking;
pub mod rates;
