//! Port traits consumed by the domain, implemented by adapters.

pub mod config_port;
pub mod market_data_port;
