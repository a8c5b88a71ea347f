pub mod bar;
pub mod context;
pub mod criteria;
pub mod criterion;
pub mod error;
pub mod runner;
pub mod watchlist;
