//! Evaluation context: the immutable bundle a criterion runs against.

use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDateTime;

/// Stock identity, evaluation instant and accessor handle, built once per
/// evaluation call and never mutated. The instant is carried explicitly and
/// criteria never read a live clock, so the same context always produces
/// the same results against the same backing data.
pub struct EvaluationContext<'a> {
    pub code: String,
    pub name: String,
    pub now: NaiveDateTime,
    pub data: &'a dyn MarketDataPort,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        now: NaiveDateTime,
        data: &'a dyn MarketDataPort,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            now,
            data,
        }
    }
}
