//! The criterion capability abstraction.
//!
//! A [`Criterion`] is an independent, stateless, deterministic trading
//! condition over market data. Implementations are fail-closed: `evaluate`
//! never panics or propagates an error in normal operation; any failure
//! class (missing data, invalid records, arithmetic guards, backend errors)
//! yields `passed = false` with a descriptive reason and best-effort metrics.
//! The underlying cause is reported on stderr, separate from the result
//! returned to callers.

use crate::domain::context::EvaluationContext;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

/// A scalar diagnostic value attached to a [`CriterionResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Float(v) => write!(f, "{v:.4}"),
            MetricValue::Int(v) => write!(f, "{v}"),
            MetricValue::Bool(v) => write!(f, "{v}"),
            MetricValue::Date(v) => write!(f, "{v}"),
            MetricValue::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<usize> for MetricValue {
    fn from(v: usize) -> Self {
        MetricValue::Int(v as i64)
    }
}

impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        MetricValue::Bool(v)
    }
}

impl From<NaiveDate> for MetricValue {
    fn from(v: NaiveDate) -> Self {
        MetricValue::Date(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

/// Verdict, audit reason and diagnostic metrics for one criterion run.
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionResult {
    pub passed: bool,
    pub reason: String,
    pub metrics: HashMap<String, MetricValue>,
}

impl CriterionResult {
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            passed: true,
            reason: reason.into(),
            metrics: HashMap::new(),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: reason.into(),
            metrics: HashMap::new(),
        }
    }

    pub fn with_metric(mut self, key: &str, value: impl Into<MetricValue>) -> Self {
        self.metrics.insert(key.to_string(), value.into());
        self
    }
}

pub trait Criterion {
    /// Stable name used as the key in the runner's result mapping.
    fn name(&self) -> &'static str;

    /// Evaluate the condition against one immutable context. Fail-closed.
    fn evaluate(&self, ctx: &EvaluationContext) -> CriterionResult;
}
