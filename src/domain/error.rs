//! Domain error types.
//!
//! Criteria never let these escape to callers: every error class is absorbed
//! into a fail-closed [`CriterionResult`](crate::domain::criterion::CriterionResult)
//! at the criterion boundary. The variants exist so the underlying cause can
//! still be classified and reported on stderr before it is absorbed.

/// Top-level error type for tickgate.
#[derive(Debug, thiserror::Error)]
pub enum TickgateError {
    /// The accessor holds no rows at all for the requested slice.
    #[error("no {what} data for {code}")]
    DataMissing { code: String, what: String },

    /// Rows exist but fall short of the minimum window a criterion needs.
    #[error("insufficient data for {code}: have {bars} bars, need {minimum}")]
    DataInsufficient {
        code: String,
        bars: usize,
        minimum: usize,
    },

    /// A record violates a type or range rule (non-positive price, NaN, ...).
    #[error("invalid data: {reason}")]
    DataInvalid { reason: String },

    /// An arithmetic guard tripped, e.g. a non-positive denominator.
    #[error("computation abnormal: {reason}")]
    ComputationAbnormal { reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TickgateError> for std::process::ExitCode {
    fn from(err: &TickgateError) -> Self {
        let code: u8 = match err {
            TickgateError::Io(_) => 1,
            TickgateError::ConfigParse { .. }
            | TickgateError::ConfigMissing { .. }
            | TickgateError::ConfigInvalid { .. } => 2,
            TickgateError::Database { .. } | TickgateError::DatabaseQuery { .. } => 3,
            TickgateError::DataInvalid { .. } | TickgateError::ComputationAbnormal { .. } => 4,
            TickgateError::DataMissing { .. } | TickgateError::DataInsufficient { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
