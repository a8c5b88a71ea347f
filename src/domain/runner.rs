//! Criteria runner: executes a named, ordered set of criteria against one
//! evaluation context.
//!
//! Each criterion runs at most once and in isolation: a panic inside one
//! criterion is caught and converted into a fail-closed result so the
//! remaining criteria still run. Composing the per-criterion verdicts into a
//! buy/no-buy decision belongs to an external strategy layer; the ordering of
//! the returned mapping carries no meaning.

use crate::domain::context::EvaluationContext;
use crate::domain::criteria::{PrevDayVolumeRatioCriterion, VolumeHealthCriterion};
use crate::domain::criterion::{Criterion, CriterionResult};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

pub struct CriteriaRunner {
    criteria: Vec<Box<dyn Criterion>>,
}

impl CriteriaRunner {
    pub fn new(criteria: Vec<Box<dyn Criterion>>) -> Self {
        Self { criteria }
    }

    /// The built-in criteria set, registered explicitly.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(PrevDayVolumeRatioCriterion),
            Box::new(VolumeHealthCriterion),
        ])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.criteria.iter().map(|c| c.name()).collect()
    }

    pub fn run(&self, ctx: &EvaluationContext) -> HashMap<String, CriterionResult> {
        let mut results = HashMap::with_capacity(self.criteria.len());
        for criterion in &self.criteria {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| criterion.evaluate(ctx)));
            let result = match outcome {
                Ok(result) => result,
                Err(_) => {
                    eprintln!(
                        "warning: criterion {} panicked evaluating {} ({})",
                        criterion.name(),
                        ctx.code,
                        ctx.name
                    );
                    CriterionResult::fail("criterion panicked")
                }
            };
            results.insert(criterion.name().to_string(), result);
        }
        results
    }
}
