//! Objective evaluation and greedy layout search over a scene graph.

pub mod config;
mod evaluator;
mod optimizer;
mod seed;

pub use config::OptimizerConfig;
pub use evaluator::{ObjectiveEvaluator, RelationScore};
pub use optimizer::{
    AcceptedMove, CancelToken, LayoutOptimizer, OptimizationResult, optimize_layout,
};
pub use seed::{SEED_EXTENT, seed_layouts};

/// Failures that make a layout impossible to score. Skill failures are not
/// among them: a relation whose skill errors contributes 0 instead.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("relation {relation} names asset `{asset}` which has no layout")]
    MissingAsset { relation: usize, asset: String },
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("invalid optimizer configuration: {0}")]
    Config(String),
    #[error("initial layout could not be evaluated: {0}")]
    Initial(#[source] EvalError),
    #[error("trial {iteration} could not be evaluated: {source}")]
    Trial {
        iteration: usize,
        #[source]
        source: EvalError,
    },
}
