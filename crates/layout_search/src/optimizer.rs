use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use layout_types::{LayoutAssignment, SceneGraph};
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use skill_registry::SkillRegistry;

use crate::SearchError;
use crate::config::OptimizerConfig;
use crate::evaluator::ObjectiveEvaluator;

/// Cooperative stop signal shared between a running search and its owner.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AcceptedMove {
    pub iteration: usize,
    pub asset: String,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OptimizationResult {
    pub layouts: LayoutAssignment,
    pub score: f64,
    pub initial_score: f64,
    pub iterations_run: usize,
    pub accepted: Vec<AcceptedMove>,
    /// Best score after each completed iteration.
    pub score_history: Vec<f64>,
    /// The run stopped early, by cancellation or by its time budget.
    pub cancelled: bool,
}

/// Greedy hill climbing over layout assignments: each trial nudges one asset
/// and is kept only if the objective strictly improves.
#[derive(Debug)]
pub struct LayoutOptimizer<'a> {
    evaluator: ObjectiveEvaluator<'a>,
    config: OptimizerConfig,
    cancel: CancelToken,
}

impl<'a> LayoutOptimizer<'a> {
    pub fn new(registry: &'a SkillRegistry, config: OptimizerConfig) -> Self {
        Self {
            evaluator: ObjectiveEvaluator::new(registry),
            config,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn optimize(
        &self,
        graph: &SceneGraph,
        initial: &LayoutAssignment,
    ) -> Result<OptimizationResult, SearchError> {
        self.run(graph, initial, rng_for(self.config.seed))
    }

    /// Optimizes independent scenes in parallel. Job `i` uses seed
    /// `seed + i` when a seed is configured.
    pub fn optimize_batch(
        &self,
        jobs: &[(SceneGraph, LayoutAssignment)],
    ) -> Vec<Result<OptimizationResult, SearchError>> {
        jobs.par_iter()
            .enumerate()
            .map(|(index, (graph, initial))| {
                let seed = self.config.seed.map(|s| s.wrapping_add(index as u64));
                self.run(graph, initial, rng_for(seed))
            })
            .collect()
    }

    fn run(
        &self,
        graph: &SceneGraph,
        initial: &LayoutAssignment,
        mut rng: ChaCha8Rng,
    ) -> Result<OptimizationResult, SearchError> {
        self.config.validate()?;
        debug!(
            "optimizing {} assets against {} relations for up to {} iterations",
            initial.len(),
            graph.len(),
            self.config.max_iterations
        );

        // degraded relations warn once per run, not once per trial
        let mut reported = BTreeSet::new();
        let mut best = initial.clone();
        let initial_score = self
            .evaluator
            .evaluate_reporting(graph, &best, &mut reported)
            .map_err(SearchError::Initial)?;
        let mut best_score = initial_score;

        let mut result = OptimizationResult {
            layouts: LayoutAssignment::new(),
            score: best_score,
            initial_score,
            iterations_run: 0,
            accepted: Vec::new(),
            score_history: Vec::with_capacity(self.config.max_iterations),
            cancelled: false,
        };
        if best.is_empty() {
            debug!("no assets to move; returning initial evaluation");
            result.layouts = best;
            return Ok(result);
        }

        let started = Instant::now();
        let location_step = self.config.location_step;
        let orientation_step = self.config.orientation_step;
        for iteration in 0..self.config.max_iterations {
            let out_of_time = self
                .config
                .time_budget
                .is_some_and(|budget| started.elapsed() >= budget);
            if self.cancel.is_cancelled() || out_of_time {
                result.cancelled = true;
                break;
            }

            let mut candidate = best.clone();
            let pick = rng.gen_range(0..candidate.len());
            let Some((asset, layout)) = candidate.iter_mut().nth(pick) else {
                break;
            };
            let asset = asset.clone();
            let axis = rng.gen_range(0..3);
            layout.location[axis] += rng.gen_range(-location_step..=location_step);
            let axis = rng.gen_range(0..3);
            layout.orientation[axis] = wrap_degrees(
                layout.orientation[axis] + rng.gen_range(-orientation_step..=orientation_step),
            );

            let score = self
                .evaluator
                .evaluate_reporting(graph, &candidate, &mut reported)
                .map_err(|source| SearchError::Trial { iteration, source })?;
            if score > best_score {
                debug!("iteration {iteration}: moved `{asset}`, {best_score} -> {score}");
                best = candidate;
                best_score = score;
                result.accepted.push(AcceptedMove {
                    iteration,
                    asset,
                    score,
                });
            }
            result.score_history.push(best_score);
            result.iterations_run += 1;
        }

        info!(
            "optimized {initial_score} -> {best_score} in {} iterations ({} accepted{})",
            result.iterations_run,
            result.accepted.len(),
            if result.cancelled { ", stopped early" } else { "" }
        );
        result.layouts = best;
        result.score = best_score;
        Ok(result)
    }
}

/// Wraps into [0, 360). `rem_euclid` can round tiny negative inputs up to
/// exactly 360.
fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

fn rng_for(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// One-shot hill climb with default steps: returns the best assignment found
/// and its score.
pub fn optimize_layout(
    registry: &SkillRegistry,
    graph: &SceneGraph,
    initial: &LayoutAssignment,
    max_iterations: usize,
) -> Result<(LayoutAssignment, f64), SearchError> {
    let config = OptimizerConfig::default().with_max_iterations(max_iterations);
    let result = LayoutOptimizer::new(registry, config).optimize(graph, initial)?;
    Ok((result.layouts, result.score))
}

#[cfg(test)]
mod tests {
    use super::{CancelToken, wrap_degrees};

    #[test]
    fn degrees_wrap_into_half_open_range() {
        assert_eq!(wrap_degrees(362.5), 2.5);
        assert_eq!(wrap_degrees(-3.0), 357.0);
        assert_eq!(wrap_degrees(-1e-17), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }
}
