use std::collections::BTreeSet;

use layout_types::{Layout, LayoutAssignment, Relation, SceneGraph};
use log::{debug, warn};
use rayon::prelude::*;
use skill_registry::{SkillRegistry, SkillTable};
use spatial_skills::SkillError;

use crate::EvalError;

/// Contribution of one relation to the objective.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationScore {
    pub index: usize,
    pub skill: String,
    pub score: f64,
    /// No skill is registered under the relation's type; it scored 0.
    pub missing_skill: bool,
    /// The skill rejected the relation or failed while scoring; it scored 0.
    pub failure: Option<SkillError>,
}

impl RelationScore {
    /// Scored 0 because of a missing skill or a skill failure.
    pub fn is_degraded(&self) -> bool {
        self.missing_skill || self.failure.is_some()
    }
}

/// Sums relation scores for a layout assignment. Each call works against a
/// single registry snapshot, so a concurrent replace never splits one
/// evaluation across two implementations.
///
/// A relation whose skill is missing or fails contributes 0 and is logged;
/// only a missing asset fails the call.
#[derive(Clone, Copy, Debug)]
pub struct ObjectiveEvaluator<'a> {
    registry: &'a SkillRegistry,
}

impl<'a> ObjectiveEvaluator<'a> {
    pub fn new(registry: &'a SkillRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a SkillRegistry {
        self.registry
    }

    pub fn evaluate(
        &self,
        graph: &SceneGraph,
        assignment: &LayoutAssignment,
    ) -> Result<f64, EvalError> {
        let scores = self.breakdown(graph, assignment)?;
        scores.iter().filter(|s| s.is_degraded()).for_each(log_degraded);
        Ok(total(&scores))
    }

    /// Scores relations on the rayon pool. The sum runs in declared order
    /// over the collected scores, so it matches `evaluate` exactly.
    pub fn evaluate_parallel(
        &self,
        graph: &SceneGraph,
        assignment: &LayoutAssignment,
    ) -> Result<f64, EvalError> {
        let table = self.registry.snapshot();
        let scores = graph
            .relations
            .par_iter()
            .enumerate()
            .map(|(index, relation)| score_relation(&table, index, relation, assignment))
            .collect::<Result<Vec<_>, _>>()?;
        scores.iter().filter(|s| s.is_degraded()).for_each(log_degraded);
        Ok(total(&scores))
    }

    /// Per-relation contributions, in declared order. Nothing is logged.
    pub fn breakdown(
        &self,
        graph: &SceneGraph,
        assignment: &LayoutAssignment,
    ) -> Result<Vec<RelationScore>, EvalError> {
        let table = self.registry.snapshot();
        graph
            .relations
            .iter()
            .enumerate()
            .map(|(index, relation)| score_relation(&table, index, relation, assignment))
            .collect()
    }

    /// Like `evaluate`, but each degraded relation is logged at warn level
    /// only the first time it shows up in `reported`; repeats go to debug.
    pub(crate) fn evaluate_reporting(
        &self,
        graph: &SceneGraph,
        assignment: &LayoutAssignment,
        reported: &mut BTreeSet<usize>,
    ) -> Result<f64, EvalError> {
        let scores = self.breakdown(graph, assignment)?;
        for score in scores.iter().filter(|s| s.is_degraded()) {
            if reported.insert(score.index) {
                log_degraded(score);
            } else {
                debug!("relation {} still scores 0 (`{}`)", score.index, score.skill);
            }
        }
        Ok(total(&scores))
    }
}

fn total(scores: &[RelationScore]) -> f64 {
    scores.iter().map(|s| s.score).sum()
}

fn log_degraded(score: &RelationScore) {
    match &score.failure {
        Some(e) => warn!(
            "relation {}: skill `{}` failed, scoring 0: {e}",
            score.index, score.skill
        ),
        None => warn!(
            "relation {}: no skill registered for `{}`; scoring 0",
            score.index, score.skill
        ),
    }
}

fn score_relation(
    table: &SkillTable,
    index: usize,
    relation: &Relation,
    assignment: &LayoutAssignment,
) -> Result<RelationScore, EvalError> {
    let name = relation.skill_name();
    let mut scored = RelationScore {
        index,
        skill: name.to_string(),
        score: 0.0,
        missing_skill: false,
        failure: None,
    };
    let Some(skill) = table.lookup(name) else {
        scored.missing_skill = true;
        return Ok(scored);
    };

    let layouts = relation
        .involved_assets
        .iter()
        .map(|asset| {
            assignment
                .get(asset)
                .ok_or_else(|| EvalError::MissingAsset {
                    relation: index,
                    asset: asset.clone(),
                })
        })
        .collect::<Result<Vec<&Layout>, _>>()?;

    match skill.invoke(&layouts, &relation.args) {
        Ok(score) => scored.score = score,
        Err(e) => scored.failure = Some(e),
    }
    Ok(scored)
}
