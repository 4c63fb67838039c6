use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{LayoutAssignment, LayoutError};

/// Relation type as emitted by the planner. Known kinds get their own
/// variant; anything else is carried by name so that skills installed at
/// runtime can still be addressed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationKind {
    Proximity,
    Alignment,
    Parallelism,
    Perpendicularity,
    Symmetry,
    Custom(String),
}

impl RelationKind {
    pub const BUILTIN: [RelationKind; 5] = [
        RelationKind::Proximity,
        RelationKind::Alignment,
        RelationKind::Parallelism,
        RelationKind::Perpendicularity,
        RelationKind::Symmetry,
    ];

    /// Case-insensitive; planners write `"Proximity"`, registry keys are
    /// lowercase.
    pub fn parse(raw: &str) -> Self {
        let name = raw.trim().to_ascii_lowercase();
        match name.as_str() {
            "proximity" => Self::Proximity,
            "alignment" => Self::Alignment,
            "parallelism" => Self::Parallelism,
            "perpendicularity" => Self::Perpendicularity,
            "symmetry" => Self::Symmetry,
            _ => Self::Custom(name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Proximity => "proximity",
            Self::Alignment => "alignment",
            Self::Parallelism => "parallelism",
            Self::Perpendicularity => "perpendicularity",
            Self::Symmetry => "symmetry",
            Self::Custom(name) => name,
        }
    }
}

impl From<String> for RelationKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<RelationKind> for String {
    fn from(value: RelationKind) -> Self {
        value.name().to_string()
    }
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Number(f64),
    Text(String),
}

impl ArgValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "string",
        }
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl Display for ArgValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

pub type RelationArgs = BTreeMap<String, ArgValue>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub involved_assets: Vec<String>,
    #[serde(default)]
    pub args: RelationArgs,
}

impl Relation {
    pub fn new<I, S>(kind: RelationKind, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            involved_assets: assets.into_iter().map(Into::into).collect(),
            args: RelationArgs::new(),
        }
    }

    pub fn with_arg(mut self, key: &str, value: impl Into<ArgValue>) -> Self {
        self.args.insert(key.to_string(), value.into());
        self
    }

    pub fn skill_name(&self) -> &str {
        self.kind.name()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl SceneGraph {
    pub fn new(relations: Vec<Relation>) -> Self {
        Self { relations }
    }

    pub fn push(&mut self, relation: Relation) {
        self.relations.push(relation);
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Merge corrected arguments into one relation. Keys present in
    /// `correction` overwrite, other keys are kept.
    pub fn update_args(
        &mut self,
        index: usize,
        correction: RelationArgs,
    ) -> Result<(), LayoutError> {
        let len = self.relations.len();
        let relation = self
            .relations
            .get_mut(index)
            .ok_or(LayoutError::RelationIndex { index, len })?;
        relation.args.extend(correction);
        Ok(())
    }

    pub fn asset_names(&self) -> BTreeSet<&str> {
        self.relations
            .iter()
            .flat_map(|r| r.involved_assets.iter().map(String::as_str))
            .collect()
    }

    pub fn first_missing_asset<'a>(&'a self, assignment: &LayoutAssignment) -> Option<&'a str> {
        self.relations
            .iter()
            .flat_map(|r| r.involved_assets.iter())
            .find(|name| !assignment.contains_key(name.as_str()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use crate::LayoutError;

    use super::{ArgValue, Relation, RelationArgs, RelationKind, SceneGraph};

    #[test]
    fn relation_kind_is_case_insensitive() {
        assert_eq!(RelationKind::parse("Proximity"), RelationKind::Proximity);
        assert_eq!(RelationKind::parse(" ALIGNMENT"), RelationKind::Alignment);
        assert_eq!(
            RelationKind::parse("Facing"),
            RelationKind::Custom("facing".to_string())
        );
        assert_eq!(RelationKind::parse("Facing").name(), "facing");
    }

    #[test]
    fn update_args_merges_in_place() {
        let mut graph = SceneGraph::new(vec![
            Relation::new(RelationKind::Proximity, ["a", "b"])
                .with_arg("min_dist", 1.0)
                .with_arg("max_dist", 5.0),
        ]);
        let mut correction = RelationArgs::new();
        correction.insert("max_dist".to_string(), ArgValue::Number(3.0));
        graph.update_args(0, correction).expect("update");

        let args = &graph.relations[0].args;
        assert_eq!(args.get("min_dist"), Some(&ArgValue::Number(1.0)));
        assert_eq!(args.get("max_dist"), Some(&ArgValue::Number(3.0)));
    }

    #[test]
    fn update_args_rejects_bad_index() {
        let mut graph = SceneGraph::default();
        let err = graph.update_args(2, RelationArgs::new()).expect_err("no relation");
        assert_eq!(err, LayoutError::RelationIndex { index: 2, len: 0 });
    }
}
