use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};

use layout_types::{ArgValue, Layout, RelationArgs};
use log::warn;

use crate::SkillError;

/// How many layouts a skill consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Variadic,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exact(n) => n == count,
            Self::Variadic => true,
        }
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "exactly {n}"),
            Self::Variadic => f.write_str("any number of"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    Number,
    Text,
}

impl ParamType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Text => "string",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamType,
    pub default: Option<ArgValue>,
}

impl ParamSpec {
    pub fn number(name: &str, default: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamType::Number,
            default: default.map(ArgValue::Number),
        }
    }

    pub fn text(name: &str, default: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamType::Text,
            default: default.map(ArgValue::from),
        }
    }
}

/// Call convention of one relation type: explicit arity plus typed,
/// optionally defaulted keyword parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SkillSignature {
    pub arity: Arity,
    pub params: Vec<ParamSpec>,
}

impl SkillSignature {
    pub fn new(arity: Arity, params: Vec<ParamSpec>) -> Self {
        Self { arity, params }
    }

    pub fn check_arity(&self, count: usize) -> Result<(), SkillError> {
        if self.arity.accepts(count) {
            Ok(())
        } else {
            Err(SkillError::Arity {
                expected: self.arity,
                found: count,
            })
        }
    }

    /// Resolve relation arguments against the declared parameters. Defaults
    /// fill gaps, numeric strings are accepted for number parameters, and
    /// undeclared keys are dropped with a warning.
    pub fn bind(&self, args: &RelationArgs) -> Result<BoundArgs, SkillError> {
        let mut bound = BTreeMap::new();
        for spec in &self.params {
            let value = match args.get(&spec.name).or(spec.default.as_ref()) {
                Some(v) => v,
                None => return Err(SkillError::MissingArgument(spec.name.clone())),
            };
            bound.insert(spec.name.clone(), coerce(spec, value)?);
        }
        for key in args.keys() {
            if !self.params.iter().any(|p| &p.name == key) {
                warn!("ignoring argument `{key}` not declared by the skill signature");
            }
        }
        Ok(BoundArgs { values: bound })
    }
}

fn coerce(spec: &ParamSpec, value: &ArgValue) -> Result<ArgValue, SkillError> {
    match (spec.kind, value) {
        (ParamType::Number, ArgValue::Number(_)) | (ParamType::Text, ArgValue::Text(_)) => {
            Ok(value.clone())
        }
        (ParamType::Number, ArgValue::Text(raw)) => raw
            .trim()
            .parse::<f64>()
            .map(ArgValue::Number)
            .map_err(|_| SkillError::ArgumentType {
                name: spec.name.clone(),
                expected: spec.kind.name(),
                found: value.to_string(),
            }),
        (ParamType::Text, ArgValue::Number(_)) => Err(SkillError::ArgumentType {
            name: spec.name.clone(),
            expected: spec.kind.name(),
            found: value.to_string(),
        }),
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundArgs {
    values: BTreeMap<String, ArgValue>,
}

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn number(&self, name: &str) -> Result<f64, SkillError> {
        match self.values.get(name) {
            Some(ArgValue::Number(v)) => Ok(*v),
            Some(other) => Err(SkillError::ArgumentType {
                name: name.to_string(),
                expected: "number",
                found: other.to_string(),
            }),
            None => Err(SkillError::MissingArgument(name.to_string())),
        }
    }

    pub fn text(&self, name: &str) -> Result<&str, SkillError> {
        match self.values.get(name) {
            Some(ArgValue::Text(s)) => Ok(s),
            Some(other) => Err(SkillError::ArgumentType {
                name: name.to_string(),
                expected: "string",
                found: other.to_string(),
            }),
            None => Err(SkillError::MissingArgument(name.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ArgValue)> {
        self.values.iter()
    }
}

/// Capability contract every relation scorer satisfies, whether it is
/// compiled into the binary or loaded from skill-script source.
pub trait Skill: Send + Sync + Debug {
    fn name(&self) -> &str;

    fn signature(&self) -> &SkillSignature;

    /// Source text that reproduces this skill when compiled again.
    fn source(&self) -> &str;

    fn score(&self, layouts: &[&Layout], args: &BoundArgs) -> Result<f64, SkillError>;

    fn invoke(&self, layouts: &[&Layout], args: &RelationArgs) -> Result<f64, SkillError> {
        let signature = self.signature();
        signature.check_arity(layouts.len())?;
        let bound = signature.bind(args)?;
        self.score(layouts, &bound)
    }
}

pub type NativeScorer = fn(&[&Layout], &BoundArgs) -> Result<f64, SkillError>;

/// Skill backed by a Rust function, carrying the script source that
/// describes the same computation.
#[derive(Clone)]
pub struct NativeSkill {
    name: String,
    signature: SkillSignature,
    source: String,
    scorer: NativeScorer,
}

impl NativeSkill {
    pub fn new(
        name: &str,
        signature: SkillSignature,
        source: impl Into<String>,
        scorer: NativeScorer,
    ) -> Self {
        Self {
            name: name.to_string(),
            signature,
            source: source.into(),
            scorer,
        }
    }
}

impl Debug for NativeSkill {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeSkill")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl Skill for NativeSkill {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &SkillSignature {
        &self.signature
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn score(&self, layouts: &[&Layout], args: &BoundArgs) -> Result<f64, SkillError> {
        (self.scorer)(layouts, args)
    }
}
