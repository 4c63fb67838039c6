pub mod builtin;
pub mod geometry;
pub mod scorers;
pub mod skill;

pub use scorers::{alignment, parallelism, perpendicularity, proximity, symmetry};
pub use skill::{
    Arity, BoundArgs, NativeScorer, NativeSkill, ParamSpec, ParamType, Skill, SkillSignature,
};

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SkillError {
    #[error("missing required argument `{0}`")]
    MissingArgument(String),
    #[error("argument `{name}` expects a {expected}, got {found}")]
    ArgumentType {
        name: String,
        expected: &'static str,
        found: String,
    },
    #[error("skill takes {expected} assets, got {found}")]
    Arity { expected: Arity, found: usize },
    #[error("skill failed at runtime: {0}")]
    Runtime(String),
}
