//! Named relation skills, swappable while the process runs.
//!
//! The registry starts from the built-in scorers, overlays whatever the
//! durable store holds, and accepts replacements as skill-script source.

mod defaults;
mod registry;
mod store;

pub use defaults::{default_skills, default_source};
pub use registry::{
    LoadReport, ReplaceReport, SkillEntry, SkillInfo, SkillOrigin, SkillRegistry, SkillTable,
    source_digest,
};
pub use store::{
    DEFAULT_STORE_PATH, InMemorySkillStore, JsonFileSkillStore, STORE_PATH_ENV, SkillStore,
    SourceMap, StoreError,
};

use skill_script::ScriptError;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("`{0}` is not a valid skill name (expected lowercase letters, digits and `_`)")]
    InvalidName(String),
    #[error("source declares skill `{found}` but was submitted as `{expected}`")]
    NameMismatch { expected: String, found: String },
    #[error("skill `{name}` failed to compile: {source}")]
    Compile {
        name: String,
        #[source]
        source: ScriptError,
    },
    #[error("built-in skill `{name}` is invalid: {reason}")]
    DefaultInvalid { name: String, reason: String },
}
