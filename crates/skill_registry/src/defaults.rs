use layout_types::RelationKind;
use spatial_skills::{NativeSkill, Skill, builtin};

use crate::RegistryError;

const PROXIMITY: &str = include_str!("../skills/proximity.skill");
const ALIGNMENT: &str = include_str!("../skills/alignment.skill");
const PARALLELISM: &str = include_str!("../skills/parallelism.skill");
const PERPENDICULARITY: &str = include_str!("../skills/perpendicularity.skill");
const SYMMETRY: &str = include_str!("../skills/symmetry.skill");

pub fn default_source(kind: &RelationKind) -> Option<&'static str> {
    match kind {
        RelationKind::Proximity => Some(PROXIMITY),
        RelationKind::Alignment => Some(ALIGNMENT),
        RelationKind::Parallelism => Some(PARALLELISM),
        RelationKind::Perpendicularity => Some(PERPENDICULARITY),
        RelationKind::Symmetry => Some(SYMMETRY),
        RelationKind::Custom(_) => None,
    }
}

/// The built-in scorers, each paired with its script source. A script that
/// does not compile, or whose header disagrees with the native call
/// convention, is refused.
pub fn default_skills() -> Result<Vec<NativeSkill>, RegistryError> {
    RelationKind::BUILTIN
        .iter()
        .map(|kind| {
            let name = kind.name();
            let invalid = |reason: String| RegistryError::DefaultInvalid {
                name: name.to_string(),
                reason,
            };
            let (Some(signature), Some(scorer), Some(source)) = (
                builtin::signature(kind),
                builtin::scorer(kind),
                default_source(kind),
            ) else {
                return Err(invalid("no native scorer".to_string()));
            };

            let script = skill_script::compile(source).map_err(|e| invalid(e.to_string()))?;
            if script.name() != name {
                return Err(invalid(format!("script declares `{}`", script.name())));
            }
            if script.signature() != &signature {
                return Err(invalid("script header disagrees with native signature".to_string()));
            }
            Ok(NativeSkill::new(name, signature, source, scorer))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use spatial_skills::Skill;

    use super::default_skills;

    #[test]
    fn every_builtin_has_a_valid_default() {
        let skills = default_skills().expect("defaults");
        let names = skills.iter().map(|s| s.name()).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "proximity",
                "alignment",
                "parallelism",
                "perpendicularity",
                "symmetry"
            ]
        );
        assert!(
            skills
                .iter()
                .all(|s| s.source().starts_with("//") || s.source().starts_with("skill"))
        );
    }
}
