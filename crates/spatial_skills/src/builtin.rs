//! Call adapters binding the native scorers to the `Skill` convention.

use layout_types::{Layout, RelationKind};

use crate::SkillError;
use crate::scorers::{self, DEFAULT_MAX_DIST, DEFAULT_MIN_DIST};
use crate::skill::{Arity, BoundArgs, NativeScorer, ParamSpec, SkillSignature};

pub fn signature(kind: &RelationKind) -> Option<SkillSignature> {
    let signature = match kind {
        RelationKind::Proximity => SkillSignature::new(
            Arity::Exact(2),
            vec![
                ParamSpec::number("min_dist", Some(DEFAULT_MIN_DIST)),
                ParamSpec::number("max_dist", Some(DEFAULT_MAX_DIST)),
            ],
        ),
        RelationKind::Alignment | RelationKind::Symmetry => {
            SkillSignature::new(Arity::Variadic, vec![ParamSpec::text("axis", None)])
        }
        RelationKind::Parallelism => SkillSignature::new(Arity::Variadic, Vec::new()),
        RelationKind::Perpendicularity => SkillSignature::new(Arity::Exact(2), Vec::new()),
        RelationKind::Custom(_) => return None,
    };
    Some(signature)
}

pub fn scorer(kind: &RelationKind) -> Option<NativeScorer> {
    let scorer: NativeScorer = match kind {
        RelationKind::Proximity => proximity,
        RelationKind::Alignment => alignment,
        RelationKind::Parallelism => parallelism,
        RelationKind::Perpendicularity => perpendicularity,
        RelationKind::Symmetry => symmetry,
        RelationKind::Custom(_) => return None,
    };
    Some(scorer)
}

fn pair<'a>(layouts: &[&'a Layout]) -> Result<(&'a Layout, &'a Layout), SkillError> {
    match layouts {
        [a, b] => Ok((*a, *b)),
        _ => Err(SkillError::Arity {
            expected: Arity::Exact(2),
            found: layouts.len(),
        }),
    }
}

fn proximity(layouts: &[&Layout], args: &BoundArgs) -> Result<f64, SkillError> {
    let (a, b) = pair(layouts)?;
    Ok(scorers::proximity(
        a,
        b,
        args.number("min_dist")?,
        args.number("max_dist")?,
    ))
}

fn alignment(layouts: &[&Layout], args: &BoundArgs) -> Result<f64, SkillError> {
    Ok(scorers::alignment(layouts, args.text("axis")?))
}

fn parallelism(layouts: &[&Layout], _args: &BoundArgs) -> Result<f64, SkillError> {
    Ok(scorers::parallelism(layouts))
}

fn perpendicularity(layouts: &[&Layout], _args: &BoundArgs) -> Result<f64, SkillError> {
    let (a, b) = pair(layouts)?;
    Ok(scorers::perpendicularity(a, b))
}

fn symmetry(layouts: &[&Layout], args: &BoundArgs) -> Result<f64, SkillError> {
    Ok(scorers::symmetry(layouts, args.text("axis")?))
}
