//! Functions callable from skill scripts. Every builtin is pure; the set is
//! closed, so a script can reach nothing beyond layouts and vector math.

use glam::DVec3;
use layout_types::{Axis, Layout};
use spatial_skills::SkillError;
use spatial_skills::geometry::{
    consecutive_dots, consecutive_steps, forward_vector, mean_or, mirror_residuals, normalize,
    population_variance, remap_unit,
};

use crate::value::{Value, numbers, vectors};

const BUILTINS: &[(&str, usize)] = &[
    ("count", 1),
    ("distance", 2),
    ("dot", 2),
    ("norm", 1),
    ("normalize", 1),
    ("forward", 1),
    ("vec3", 3),
    ("abs", 1),
    ("sqrt", 1),
    ("min", 2),
    ("max", 2),
    ("clamp", 3),
    ("locations", 1),
    ("orientations", 1),
    ("scales", 1),
    ("forwards", 1),
    ("component", 2),
    ("is_axis", 1),
    ("variance", 1),
    ("mean_or", 2),
    ("steps", 1),
    ("normalize_each", 1),
    ("chain_dots", 1),
    ("remap01", 1),
    ("mirror_residuals", 2),
];

/// Declared argument count of a builtin, or `None` when no such builtin exists.
pub fn arity(name: &str) -> Option<usize> {
    BUILTINS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, n)| *n)
}

fn axis(value: &Value) -> Result<Axis, SkillError> {
    let raw = value.as_text()?;
    Axis::parse(raw).ok_or_else(|| SkillError::Runtime(format!("invalid axis `{raw}`")))
}

fn per_layout(value: &Value, f: impl Fn(&Layout) -> DVec3) -> Result<Value, SkillError> {
    Ok(vectors(value.layouts()?.into_iter().map(f)))
}

pub fn call(name: &str, args: &[Value]) -> Result<Value, SkillError> {
    let expected =
        arity(name).ok_or_else(|| SkillError::Runtime(format!("unknown builtin `{name}`")))?;
    if args.len() != expected {
        return Err(SkillError::Runtime(format!(
            "`{name}` takes {expected} arguments, got {}",
            args.len()
        )));
    }

    let value = match name {
        "count" => Value::Number(args[0].as_list()?.len() as f64),
        "distance" => Value::Number(args[0].as_vec3()?.distance(args[1].as_vec3()?)),
        "dot" => Value::Number(args[0].as_vec3()?.dot(args[1].as_vec3()?)),
        "norm" => Value::Number(args[0].as_vec3()?.length()),
        "normalize" => Value::Vec3(normalize(args[0].as_vec3()?)),
        "forward" => Value::Vec3(forward_vector(args[0].as_vec3()?)),
        "vec3" => Value::Vec3(DVec3::new(
            args[0].as_number()?,
            args[1].as_number()?,
            args[2].as_number()?,
        )),
        "abs" => Value::Number(args[0].as_number()?.abs()),
        "sqrt" => Value::Number(args[0].as_number()?.sqrt()),
        "min" => Value::Number(args[0].as_number()?.min(args[1].as_number()?)),
        "max" => Value::Number(args[0].as_number()?.max(args[1].as_number()?)),
        "clamp" => {
            let (v, lo, hi) = (
                args[0].as_number()?,
                args[1].as_number()?,
                args[2].as_number()?,
            );
            if lo > hi {
                return Err(SkillError::Runtime(format!(
                    "clamp bounds are inverted ({lo} > {hi})"
                )));
            }
            Value::Number(v.clamp(lo, hi))
        }
        "locations" => per_layout(&args[0], |l| l.location)?,
        "orientations" => per_layout(&args[0], |l| l.orientation)?,
        "scales" => per_layout(&args[0], |l| l.scale)?,
        "forwards" => per_layout(&args[0], |l| forward_vector(l.orientation))?,
        "component" => {
            let axis = axis(&args[1])?;
            numbers(args[0].vectors()?.into_iter().map(|v| axis.component(v)))
        }
        "is_axis" => Value::Bool(Axis::parse(args[0].as_text()?).is_some()),
        "variance" => Value::Number(population_variance(&args[0].numbers()?)),
        "mean_or" => Value::Number(mean_or(&args[0].numbers()?, args[1].as_number()?)),
        "steps" => vectors(consecutive_steps(&args[0].vectors()?)),
        "normalize_each" => vectors(args[0].vectors()?.into_iter().map(normalize)),
        "chain_dots" => numbers(consecutive_dots(&args[0].vectors()?)),
        "remap01" => match &args[0] {
            Value::Number(cos) => Value::Number(remap_unit(*cos)),
            list => numbers(list.numbers()?.into_iter().map(remap_unit)),
        },
        "mirror_residuals" => {
            let axis = axis(&args[1])?;
            numbers(mirror_residuals(&args[0].vectors()?, axis))
        }
        _ => return Err(SkillError::Runtime(format!("unknown builtin `{name}`"))),
    };
    Ok(value)
}
