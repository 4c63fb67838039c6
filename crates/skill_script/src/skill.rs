use layout_types::{ArgValue, Layout};
use spatial_skills::{Arity, BoundArgs, ParamSpec, ParamType, Skill, SkillError, SkillSignature};

use crate::ast::{AssetBinding, Literal, ParamKind, Program};
use crate::interpreter::{Env, eval_block};
use crate::value::Value;

/// A relation scorer compiled from skill-script source.
#[derive(Debug, Clone)]
pub struct ScriptSkill {
    program: Program,
    signature: SkillSignature,
    source: String,
}

impl ScriptSkill {
    pub(crate) fn new(program: Program, source: &str) -> Self {
        let signature = signature_of(&program);
        Self {
            program,
            signature,
            source: source.to_string(),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }
}

fn signature_of(program: &Program) -> SkillSignature {
    let arity = match &program.assets {
        AssetBinding::Fixed(names) => Arity::Exact(names.len()),
        AssetBinding::Variadic(_) => Arity::Variadic,
    };
    let params = program
        .params
        .iter()
        .map(|decl| ParamSpec {
            name: decl.name.clone(),
            kind: match decl.kind {
                ParamKind::Number => ParamType::Number,
                ParamKind::Text => ParamType::Text,
            },
            default: decl.default.as_ref().and_then(|literal| match literal {
                Literal::Number(v) => Some(ArgValue::Number(*v)),
                Literal::Text(v) => Some(ArgValue::Text(v.clone())),
                Literal::Bool(_) => None,
            }),
        })
        .collect();
    SkillSignature::new(arity, params)
}

impl Skill for ScriptSkill {
    fn name(&self) -> &str {
        &self.program.name
    }

    fn signature(&self) -> &SkillSignature {
        &self.signature
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn score(&self, layouts: &[&Layout], args: &BoundArgs) -> Result<f64, SkillError> {
        self.signature.check_arity(layouts.len())?;

        let mut env = Env::default();
        match &self.program.assets {
            AssetBinding::Fixed(names) => {
                for (name, layout) in names.iter().zip(layouts) {
                    env.bind(name, Value::Layout(**layout));
                }
            }
            AssetBinding::Variadic(name) => {
                let all = layouts.iter().map(|l| Value::Layout(**l)).collect();
                env.bind(name, Value::List(all));
            }
        }
        for decl in &self.program.params {
            let value = match args.get(&decl.name) {
                Some(ArgValue::Number(v)) => Value::Number(*v),
                Some(ArgValue::Text(v)) => Value::Text(v.clone()),
                None => return Err(SkillError::MissingArgument(decl.name.clone())),
            };
            env.bind(&decl.name, value);
        }

        match eval_block(&self.program.body, &mut env)? {
            Value::Number(score) => Ok(score),
            other => Err(SkillError::Runtime(format!(
                "skill `{}` produced {} instead of a number",
                self.program.name,
                other.type_name()
            ))),
        }
    }
}
