use spatial_skills::SkillError;

use crate::ast::{BinaryOp, Block, Expr, Literal, UnaryOp};
use crate::builtins;
use crate::value::{Value, type_error};

/// Lexically scoped bindings. Lookups walk from the newest binding back so
/// that inner `let`s shadow outer names.
#[derive(Debug, Default)]
pub struct Env {
    bindings: Vec<(String, Value)>,
}

impl Env {
    pub fn bind(&mut self, name: &str, value: Value) {
        self.bindings.push((name.to_string(), value));
    }

    fn lookup(&self, name: &str) -> Result<&Value, SkillError> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
            .ok_or_else(|| SkillError::Runtime(format!("unbound variable `{name}`")))
    }
}

pub fn eval_block(block: &Block, env: &mut Env) -> Result<Value, SkillError> {
    let mark = env.bindings.len();
    let result = eval_scoped(block, env);
    env.bindings.truncate(mark);
    result
}

fn eval_scoped(block: &Block, env: &mut Env) -> Result<Value, SkillError> {
    for (name, value) in &block.lets {
        let value = eval(value, env)?;
        env.bind(name, value);
    }
    eval(&block.value, env)
}

pub fn eval(expr: &Expr, env: &mut Env) -> Result<Value, SkillError> {
    match expr {
        Expr::Literal(Literal::Number(v)) => Ok(Value::Number(*v)),
        Expr::Literal(Literal::Bool(v)) => Ok(Value::Bool(*v)),
        Expr::Literal(Literal::Text(v)) => Ok(Value::Text(v.clone())),
        Expr::Var(name) => env.lookup(name).cloned(),
        Expr::Unary(UnaryOp::Neg, inner) => match eval(inner, env)? {
            Value::Number(v) => Ok(Value::Number(-v)),
            Value::Vec3(v) => Ok(Value::Vec3(-v)),
            other => Err(type_error("number or vec3", &other)),
        },
        Expr::Unary(UnaryOp::Not, inner) => Ok(Value::Bool(!eval(inner, env)?.as_bool()?)),
        Expr::Binary(BinaryOp::And, lhs, rhs) => {
            if eval(lhs, env)?.as_bool()? {
                Ok(Value::Bool(eval(rhs, env)?.as_bool()?))
            } else {
                Ok(Value::Bool(false))
            }
        }
        Expr::Binary(BinaryOp::Or, lhs, rhs) => {
            if eval(lhs, env)?.as_bool()? {
                Ok(Value::Bool(true))
            } else {
                Ok(Value::Bool(eval(rhs, env)?.as_bool()?))
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs, env)?;
            let rhs = eval(rhs, env)?;
            binary(*op, lhs, rhs)
        }
        Expr::Call(name, args) => {
            let args = args
                .iter()
                .map(|arg| eval(arg, env))
                .collect::<Result<Vec<_>, _>>()?;
            builtins::call(name, &args)
        }
        Expr::Field(target, field) => field_of(eval(target, env)?, field),
        Expr::Index(target, index) => {
            let target = eval(target, env)?;
            let index = eval(index, env)?.as_number()?;
            let items = target.as_list()?;
            if index.fract() != 0.0 || index < 0.0 || index as usize >= items.len() {
                return Err(SkillError::Runtime(format!(
                    "index {index} out of range for list of {}",
                    items.len()
                )));
            }
            Ok(items[index as usize].clone())
        }
        Expr::If {
            cond,
            then,
            otherwise,
        } => {
            if eval(cond, env)?.as_bool()? {
                eval_block(then, env)
            } else {
                eval_block(otherwise, env)
            }
        }
    }
}

fn field_of(target: Value, field: &str) -> Result<Value, SkillError> {
    match (&target, field) {
        (Value::Layout(l), "location") => Ok(Value::Vec3(l.location)),
        (Value::Layout(l), "orientation") => Ok(Value::Vec3(l.orientation)),
        (Value::Layout(l), "scale") => Ok(Value::Vec3(l.scale)),
        (Value::Vec3(v), "x") => Ok(Value::Number(v.x)),
        (Value::Vec3(v), "y") => Ok(Value::Number(v.y)),
        (Value::Vec3(v), "z") => Ok(Value::Number(v.z)),
        _ => Err(SkillError::Runtime(format!(
            "{} has no field `{field}`",
            target.type_name()
        ))),
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, SkillError> {
    use Value::{Bool, Number, Text, Vec3};

    let value = match (op, &lhs, &rhs) {
        (BinaryOp::Add, Number(a), Number(b)) => Number(a + b),
        (BinaryOp::Sub, Number(a), Number(b)) => Number(a - b),
        (BinaryOp::Mul, Number(a), Number(b)) => Number(a * b),
        (BinaryOp::Div, Number(a), Number(b)) => Number(a / b),
        (BinaryOp::Add, Vec3(a), Vec3(b)) => Vec3(*a + *b),
        (BinaryOp::Sub, Vec3(a), Vec3(b)) => Vec3(*a - *b),
        (BinaryOp::Mul, Vec3(a), Number(b)) | (BinaryOp::Mul, Number(b), Vec3(a)) => Vec3(*a * *b),
        (BinaryOp::Div, Vec3(a), Number(b)) => Vec3(*a / *b),
        (BinaryOp::Lt, Number(a), Number(b)) => Bool(a < b),
        (BinaryOp::Gt, Number(a), Number(b)) => Bool(a > b),
        (BinaryOp::Le, Number(a), Number(b)) => Bool(a <= b),
        (BinaryOp::Ge, Number(a), Number(b)) => Bool(a >= b),
        (BinaryOp::Eq, Number(a), Number(b)) => Bool(a == b),
        (BinaryOp::Ne, Number(a), Number(b)) => Bool(a != b),
        (BinaryOp::Eq, Bool(a), Bool(b)) => Bool(a == b),
        (BinaryOp::Ne, Bool(a), Bool(b)) => Bool(a != b),
        (BinaryOp::Eq, Text(a), Text(b)) => Bool(a == b),
        (BinaryOp::Ne, Text(a), Text(b)) => Bool(a != b),
        _ => {
            return Err(SkillError::Runtime(format!(
                "unsupported operands for {op:?}: {} and {}",
                lhs.type_name(),
                rhs.type_name()
            )));
        }
    };
    Ok(value)
}
