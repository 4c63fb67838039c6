use crate::ScriptError;
use crate::ast::{AssetBinding, Block, Expr, Program};
use crate::builtins;

const FIELDS: &[&str] = &["location", "orientation", "scale", "x", "y", "z"];

/// Static checks run before a program is accepted: every variable is bound,
/// every call names a builtin with the right argument count, and every field
/// access names a known field.
pub fn check(program: &Program) -> Result<(), ScriptError> {
    let mut scope: Vec<&str> = match &program.assets {
        AssetBinding::Fixed(names) => names.iter().map(String::as_str).collect(),
        AssetBinding::Variadic(name) => vec![name.as_str()],
    };
    for param in &program.params {
        if scope.contains(&param.name.as_str()) {
            return Err(ScriptError::Semantic(format!(
                "`{}` is declared twice",
                param.name
            )));
        }
        scope.push(&param.name);
    }
    if let AssetBinding::Fixed(names) = &program.assets {
        if names.is_empty() {
            return Err(ScriptError::Semantic("skill declares no assets".into()));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ScriptError::Semantic(format!("`{name}` is declared twice")));
            }
        }
    }
    block(&program.body, &mut scope)
}

fn block<'a>(block_ast: &'a Block, scope: &mut Vec<&'a str>) -> Result<(), ScriptError> {
    let mark = scope.len();
    for (name, value) in &block_ast.lets {
        expr(value, scope)?;
        scope.push(name);
    }
    let result = expr(&block_ast.value, scope);
    scope.truncate(mark);
    result
}

fn expr<'a>(node: &'a Expr, scope: &mut Vec<&'a str>) -> Result<(), ScriptError> {
    match node {
        Expr::Literal(_) => Ok(()),
        Expr::Var(name) => {
            if scope.contains(&name.as_str()) {
                Ok(())
            } else {
                Err(ScriptError::Semantic(format!("unknown variable `{name}`")))
            }
        }
        Expr::Unary(_, inner) => expr(inner, scope),
        Expr::Binary(_, lhs, rhs) => {
            expr(lhs, scope)?;
            expr(rhs, scope)
        }
        Expr::Call(name, args) => {
            let Some(expected) = builtins::arity(name) else {
                return Err(ScriptError::Semantic(format!("unknown function `{name}`")));
            };
            if args.len() != expected {
                return Err(ScriptError::Semantic(format!(
                    "`{name}` takes {expected} arguments, got {}",
                    args.len()
                )));
            }
            args.iter().try_for_each(|arg| expr(arg, scope))
        }
        Expr::Field(target, field) => {
            if !FIELDS.contains(&field.as_str()) {
                return Err(ScriptError::Semantic(format!("unknown field `{field}`")));
            }
            expr(target, scope)
        }
        Expr::Index(target, index) => {
            expr(target, scope)?;
            expr(index, scope)
        }
        Expr::If {
            cond,
            then,
            otherwise,
        } => {
            expr(cond, scope)?;
            block(then, scope)?;
            block(otherwise, scope)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ScriptError;
    use crate::parser::Parser;

    fn check(src: &str) -> Result<(), ScriptError> {
        let program = Parser::new(src)?.parse_program()?;
        super::check(&program)
    }

    #[test]
    fn accepts_bound_names() {
        let source = "skill s(a, b; k = 2) { let d = distance(a.location, b.location); d * k }";
        assert!(check(source).is_ok());
    }

    #[test]
    fn rejects_unbound_and_unknown() {
        assert_eq!(
            check("skill s(a) { c }"),
            Err(ScriptError::Semantic("unknown variable `c`".into()))
        );
        assert_eq!(
            check("skill s(a) { system(\"ls\") }"),
            Err(ScriptError::Semantic("unknown function `system`".into()))
        );
        assert_eq!(
            check("skill s(a) { a.color }"),
            Err(ScriptError::Semantic("unknown field `color`".into()))
        );
        assert!(check("skill s(a) { distance(a.location) }").is_err());
    }

    #[test]
    fn let_bindings_do_not_leak_out_of_blocks() {
        assert!(check("skill s(a) { if true { let t = 1; t } else { t } }").is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        assert!(check("skill s(a, a) { 1 }").is_err());
        assert!(check("skill s(a; a = 1) { 1 }").is_err());
    }
}
