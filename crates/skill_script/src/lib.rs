//! Skill scripts: a small, sandboxed expression language for relation
//! scorers that can be replaced while the process runs.
//!
//! ```text
//! skill proximity(a, b; min_dist = 1.0, max_dist = 5.0) {
//!     let d = distance(a.location, b.location);
//!     if d <= min_dist { 1.0 } else if d >= max_dist { 0.0 }
//!     else { 1.0 - (d - min_dist) / (max_dist - min_dist) }
//! }
//! ```
//!
//! Scripts have no loops, no recursion and no I/O. Every call goes to a
//! fixed table of geometry builtins, so evaluation always terminates.

pub mod ast;
mod builtins;
mod interpreter;
pub mod lexer;
pub mod parser;
mod resolver;
mod skill;
mod value;

pub use skill::ScriptSkill;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ScriptError {
    #[error("{line}:{column}: {message}")]
    Syntax {
        line: u32,
        column: u32,
        message: String,
    },
    #[error("{0}")]
    Semantic(String),
}

pub fn parse(source: &str) -> Result<ast::Program, ScriptError> {
    parser::Parser::new(source)?.parse_program()
}

/// Parse and statically check `source`, producing a callable skill.
pub fn compile(source: &str) -> Result<ScriptSkill, ScriptError> {
    let program = parse(source)?;
    resolver::check(&program)?;
    Ok(ScriptSkill::new(program, source))
}
