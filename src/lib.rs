//! Tree-walking interpreter for the Avenger scripting language.
//!
//! Source text goes through [`lexer::tokenize`] and [`parser::parse`] into a
//! [`ast::Program`], which [`eval::evaluate`] runs against a chain of [`Env`]
//! scopes rooted at [`global_env`].

pub mod ast;
pub mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod operators;
pub mod parser;
pub mod value;

pub use config::Config;
pub use env::Env;
pub use error::{Error, ErrorKind, EvalError, EvalResult, SyntaxError};
pub use eval::{evaluate, Flow};
pub use value::Value;

/// A root scope holding the global constants and native functions.
pub fn global_env(config: Config) -> EvalResult<Env> {
    let env = Env::new(config);
    builtins::install(&env)?;
    Ok(env)
}

/// Parses and runs `source` in `env`, returning the value of the last statement.
pub fn run_source(source: &str, env: &Env) -> Result<Value, Error> {
    let program = parser::parse_source(source)?;
    Ok(evaluate(&program, env)?)
}
