#![allow(dead_code)]

use avenger_interpreter::{global_env, run_source, Config, Error, ErrorKind, EvalError, Value};

pub fn run_with(config: Config, source: &str) -> Result<Value, Error> {
    let env = global_env(config).expect("globals install into a fresh scope");
    run_source(source, &env)
}

pub fn run(source: &str) -> Value {
    match run_with(Config::default(), source) {
        Ok(value) => value,
        Err(err) => panic!("script failed: {}\n{}", err, source),
    }
}

pub fn eval_error_with(config: Config, source: &str) -> EvalError {
    match run_with(config, source) {
        Err(Error::Eval(err)) => err,
        Err(Error::Syntax(err)) => panic!("unexpected syntax error: {}", err),
        Ok(value) => panic!("expected a runtime error, got {:?}", value),
    }
}

pub fn error_kind(source: &str) -> ErrorKind {
    eval_error_with(Config::default(), source).kind
}

pub fn num(n: f64) -> Value {
    Value::Number(n)
}

pub fn text(s: &str) -> Value {
    Value::String(s.to_string())
}
