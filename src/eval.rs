use std::rc::Rc;

use tracing::debug;

use crate::ast::*;
use crate::env::Env;
use crate::error::{ErrorKind, EvalResult};
use crate::operators;
use crate::value::{format_number, Function, Value};

const RED_ZONE: usize = 100 * 1024;
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Largest array a `team` declaration may allocate.
pub const MAX_ARRAY_SIZE: f64 = 10_000_000.0;

#[inline]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// Outcome of running a statement. Anything but `Normal` stops the enclosing statement list.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal(Value),
    Return(Value),
    Break,
}

/// Runs a whole program in `env` and returns the value of its last statement.
pub fn evaluate(program: &Program, env: &Env) -> EvalResult<Value> {
    debug!(statements = program.body.len(), "evaluating program");
    let mut last = Value::Null;
    for stmt in &program.body {
        match exec_stmt(stmt, env)? {
            Flow::Normal(value) => last = value,
            Flow::Return(value) => return Ok(value),
            Flow::Break => return Ok(Value::Break),
        }
    }
    Ok(last)
}

pub fn exec_block(stmts: &[Stmt], env: &Env) -> EvalResult<Flow> {
    let mut last = Value::Null;
    for stmt in stmts {
        match exec_stmt(stmt, env)? {
            Flow::Normal(value) => last = value,
            flow => return Ok(flow),
        }
    }
    Ok(Flow::Normal(last))
}

/// Runs `stmts` in a fresh child of `env`, discarding it afterwards.
fn exec_scoped(stmts: &[Stmt], env: &Env) -> EvalResult<Flow> {
    let scope = env.child();
    let flow = exec_block(stmts, &scope);
    scope.discard();
    flow
}

pub fn exec_stmt(stmt: &Stmt, env: &Env) -> EvalResult<Flow> {
    ensure_sufficient_stack(|| exec_kind(&stmt.kind, env)).map_err(|err| err.at_line(stmt.line))
}

fn exec_kind(kind: &StmtKind, env: &Env) -> EvalResult<Flow> {
    match kind {
        StmtKind::Expr(expr) => Ok(Flow::Normal(eval_expr(expr, env)?)),
        StmtKind::VarDecl { name, constant, value } => {
            let value = match value {
                Some(expr) => eval_expr(expr, env)?,
                None => Value::Null,
            };
            Ok(Flow::Normal(env.declare(name, value, *constant)?))
        }
        StmtKind::ArrayDecl { name, size, values } => exec_array_decl(name, size, values, env),
        StmtKind::If(stmt) => exec_if(stmt, env),
        StmtKind::While { condition, body } => exec_while(condition, body, env),
        StmtKind::RangeFor {
            iterator,
            start,
            end,
            step,
            body,
        } => exec_range_for(iterator, start, end, step.as_ref(), body, env),
        StmtKind::CFor {
            init,
            condition,
            modification,
            body,
        } => {
            let header = env.child();
            let flow = exec_c_for(init, condition, modification, body, &header);
            header.discard();
            flow
        }
        StmtKind::Switch {
            discriminant,
            cases,
            default,
        } => exec_switch(discriminant, cases, default, env),
        StmtKind::FunctionDef { name, params, body } => {
            let function = Value::Function(Rc::new(Function {
                name: name.clone(),
                params: params.clone(),
                body: body.clone(),
                closure: env.clone(),
            }));
            Ok(Flow::Normal(env.declare(name, function, false)?))
        }
        StmtKind::Return(expr) => {
            let value = match expr {
                Some(expr) => eval_expr(expr, env)?,
                None => Value::Null,
            };
            Ok(Flow::Return(value))
        }
        StmtKind::Break => Ok(Flow::Break),
    }
}

fn truthy(value: &Value, construct: &'static str) -> EvalResult<bool> {
    value.as_condition().ok_or_else(|| {
        ErrorKind::ConditionTypeError {
            construct,
            found: value.type_name(),
        }
        .into()
    })
}

fn exec_array_decl(name: &str, size: &Expr, values: &[Expr], env: &Env) -> EvalResult<Flow> {
    let size = match eval_expr(size, env)? {
        Value::Number(n) => n,
        other => {
            return Err(ErrorKind::InvalidArraySize {
                name: name.to_string(),
                size: other.type_name().to_string(),
            }
            .into())
        }
    };
    if size > MAX_ARRAY_SIZE {
        return Err(ErrorKind::SegFaultSimulated {
            name: name.to_string(),
            size,
        }
        .into());
    }
    if !(size >= 1.0) || size.fract() != 0.0 {
        return Err(ErrorKind::InvalidArraySize {
            name: name.to_string(),
            size: format_number(size),
        }
        .into());
    }
    let size = size as usize;
    if values.len() > size {
        return Err(ErrorKind::ExcessInitializers {
            name: name.to_string(),
            size,
            provided: values.len(),
        }
        .into());
    }

    let mut elements = Vec::with_capacity(size);
    for expr in values {
        elements.push(eval_expr(expr, env)?);
    }
    elements.resize(size, Value::Number(0.0));
    let array = env.declare(name, Value::array(name, elements), false)?;
    Ok(Flow::Normal(array))
}

fn exec_if(stmt: &IfStmt, env: &Env) -> EvalResult<Flow> {
    let condition = eval_expr(&stmt.condition, env)?;
    if truthy(&condition, "ifWorthy")? {
        return exec_scoped(&stmt.body, env);
    }
    match &stmt.else_branch {
        Some(ElseBranch::If(next)) => exec_if(next, env),
        Some(ElseBranch::Else(body)) => exec_scoped(body, env),
        None => Ok(Flow::Normal(Value::Null)),
    }
}

fn exec_while(condition: &Expr, body: &[Stmt], env: &Env) -> EvalResult<Flow> {
    let mut iterations = 0;
    loop {
        let test = eval_expr(condition, env)?;
        if !truthy(&test, "fightUntil")? {
            break;
        }
        iterations += 1;
        env.guard_iteration(iterations)?;
        match exec_scoped(body, env)? {
            Flow::Normal(_) => {}
            Flow::Break => break,
            flow @ Flow::Return(_) => return Ok(flow),
        }
    }
    Ok(Flow::Normal(Value::Null))
}

fn range_bound(expr: &Expr, part: &str, env: &Env) -> EvalResult<f64> {
    match eval_expr(expr, env)? {
        Value::Number(n) => Ok(n),
        other => Err(ErrorKind::TypeError(format!(
            "'wakandaForEach' {} must be a number, found {}",
            part,
            other.type_name()
        ))
        .into()),
    }
}

fn exec_range_for(
    iterator: &str,
    start: &Expr,
    end: &Expr,
    step: Option<&Expr>,
    body: &[Stmt],
    env: &Env,
) -> EvalResult<Flow> {
    let start = range_bound(start, "start", env)?;
    let end = range_bound(end, "end", env)?;
    let step = match step {
        Some(expr) => range_bound(expr, "step", env)?,
        None => 1.0,
    };
    if !(step > 0.0) {
        return Err(ErrorKind::InvalidStep(step).into());
    }

    let ascending = start <= end;
    let mut i = start;
    let mut iterations = 0;
    while (ascending && i <= end) || (!ascending && i >= end) {
        iterations += 1;
        env.guard_iteration(iterations)?;

        let scope = env.child();
        scope.declare(iterator, Value::Number(i), false)?;
        let flow = exec_block(body, &scope);
        scope.discard();
        match flow? {
            Flow::Normal(_) => {}
            Flow::Break => break,
            flow @ Flow::Return(_) => return Ok(flow),
        }

        i = if ascending { i + step } else { i - step };
    }
    Ok(Flow::Normal(Value::Null))
}

/// `header` persists across iterations; every body run gets its own child of it.
fn exec_c_for(
    init: &Stmt,
    condition: &Expr,
    modification: &Expr,
    body: &[Stmt],
    header: &Env,
) -> EvalResult<Flow> {
    if let flow @ (Flow::Return(_) | Flow::Break) = exec_stmt(init, header)? {
        return Ok(flow);
    }
    let mut iterations = 0;
    loop {
        let test = eval_expr(condition, header)?;
        if !truthy(&test, "wakandaFor")? {
            break;
        }
        iterations += 1;
        header.guard_iteration(iterations)?;
        match exec_scoped(body, header)? {
            Flow::Normal(_) => {}
            Flow::Break => break,
            flow @ Flow::Return(_) => return Ok(flow),
        }
        eval_expr(modification, header)?;
    }
    Ok(Flow::Normal(Value::Null))
}

fn exec_switch(
    discriminant: &Expr,
    cases: &[SwitchCase],
    default: &[Stmt],
    env: &Env,
) -> EvalResult<Flow> {
    let value = eval_expr(discriminant, env)?;
    if !matches!(value, Value::Number(_) | Value::String(_)) {
        return Err(ErrorKind::SwitchTypeError {
            expected: "number or string",
            found: value.type_name(),
        }
        .into());
    }

    let scope = env.child();
    let flow = run_switch(&value, cases, default, &scope);
    scope.discard();
    match flow? {
        Flow::Break => Ok(Flow::Normal(Value::Null)),
        flow => Ok(flow),
    }
}

fn run_switch(value: &Value, cases: &[SwitchCase], default: &[Stmt], scope: &Env) -> EvalResult<Flow> {
    for case in cases {
        let test = eval_expr(&case.test, scope)?;
        if test.type_name() != value.type_name() {
            return Err(ErrorKind::SwitchTypeError {
                expected: value.type_name(),
                found: test.type_name(),
            }
            .into());
        }
        if test == *value {
            return exec_block(&case.consequent, scope);
        }
    }
    exec_block(default, scope)
}

pub fn eval_expr(expr: &Expr, env: &Env) -> EvalResult<Value> {
    ensure_sufficient_stack(|| eval_kind(expr, env))
}

fn eval_kind(expr: &Expr, env: &Env) -> EvalResult<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::String(s) => Ok(Value::String(s.clone())),
        Expr::Null => Ok(Value::Null),
        Expr::Identifier(name) => env.lookup(name),
        Expr::Binary { left, op, right } => {
            let left = eval_expr(left, env)?;
            let right = eval_expr(right, env)?;
            operators::binary(*op, &left, &right, env.config().iteration_limit)
        }
        Expr::Comparison { left, op, right } => {
            let left = eval_expr(left, env)?;
            let right = eval_expr(right, env)?;
            Ok(operators::compare(*op, &left, &right))
        }
        Expr::Logical { left, op, right } => {
            let left = eval_expr(left, env)?;
            let right = eval_expr(right, env)?;
            Ok(operators::logical(*op, &left, &right))
        }
        Expr::Not(operand) => Ok(operators::not(&eval_expr(operand, env)?)),
        Expr::Minus(operand) => operators::minus(&eval_expr(operand, env)?),
        Expr::Assign { target, value } => eval_assign(target, value, env),
        Expr::CompoundAssign { target, op, value } => eval_compound_assign(target, *op, value, env),
        Expr::Member { object, index } => {
            let base = eval_expr(object, env)?;
            let index = eval_expr(index, env)?;
            read_member(&base, &index)
        }
        Expr::Call { callee, args } => {
            let callee = eval_expr(callee, env)?;
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(arg, env)?);
            }
            call_value(&callee, values, env)
        }
    }
}

/// Validates `index` against a container of `len` elements.
fn element_index(index: &Value, len: usize, target: &'static str) -> EvalResult<usize> {
    let n = match index {
        Value::Number(n) => *n,
        other => {
            return Err(ErrorKind::InvalidIndexType {
                target,
                found: other.type_name(),
            }
            .into())
        }
    };
    if n < 0.0 || n.fract() != 0.0 || n >= len as f64 {
        return Err(ErrorKind::IndexOutOfRange { index: n, len }.into());
    }
    Ok(n as usize)
}

fn read_member(base: &Value, index: &Value) -> EvalResult<Value> {
    match base {
        Value::Array(array) => {
            let array = array.borrow();
            let slot = element_index(index, array.elements.len(), "array")?;
            Ok(array.elements[slot].clone())
        }
        Value::String(s) => {
            let slot = element_index(index, s.chars().count(), "string")?;
            let ch = s.chars().nth(slot).map(String::from).unwrap_or_default();
            Ok(Value::String(ch))
        }
        other => Err(ErrorKind::TypeError(format!("cannot index into a value of type {}", other.type_name())).into()),
    }
}

fn eval_assign(target: &Expr, value: &Expr, env: &Env) -> EvalResult<Value> {
    match target {
        Expr::Identifier(name) => {
            let value = eval_expr(value, env)?;
            env.assign(name, value)
        }
        Expr::Member { object, index } => {
            let base = eval_expr(object, env)?;
            let index = eval_expr(index, env)?;
            let value = eval_expr(value, env)?;
            match base {
                Value::Array(array) => {
                    let mut array = array.borrow_mut();
                    let slot = element_index(&index, array.elements.len(), "array")?;
                    array.elements[slot] = value.clone();
                    Ok(value)
                }
                Value::String(s) => {
                    let name = match object.as_ref() {
                        Expr::Identifier(name) => name,
                        _ => return Err(ErrorKind::InvalidAssignmentTarget.into()),
                    };
                    let slot = element_index(&index, s.chars().count(), "string")?;
                    let replacement = match &value {
                        Value::String(text) => text.clone(),
                        Value::Number(_) | Value::Boolean(_) => value.to_string(),
                        other => {
                            return Err(ErrorKind::TypeError(format!(
                                "cannot write a {} into a string",
                                other.type_name()
                            ))
                            .into())
                        }
                    };
                    let updated: String = s
                        .chars()
                        .take(slot)
                        .chain(replacement.chars())
                        .chain(s.chars().skip(slot + 1))
                        .collect();
                    env.assign(name, Value::String(updated))?;
                    Ok(value)
                }
                other => Err(ErrorKind::TypeError(format!(
                    "cannot index into a value of type {}",
                    other.type_name()
                ))
                .into()),
            }
        }
        _ => Err(ErrorKind::InvalidAssignmentTarget.into()),
    }
}

fn eval_compound_assign(target: &Expr, op: BinaryOpKind, value: &Expr, env: &Env) -> EvalResult<Value> {
    let name = match target {
        Expr::Identifier(name) => name,
        _ => return Err(ErrorKind::InvalidAssignmentTarget.into()),
    };
    let current = env.lookup(name)?;
    let value = eval_expr(value, env)?;
    match (&current, &value) {
        (Value::Number(a), Value::Number(b)) => {
            env.assign(name, Value::Number(operators::arithmetic(op, *a, *b)))
        }
        _ => Err(ErrorKind::TypeMismatch {
            op: format!("{}=", op),
            current: current.type_name(),
            value: value.type_name(),
        }
        .into()),
    }
}

/// Invokes a callable value with already evaluated arguments.
pub fn call_value(callee: &Value, args: Vec<Value>, env: &Env) -> EvalResult<Value> {
    match callee {
        Value::NativeFunction(native) => native(args, env),
        Value::Function(function) => call_function(function, args, env),
        other => Err(ErrorKind::UncallableValue(other.type_name()).into()),
    }
}

fn call_function(function: &Function, args: Vec<Value>, caller: &Env) -> EvalResult<Value> {
    if args.len() != function.params.len() {
        return Err(ErrorKind::ArityMismatch {
            name: function.name.clone(),
            expected: function.params.len(),
            found: args.len(),
        }
        .into());
    }
    let depth = caller.call_depth();
    let max_depth = caller.config().max_call_depth;
    if depth >= max_depth {
        return Err(ErrorKind::CallDepthExceeded(max_depth).into());
    }
    debug!(function = %function.name, depth = depth + 1, "call");

    let scope = Env::call_scope(&function.closure, depth);
    for (param, arg) in function.params.iter().zip(args) {
        scope.declare(param, arg, false)?;
    }
    let flow = exec_block(&function.body, &scope);
    scope.discard();
    // A break that escapes every loop in the body ends the call.
    match flow? {
        Flow::Return(value) => Ok(value),
        Flow::Normal(_) | Flow::Break => Ok(Value::Null),
    }
}
