use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{trace, warn};

use crate::config::Config;
use crate::error::{ErrorKind, EvalResult};
use crate::value::Value;

struct Scope {
    vars: HashMap<String, Value>,
    constants: HashSet<String>,
    parent: Option<Env>,
    config: Config,
    call_depth: usize,
}

/// Shared handle to one lexical scope. Cloning the handle aliases the scope.
#[derive(Clone)]
pub struct Env(Rc<RefCell<Scope>>);

impl Env {
    /// A root scope with no parent.
    pub fn new(config: Config) -> Self {
        Self::with_parent(None, config, 0)
    }

    fn with_parent(parent: Option<Env>, config: Config, call_depth: usize) -> Self {
        Env(Rc::new(RefCell::new(Scope {
            vars: HashMap::new(),
            constants: HashSet::new(),
            parent,
            config,
            call_depth,
        })))
    }

    /// Block scope: inherits limits and call depth from `self`.
    pub fn child(&self) -> Self {
        let scope = self.0.borrow();
        Self::with_parent(Some(self.clone()), scope.config, scope.call_depth)
    }

    /// Scope for one invocation of a function defined in `closure`, called from depth `caller_depth`.
    pub fn call_scope(closure: &Env, caller_depth: usize) -> Self {
        let config = closure.config();
        Self::with_parent(Some(closure.clone()), config, caller_depth + 1)
    }

    pub fn config(&self) -> Config {
        self.0.borrow().config
    }

    pub fn call_depth(&self) -> usize {
        self.0.borrow().call_depth
    }

    pub fn declare(&self, name: &str, value: Value, constant: bool) -> EvalResult<Value> {
        let mut scope = self.0.borrow_mut();
        if scope.vars.contains_key(name) {
            return Err(ErrorKind::DuplicateDeclaration(name.to_string()).into());
        }
        scope.vars.insert(name.to_string(), value.clone());
        if constant {
            scope.constants.insert(name.to_string());
        }
        Ok(value)
    }

    pub fn assign(&self, name: &str, value: Value) -> EvalResult<Value> {
        let owner = self
            .resolve_owner(name)
            .ok_or_else(|| ErrorKind::UnresolvedIdentifier(name.to_string()))?;
        let mut scope = owner.0.borrow_mut();
        if scope.constants.contains(name) {
            return Err(ErrorKind::ConstReassignment(name.to_string()).into());
        }
        scope.vars.insert(name.to_string(), value.clone());
        Ok(value)
    }

    pub fn lookup(&self, name: &str) -> EvalResult<Value> {
        let owner = self
            .resolve_owner(name)
            .ok_or_else(|| ErrorKind::UnresolvedIdentifier(name.to_string()))?;
        let scope = owner.0.borrow();
        scope
            .vars
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorKind::UnresolvedIdentifier(name.to_string()).into())
    }

    /// Nearest scope, starting at `self`, that declares `name`.
    pub fn resolve_owner(&self, name: &str) -> Option<Env> {
        let scope = self.0.borrow();
        if scope.vars.contains_key(name) {
            return Some(self.clone());
        }
        match &scope.parent {
            Some(parent) => parent.resolve_owner(name),
            None => None,
        }
    }

    /// Drops this scope's own bindings. Ancestors are untouched.
    pub fn clear(&self) {
        let mut scope = self.0.borrow_mut();
        scope.vars.clear();
        scope.constants.clear();
    }

    /// Ends a block scope. A scope still captured by a closure keeps its bindings.
    ///
    /// Functions bound here capture the scope they live in. When those bindings are
    /// the only other holders, clearing the scope breaks the cycle and frees it.
    pub fn discard(self) {
        if Rc::strong_count(&self.0) == 1 + self.self_captures() {
            self.clear();
        } else {
            trace!("scope outlives its block, kept for closures");
        }
    }

    /// Functions bound in this scope, captured here and referenced nowhere else.
    fn self_captures(&self) -> usize {
        self.0
            .borrow()
            .vars
            .values()
            .filter(|value| match value {
                Value::Function(function) => {
                    Rc::strong_count(function) == 1 && function.closure.ptr_eq(self)
                }
                _ => false,
            })
            .count()
    }

    pub fn guard_iteration(&self, count: usize) -> EvalResult<()> {
        let limit = self.0.borrow().config.iteration_limit;
        if count > limit {
            warn!(limit, "iteration guard tripped");
            return Err(ErrorKind::IterationLimitExceeded(limit).into());
        }
        Ok(())
    }

    pub fn ptr_eq(&self, other: &Env) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
