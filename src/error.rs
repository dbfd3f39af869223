use std::fmt;

/// What went wrong while evaluating a program.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("cannot resolve '{0}' in the scope")]
    UnresolvedIdentifier(String),

    #[error("cannot declare '{0}', it is already defined in this scope")]
    DuplicateDeclaration(String),

    #[error("cannot reassign to constant '{0}'")]
    ConstReassignment(String),

    #[error("type error: {0}")]
    TypeError(String),

    #[error("condition in '{construct}' must be a number or boolean, found {found}")]
    ConditionTypeError {
        construct: &'static str,
        found: &'static str,
    },

    #[error("{target} index must be a number, found {found}")]
    InvalidIndexType {
        target: &'static str,
        found: &'static str,
    },

    #[error("'multiverse' expected a {expected} in 'madness', found {found}")]
    SwitchTypeError {
        expected: &'static str,
        found: &'static str,
    },

    #[error("type mismatch: cannot apply '{op}' to {current} and {value}")]
    TypeMismatch {
        op: String,
        current: &'static str,
        value: &'static str,
    },

    #[error("function '{name}' expects {expected} arguments, but {found} were provided")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid array size {size} at '{name}'")]
    InvalidArraySize { name: String, size: String },

    #[error("segmentation fault: array size {size} at '{name}' exceeds 1e7")]
    SegFaultSimulated { name: String, size: f64 },

    #[error("excess elements in array initializer at '{name}': size is {size} but {provided} values were provided")]
    ExcessInitializers {
        name: String,
        size: usize,
        provided: usize,
    },

    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: f64, len: usize },

    #[error("the step of 'wakandaForEach' must be a positive non-zero number, found {0}")]
    InvalidStep(f64),

    #[error("loop exceeded {0} iterations")]
    IterationLimitExceeded(usize),

    #[error("cannot call a value of type {0}")]
    UncallableValue(&'static str),

    #[error("invalid left-hand side in assignment")]
    InvalidAssignmentTarget,

    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),

    #[error("test failed: expected {expected}, got {actual}")]
    AssertionFailed { expected: String, actual: String },

    #[error("{name}: {message}")]
    Native { name: String, message: String },
}

/// An evaluation failure, tagged with the source line of the statement that raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    pub kind: ErrorKind,
    pub line: Option<usize>,
}

impl EvalError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, line: None }
    }

    /// Stamps `line` unless a more deeply nested statement already did.
    pub fn at_line(mut self, line: usize) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    pub fn native(name: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Native {
            name: name.to_string(),
            message: message.into(),
        })
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "RunTimeError:line:{}: {}", line, self.kind),
            None => write!(f, "RunTimeError: {}", self.kind),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<ErrorKind> for EvalError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("SyntaxError:line:{line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Anything that can stop a script from running to completion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_line_wins() {
        let err = EvalError::new(ErrorKind::UnresolvedIdentifier("x".into()))
            .at_line(7)
            .at_line(2);
        assert_eq!(err.line, Some(7));
        assert_eq!(err.to_string(), "RunTimeError:line:7: cannot resolve 'x' in the scope");
    }

    #[test]
    fn unlocated_error_has_no_line_prefix() {
        let err = EvalError::from(ErrorKind::InvalidStep(0.0));
        assert!(err.to_string().starts_with("RunTimeError: the step"));
    }
}
