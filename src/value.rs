use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::Stmt;
use crate::env::Env;
use crate::error::EvalResult;

/// Host callable exposed to scripts. Receives the evaluated arguments and the caller's scope.
pub type NativeFn = Rc<dyn Fn(Vec<Value>, &Env) -> EvalResult<Value>>;

/// A user function together with the scope it was defined in.
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub closure: Env,
}

/// Storage behind a `team` declaration. Arrays are shared: copies of the value alias it.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    pub name: String,
    pub elements: Vec<Value>,
}

#[derive(Clone)]
pub enum Value {
    Null,
    Number(f64),
    Boolean(bool),
    String(String),
    Array(Rc<RefCell<Array>>),
    Function(Rc<Function>),
    NativeFunction(NativeFn),
    /// Loop exit sentinel; only ever the result of a program stopped by a stray `endGame`.
    Break,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Break, Value::Break) => true,
            _ => false,
        }
    }
}

impl Value {
    pub fn array(name: impl Into<String>, elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(Array {
            name: name.into(),
            elements,
        })))
    }

    pub fn native(f: impl Fn(Vec<Value>, &Env) -> EvalResult<Value> + 'static) -> Self {
        Value::NativeFunction(Rc::new(f))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            Value::NativeFunction(_) => "native-fn",
            Value::Break => "break",
        }
    }

    /// Truthiness of a loop or branch condition; `None` when the value cannot be a condition.
    pub fn as_condition(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }
}

/// Renders a number the way scripts print it: integral values without a fraction,
/// exponent notation (`1e+21`, `1.5e-7`) outside `1e-6..1e21`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        }
    } else {
        format!("{}", n)
    }
}

/// Writes `array` as `[a, b]`. An array met again inside itself prints as `[...]`.
fn write_array(
    f: &mut fmt::Formatter,
    array: &Rc<RefCell<Array>>,
    open: &mut Vec<*const RefCell<Array>>,
) -> fmt::Result {
    let ptr = Rc::as_ptr(array);
    if open.contains(&ptr) {
        return write!(f, "[...]");
    }
    open.push(ptr);
    write!(f, "[")?;
    for (i, element) in array.borrow().elements.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        match element {
            Value::Array(inner) => write_array(f, inner, open)?,
            other => write!(f, "{}", other)?,
        }
    }
    open.pop();
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(arr) => write_array(f, arr, &mut Vec::new()),
            Value::Function(func) => write!(f, "<function {}>", func.name),
            Value::NativeFunction(_) => write!(f, "<native function>"),
            Value::Break => write!(f, "<break>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            other => write!(f, "{}", other),
        }
    }
}
