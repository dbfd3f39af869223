use crate::ast::{BinaryOpKind, CompareOpKind, LogicalOpKind};
use crate::error::{ErrorKind, EvalResult};
use crate::value::{format_number, Value};

/// Sentinel produced by arithmetic on strings that has no meaning.
pub const NAN_STRING: &str = "NaN";

/// Arithmetic over two evaluated operands. `repeat_limit` caps string repetition.
pub fn binary(op: BinaryOpKind, left: &Value, right: &Value, repeat_limit: usize) -> EvalResult<Value> {
    let result = match (left, right) {
        (Value::Number(a), Value::Number(b)) => Value::Number(arithmetic(op, *a, *b)),
        (Value::Number(n), Value::String(s)) => match op {
            BinaryOpKind::Add => Value::String(format!("{}{}", format_number(*n), s)),
            BinaryOpKind::Mul => Value::String(repeat(s, *n, repeat_limit)?),
            _ => Value::String(NAN_STRING.to_string()),
        },
        (Value::String(s), Value::Number(n)) => match op {
            BinaryOpKind::Add => Value::String(format!("{}{}", s, format_number(*n))),
            BinaryOpKind::Mul => Value::String(repeat(s, *n, repeat_limit)?),
            _ => Value::String(NAN_STRING.to_string()),
        },
        (Value::String(_), Value::String(_)) => Value::String(NAN_STRING.to_string()),
        _ => Value::Null,
    };
    Ok(result)
}

pub fn arithmetic(op: BinaryOpKind, a: f64, b: f64) -> f64 {
    match op {
        BinaryOpKind::Add => a + b,
        BinaryOpKind::Sub => a - b,
        BinaryOpKind::Mul => a * b,
        BinaryOpKind::Div => a / b,
        BinaryOpKind::Mod => a % b,
        BinaryOpKind::Pow => a.powf(b),
    }
}

/// `"ab" * n` yields `n - 1` copies of `"ab"`: `3 * "ab"` is `"abab"`.
///
/// Truncates a fractional count toward zero. `NaN` and counts below one produce an empty string.
pub fn repeat(s: &str, count: f64, limit: usize) -> EvalResult<String> {
    let copies = if count.is_nan() || count < 1.0 {
        0.0
    } else {
        count.trunc() - 1.0
    };
    if copies > limit as f64 {
        return Err(ErrorKind::IterationLimitExceeded(limit).into());
    }
    Ok(s.repeat(copies as usize))
}

pub fn compare(op: CompareOpKind, left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Value::Boolean(ordered(op, a.partial_cmp(b), a == b)),
        (Value::String(a), Value::String(b)) => Value::Boolean(ordered(op, Some(a.cmp(b)), a == b)),
        _ => Value::Null,
    }
}

fn ordered(op: CompareOpKind, ordering: Option<std::cmp::Ordering>, equal: bool) -> bool {
    use std::cmp::Ordering::*;
    match op {
        CompareOpKind::Eq => equal,
        CompareOpKind::Ne => !equal,
        CompareOpKind::Lt => ordering == Some(Less),
        CompareOpKind::Le => matches!(ordering, Some(Less | Equal)),
        CompareOpKind::Gt => ordering == Some(Greater),
        CompareOpKind::Ge => matches!(ordering, Some(Greater | Equal)),
    }
}

/// Both operands are already evaluated; there is no short circuit.
pub fn logical(op: LogicalOpKind, left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Boolean(a), Value::Boolean(b)) => Value::Boolean(match op {
            LogicalOpKind::And => *a && *b,
            LogicalOpKind::Or => *a || *b,
        }),
        _ => Value::Null,
    }
}

pub fn not(value: &Value) -> Value {
    match value {
        Value::Boolean(b) => Value::Boolean(!b),
        _ => Value::Null,
    }
}

pub fn minus(value: &Value) -> EvalResult<Value> {
    match value {
        Value::Number(n) => Ok(Value::Number(-n)),
        other => Err(ErrorKind::TypeError(format!(
            "unary minus expects a number, found {}",
            other.type_name()
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LIMIT: usize = 100_000;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn text(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn numbers_follow_float_arithmetic() {
        assert_eq!(binary(BinaryOpKind::Pow, &num(3.0), &num(2.0), LIMIT).unwrap(), num(9.0));
        assert_eq!(binary(BinaryOpKind::Mod, &num(7.0), &num(2.0), LIMIT).unwrap(), num(1.0));
        assert_eq!(binary(BinaryOpKind::Div, &num(1.0), &num(4.0), LIMIT).unwrap(), num(0.25));
        assert_eq!(
            binary(BinaryOpKind::Div, &num(1.0), &num(0.0), LIMIT).unwrap(),
            num(f64::INFINITY)
        );
        assert_eq!(binary(BinaryOpKind::Sub, &num(0.5), &num(2.0), LIMIT).unwrap(), num(-1.5));
    }

    #[test]
    fn mixed_addition_concatenates_in_operand_order() {
        assert_eq!(binary(BinaryOpKind::Add, &num(3.0), &text("x"), LIMIT).unwrap(), text("3x"));
        assert_eq!(binary(BinaryOpKind::Add, &text("x"), &num(2.5), LIMIT).unwrap(), text("x2.5"));
    }

    #[test]
    fn repetition_table() {
        let cases = [
            (0.0, ""),
            (1.0, ""),
            (2.0, "ab"),
            (3.0, "abab"),
            (4.0, "ababab"),
            (2.7, "ab"),
            (-3.0, ""),
            (f64::NAN, ""),
        ];
        for (count, expected) in cases {
            assert_eq!(
                binary(BinaryOpKind::Mul, &num(count), &text("ab"), LIMIT).unwrap(),
                text(expected),
                "count {}",
                count
            );
            assert_eq!(
                binary(BinaryOpKind::Mul, &text("ab"), &num(count), LIMIT).unwrap(),
                text(expected)
            );
        }
    }

    #[test]
    fn repetition_is_bounded() {
        let err = repeat("ab", 1e12, 10).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IterationLimitExceeded(10));
        assert!(repeat("ab", f64::INFINITY, 10).is_err());
    }

    #[test]
    fn meaningless_string_arithmetic_is_nan_text() {
        for op in [BinaryOpKind::Sub, BinaryOpKind::Div, BinaryOpKind::Mod, BinaryOpKind::Pow] {
            assert_eq!(binary(op, &num(1.0), &text("a"), LIMIT).unwrap(), text("NaN"));
        }
        for op in [BinaryOpKind::Add, BinaryOpKind::Sub, BinaryOpKind::Mul, BinaryOpKind::Div] {
            assert_eq!(binary(op, &text("a"), &text("b"), LIMIT).unwrap(), text("NaN"));
        }
    }

    #[test]
    fn unsupported_pairs_are_null() {
        assert_eq!(
            binary(BinaryOpKind::Add, &Value::Boolean(true), &num(1.0), LIMIT).unwrap(),
            Value::Null
        );
        assert_eq!(compare(CompareOpKind::Eq, &num(1.0), &text("1")), Value::Null);
        assert_eq!(logical(LogicalOpKind::And, &num(1.0), &Value::Boolean(true)), Value::Null);
        assert_eq!(not(&num(0.0)), Value::Null);
    }

    #[test]
    fn comparisons() {
        assert_eq!(compare(CompareOpKind::Lt, &num(1.0), &num(2.0)), Value::Boolean(true));
        assert_eq!(compare(CompareOpKind::Ge, &num(2.0), &num(2.0)), Value::Boolean(true));
        assert_eq!(compare(CompareOpKind::Ne, &num(f64::NAN), &num(f64::NAN)), Value::Boolean(true));
        assert_eq!(compare(CompareOpKind::Lt, &text("abc"), &text("abd")), Value::Boolean(true));
        assert_eq!(compare(CompareOpKind::Eq, &text("a"), &text("a")), Value::Boolean(true));
        assert_eq!(compare(CompareOpKind::Gt, &text("B"), &text("a")), Value::Boolean(false));
    }

    #[test]
    fn logic_and_negation() {
        let t = Value::Boolean(true);
        let f = Value::Boolean(false);
        assert_eq!(logical(LogicalOpKind::And, &t, &f), f);
        assert_eq!(logical(LogicalOpKind::Or, &t, &f), t);
        assert_eq!(not(&t), f);
    }

    #[test]
    fn minus_requires_a_number() {
        assert_eq!(minus(&num(4.0)).unwrap(), num(-4.0));
        let err = minus(&text("4")).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeError(_)));
    }
}
