use crate::env::Env;
use crate::error::{ErrorKind, EvalError, EvalResult};
use crate::value::Value;

macro_rules! builtin {
    ($name:ident, $f:expr) => {
        pub fn $name() -> Value {
            Value::native($f)
        }
    };
}

/// One-argument numeric native.
macro_rules! math_builtin {
    ($name:ident, $script:literal, $op:expr) => {
        builtin!($name, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
            expect_arity($script, &args, 1, 1)?;
            let n = number_arg($script, &args, 0)?;
            Ok(Value::Number($op(n)))
        });
    };
}

/// Two-argument numeric native.
macro_rules! math_builtin2 {
    ($name:ident, $script:literal, $op:expr) => {
        builtin!($name, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
            expect_arity($script, &args, 2, 2)?;
            let a = number_arg($script, &args, 0)?;
            let b = number_arg($script, &args, 1)?;
            Ok(Value::Number($op(a, b)))
        });
    };
}

fn expect_arity(name: &str, args: &[Value], min: usize, max: usize) -> EvalResult<()> {
    if args.len() < min || args.len() > max {
        let expected = if args.len() < min { min } else { max };
        return Err(ErrorKind::ArityMismatch {
            name: name.to_string(),
            expected,
            found: args.len(),
        }
        .into());
    }
    Ok(())
}

fn type_error(name: &str, expected: &str, index: usize, found: &Value) -> EvalError {
    ErrorKind::TypeError(format!(
        "{} expects a {} as argument {}, found {}",
        name,
        expected,
        index + 1,
        found.type_name()
    ))
    .into()
}

fn number_arg(name: &str, args: &[Value], index: usize) -> EvalResult<f64> {
    match &args[index] {
        Value::Number(n) => Ok(*n),
        other => Err(type_error(name, "number", index, other)),
    }
}

fn string_arg<'a>(name: &str, args: &'a [Value], index: usize) -> EvalResult<&'a str> {
    match &args[index] {
        Value::String(s) => Ok(s.as_str()),
        other => Err(type_error(name, "string", index, other)),
    }
}

/// Clamps a script index into `0..=len`, truncating fractions; `NaN` counts as zero.
fn clamp_index(n: f64, len: usize) -> usize {
    if n.is_nan() || n <= 0.0 {
        0
    } else if n >= len as f64 {
        len
    } else {
        n.trunc() as usize
    }
}

fn char_slice(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}

// -----------------------------------------------------------------------------
// Output and testing
// -----------------------------------------------------------------------------

builtin!(vision_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    if args.is_empty() {
        println!();
        return Ok(Value::Null);
    }
    for arg in &args {
        if let Value::Array(_) = arg {
            return Err(EvalError::native(
                "vision",
                "invalid team print operation, print its elements one by one instead",
            ));
        }
        println!("{}", arg);
    }
    Ok(Value::Null)
});

builtin!(assert_equal_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("assertEqual", &args, 2, 2)?;
    let (actual, expected) = (&args[0], &args[1]);
    if actual.type_name() != expected.type_name() {
        return Err(EvalError::native(
            "assertEqual",
            format!(
                "test failed, type mismatch between {} and {}",
                actual.type_name(),
                expected.type_name()
            ),
        ));
    }
    if !matches!(actual, Value::Number(_) | Value::String(_) | Value::Boolean(_)) {
        return Err(EvalError::native(
            "assertEqual",
            format!("cannot compare values of type {}", actual.type_name()),
        ));
    }
    if actual != expected {
        return Err(ErrorKind::AssertionFailed {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
        .into());
    }
    println!("✅Test passed!");
    Ok(Value::Boolean(true))
});

builtin!(type_of_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("typeOf", &args, 1, 1)?;
    let name = match &args[0] {
        Value::NativeFunction(_) => "function",
        other => other.type_name(),
    };
    Ok(Value::String(name.to_string()))
});

// -----------------------------------------------------------------------------
// Numbers
// -----------------------------------------------------------------------------

builtin!(time_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("time", &args, 0, 0)?;
    Ok(Value::Number(chrono::Utc::now().timestamp_millis() as f64))
});

builtin!(rand_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("rand", &args, 0, 0)?;
    Ok(Value::Number(rand::random::<f64>()))
});

math_builtin!(abs_fn, "abs", f64::abs);
math_builtin!(floor_fn, "floor", f64::floor);
math_builtin!(ceil_fn, "ceil", f64::ceil);
math_builtin!(round_fn, "round", |n: f64| (n + 0.5).floor());
math_builtin!(sqrt_fn, "sqrt", f64::sqrt);
math_builtin!(sin_fn, "sin", f64::sin);
math_builtin!(cos_fn, "cos", f64::cos);
math_builtin!(tan_fn, "tan", f64::tan);
math_builtin!(isin_fn, "iSin", f64::asin);
math_builtin!(icos_fn, "iCos", f64::acos);
math_builtin!(itan_fn, "iTan", f64::atan);
math_builtin2!(min_fn, "min", f64::min);
math_builtin2!(max_fn, "max", f64::max);
math_builtin2!(pow_fn, "pow", f64::powf);

// -----------------------------------------------------------------------------
// Strings
// -----------------------------------------------------------------------------

builtin!(len_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("len", &args, 1, 1)?;
    match &args[0] {
        Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
        Value::Array(array) => Ok(Value::Number(array.borrow().elements.len() as f64)),
        other => Err(type_error("len", "string or team", 0, other)),
    }
});

builtin!(char_at_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("charAt", &args, 2, 2)?;
    let s = string_arg("charAt", &args, 0)?;
    let index = number_arg("charAt", &args, 1)?;
    let index = if index.is_nan() { 0.0 } else { index.trunc() };
    let ch = if index < 0.0 {
        String::new()
    } else {
        s.chars().nth(index as usize).map(String::from).unwrap_or_default()
    };
    Ok(Value::String(ch))
});

builtin!(concat_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("concat", &args, 2, 3)?;
    let first = string_arg("concat", &args, 0)?;
    let second = string_arg("concat", &args, 1)?;
    let delimiter = if args.len() > 2 {
        string_arg("concat", &args, 2)?
    } else {
        " "
    };
    Ok(Value::String(format!("{}{}{}", first, delimiter, second)))
});

builtin!(to_lower_case_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("toLowerCase", &args, 1, 1)?;
    Ok(Value::String(string_arg("toLowerCase", &args, 0)?.to_lowercase()))
});

builtin!(to_upper_case_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("toUpperCase", &args, 1, 1)?;
    Ok(Value::String(string_arg("toUpperCase", &args, 0)?.to_uppercase()))
});

builtin!(trim_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("trim", &args, 1, 1)?;
    Ok(Value::String(string_arg("trim", &args, 0)?.trim().to_string()))
});

builtin!(index_of_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("indexOf", &args, 2, 3)?;
    let s = string_arg("indexOf", &args, 0)?;
    let needle = string_arg("indexOf", &args, 1)?;
    let start = if args.len() > 2 {
        number_arg("indexOf", &args, 2)?
    } else {
        0.0
    };
    let start = clamp_index(start, s.chars().count());
    let offset = s.char_indices().nth(start).map_or(s.len(), |(byte, _)| byte);
    let found = s[offset..]
        .find(needle)
        .map_or(-1.0, |byte| s[..offset + byte].chars().count() as f64);
    Ok(Value::Number(found))
});

builtin!(sub_str_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("subStr", &args, 3, 3)?;
    let s = string_arg("subStr", &args, 0)?;
    let len = s.chars().count();
    let start = clamp_index(number_arg("subStr", &args, 1)?, len);
    let end = clamp_index(number_arg("subStr", &args, 2)?, len);
    Ok(Value::String(char_slice(s, start.min(end), start.max(end))))
});

builtin!(parse_int_fn, |args: Vec<Value>, _env: &Env| -> EvalResult<Value> {
    expect_arity("parseInt", &args, 1, 2)?;
    let s = string_arg("parseInt", &args, 0)?;
    let radix = if args.len() > 1 {
        number_arg("parseInt", &args, 1)?
    } else {
        0.0
    };
    Ok(Value::Number(parse_int(s, radix)))
});

/// Integer prefix of `text` in `radix`; radix 0 means decimal unless the text starts with `0x`.
fn parse_int(text: &str, radix: f64) -> f64 {
    let mut s = text.trim_start();
    let mut sign = 1.0;
    if let Some(rest) = s.strip_prefix('-') {
        sign = -1.0;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    let mut radix = if radix.is_nan() { 0 } else { radix.trunc() as i64 };
    if radix == 0 || radix == 16 {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = rest;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }

    let radix = radix as u32;
    let mut digits = 0;
    let mut value = 0.0;
    for digit in s.chars().map_while(|c| c.to_digit(radix)) {
        value = value * radix as f64 + digit as f64;
        digits += 1;
    }
    if digits == 0 {
        f64::NAN
    } else {
        sign * value
    }
}

/// Seeds `env` with the global constants and every native function.
pub fn install(env: &Env) -> EvalResult<()> {
    env.declare("SHIELD", Value::Boolean(true), true)?;
    env.declare("HYDRA", Value::Boolean(false), true)?;
    env.declare("null", Value::Null, true)?;

    let natives = [
        ("vision", vision_fn()),
        ("assertEqual", assert_equal_fn()),
        ("typeOf", type_of_fn()),
        ("time", time_fn()),
        ("rand", rand_fn()),
        ("abs", abs_fn()),
        ("floor", floor_fn()),
        ("ceil", ceil_fn()),
        ("round", round_fn()),
        ("sqrt", sqrt_fn()),
        ("sin", sin_fn()),
        ("cos", cos_fn()),
        ("tan", tan_fn()),
        ("iSin", isin_fn()),
        ("iCos", icos_fn()),
        ("iTan", itan_fn()),
        ("min", min_fn()),
        ("max", max_fn()),
        ("pow", pow_fn()),
        ("len", len_fn()),
        ("charAt", char_at_fn()),
        ("concat", concat_fn()),
        ("toLowerCase", to_lower_case_fn()),
        ("toUpperCase", to_upper_case_fn()),
        ("trim", trim_fn()),
        ("indexOf", index_of_fn()),
        ("subStr", sub_str_fn()),
        ("parseInt", parse_int_fn()),
    ];
    for (name, native) in natives {
        env.declare(name, native, true)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::eval::call_value;
    use pretty_assertions::assert_eq;

    fn call(name: &str, args: Vec<Value>) -> EvalResult<Value> {
        let env = Env::new(Config::default());
        install(&env).unwrap();
        let native = env.lookup(name).unwrap();
        call_value(&native, args, &env)
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn text(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn globals_are_constant() {
        let env = Env::new(Config::default());
        install(&env).unwrap();
        assert_eq!(env.lookup("SHIELD").unwrap(), Value::Boolean(true));
        assert_eq!(env.lookup("HYDRA").unwrap(), Value::Boolean(false));
        let err = env.assign("vision", Value::Null).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ConstReassignment("vision".into()));
    }

    #[test]
    fn math() {
        assert_eq!(call("abs", vec![num(-3.0)]).unwrap(), num(3.0));
        assert_eq!(call("round", vec![num(2.5)]).unwrap(), num(3.0));
        assert_eq!(call("round", vec![num(-2.5)]).unwrap(), num(-2.0));
        assert_eq!(call("max", vec![num(1.0), num(4.0)]).unwrap(), num(4.0));
        assert_eq!(call("pow", vec![num(2.0), num(10.0)]).unwrap(), num(1024.0));
        assert_eq!(call("iTan", vec![num(0.0)]).unwrap(), num(0.0));
    }

    #[test]
    fn arity_and_types_are_checked() {
        assert_eq!(
            call("sqrt", vec![]).unwrap_err().kind,
            ErrorKind::ArityMismatch {
                name: "sqrt".into(),
                expected: 1,
                found: 0
            }
        );
        assert_eq!(
            call("concat", vec![text("a"), text("b"), text("c"), text("d")])
                .unwrap_err()
                .kind,
            ErrorKind::ArityMismatch {
                name: "concat".into(),
                expected: 3,
                found: 4
            }
        );
        assert!(matches!(
            call("floor", vec![text("1")]).unwrap_err().kind,
            ErrorKind::TypeError(_)
        ));
    }

    #[test]
    fn type_of_reports_runtime_types() {
        assert_eq!(call("typeOf", vec![num(1.0)]).unwrap(), text("number"));
        assert_eq!(call("typeOf", vec![Value::Null]).unwrap(), text("null"));
        assert_eq!(call("typeOf", vec![abs_fn()]).unwrap(), text("function"));
        assert_eq!(
            call("typeOf", vec![Value::array("t", vec![])]).unwrap(),
            text("array")
        );
    }

    #[test]
    fn string_helpers() {
        assert_eq!(call("len", vec![text("héllo")]).unwrap(), num(5.0));
        assert_eq!(call("charAt", vec![text("abc"), num(1.0)]).unwrap(), text("b"));
        assert_eq!(call("charAt", vec![text("abc"), num(9.0)]).unwrap(), text(""));
        assert_eq!(call("concat", vec![text("a"), text("b")]).unwrap(), text("a b"));
        assert_eq!(
            call("concat", vec![text("a"), text("b"), text("-")]).unwrap(),
            text("a-b")
        );
        assert_eq!(call("trim", vec![text("  x ")]).unwrap(), text("x"));
        assert_eq!(call("toUpperCase", vec![text("aB")]).unwrap(), text("AB"));
    }

    #[test]
    fn index_of_counts_characters() {
        assert_eq!(call("indexOf", vec![text("banana"), text("na")]).unwrap(), num(2.0));
        assert_eq!(
            call("indexOf", vec![text("banana"), text("na"), num(3.0)]).unwrap(),
            num(4.0)
        );
        assert_eq!(call("indexOf", vec![text("héllo"), text("l")]).unwrap(), num(2.0));
        assert_eq!(call("indexOf", vec![text("abc"), text("z")]).unwrap(), num(-1.0));
    }

    #[test]
    fn sub_str_clamps_and_swaps() {
        assert_eq!(
            call("subStr", vec![text("avenger"), num(1.0), num(4.0)]).unwrap(),
            text("ven")
        );
        assert_eq!(
            call("subStr", vec![text("avenger"), num(4.0), num(1.0)]).unwrap(),
            text("ven")
        );
        assert_eq!(
            call("subStr", vec![text("avenger"), num(-2.0), num(100.0)]).unwrap(),
            text("avenger")
        );
    }

    #[test]
    fn parse_int_reads_a_prefix() {
        assert_eq!(parse_int("  42px", 0.0), 42.0);
        assert_eq!(parse_int("-17", 10.0), -17.0);
        assert_eq!(parse_int("ff", 16.0), 255.0);
        assert_eq!(parse_int("0x1A", 0.0), 26.0);
        assert_eq!(parse_int("101", 2.0), 5.0);
        assert!(parse_int("abc", 10.0).is_nan());
        assert!(parse_int("1", 40.0).is_nan());
        assert_eq!(call("parseInt", vec![text("7.9")]).unwrap(), num(7.0));
    }

    #[test]
    fn assert_equal() {
        assert_eq!(call("assertEqual", vec![num(2.0), num(2.0)]).unwrap(), Value::Boolean(true));
        assert_eq!(
            call("assertEqual", vec![text("a"), text("b")]).unwrap_err().kind,
            ErrorKind::AssertionFailed {
                expected: "b".into(),
                actual: "a".into()
            }
        );
        assert!(matches!(
            call("assertEqual", vec![num(1.0), text("1")]).unwrap_err().kind,
            ErrorKind::Native { .. }
        ));
    }

    #[test]
    fn vision_rejects_arrays() {
        assert_eq!(call("vision", vec![text("hi"), num(1.0)]).unwrap(), Value::Null);
        assert!(call("vision", vec![Value::array("t", vec![])]).is_err());
    }
}
