use crate::error_handling::EvalError;
use crate::evaluating::Value;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::f64::consts;
use std::ops::RangeInclusive;

pub type Action = fn(&[f64]) -> Result<Value, EvalError>;

pub enum Builtin {
    constant(f64),
    function {
        arity: RangeInclusive<usize>,
        action: Action,
    },
}

fn number(value: f64) -> Result<Value, EvalError> {
    Ok(Value::number(value))
}

fn checked(name: &str, value: f64) -> Result<Value, EvalError> {
    if value.is_nan() {
        Err(EvalError::domain(name.into()))
    } else {
        number(value)
    }
}

fn integral(name: &str, value: f64) -> Result<i64, EvalError> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(EvalError::domain(name.into()))
    }
}

fn inverse_trig(name: &str, value: f64, action: fn(f64) -> f64) -> Result<Value, EvalError> {
    if (-1.0..=1.0).contains(&value) {
        number(action(value))
    } else {
        Err(EvalError::domain(name.into()))
    }
}

fn logarithm(name: &str, args: &[f64]) -> Result<Value, EvalError> {
    let value = args[0];
    if value <= 0.0 {
        return Err(EvalError::domain(name.into()));
    }
    match args.get(1) {
        None => number(value.ln()),
        Some(&base) if base <= 0.0 => Err(EvalError::domain(name.into())),
        Some(&base) if base == 1.0 => Err(EvalError::division_by_zero),
        Some(&base) => number(value.ln() / base.ln()),
    }
}

fn factorial(value: f64) -> Result<Value, EvalError> {
    let n = integral("fact", value)?;
    if n < 0 {
        return Err(EvalError::domain("fact".into()));
    }
    // 171! is past f64::MAX
    if n > 170 {
        return number(f64::INFINITY);
    }
    number((2..=n).fold(1.0, |product, k| product * k as f64))
}

fn in_radix(name: &str, value: f64, radix: u32) -> Result<Value, EvalError> {
    let value = integral(name, value.trunc())?;
    Ok(Value::integer{value, radix})
}

fn unary(action: Action) -> Builtin {
    Builtin::function{arity: 1..=1, action}
}

fn binary(action: Action) -> Builtin {
    Builtin::function{arity: 2..=2, action}
}

lazy_static! {
    static ref BUILTINS: HashMap<&'static str, Builtin> = {
        use Builtin::*;

        HashMap::from([
            ("sin", unary(|args| number(args[0].sin()))),
            ("cos", unary(|args| number(args[0].cos()))),
            ("tan", unary(|args| number(args[0].tan()))),
            ("asin", unary(|args| inverse_trig("asin", args[0], f64::asin))),
            ("acos", unary(|args| inverse_trig("acos", args[0], f64::acos))),
            ("atan", unary(|args| number(args[0].atan()))),
            ("log", function{arity: 1..=2, action: |args| logarithm("log", args)}),
            ("ln", function{arity: 1..=2, action: |args| logarithm("ln", args)}),
            ("sqrt", unary(|args| if args[0] < 0.0 {
                Err(EvalError::domain("sqrt".into()))
            } else {
                number(args[0].sqrt())
            })),
            ("exp", unary(|args| number(args[0].exp()))),
            ("pi", constant(consts::PI)),
            ("e", constant(consts::E)),
            ("pow", binary(|args| checked("pow", args[0].powf(args[1])))),
            ("root", binary(|args| if args[1] == 0.0 {
                Err(EvalError::division_by_zero)
            } else {
                checked("root", args[0].powf(1.0 / args[1]))
            })),
            ("fact", unary(|args| factorial(args[0]))),
            ("bin", unary(|args| in_radix("bin", args[0], 2))),
            ("hex", unary(|args| in_radix("hex", args[0], 16))),
            ("oct", unary(|args| in_radix("oct", args[0], 8))),
            ("dec", unary(|args| integral("dec", args[0]).map(|value| Value::integer{value, radix: 10}))),
            ("deg", unary(|args| number(args[0].to_degrees()))),
            ("rad", unary(|args| number(args[0].to_radians()))),
        ])
    };
}

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.get(name)
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains_key(name)
}

impl Builtin {
    pub fn call(&self, name: &str, arguments: &[f64]) -> Result<Value, EvalError> {
        match self {
            Builtin::constant(_) => Err(EvalError::not_callable(name.into())),
            Builtin::function{arity, action} => {
                if !arity.contains(&arguments.len()) {
                    let expected = if arity.start() == arity.end() {
                        arity.start().to_string()
                    } else {
                        format!("{} to {}", arity.start(), arity.end())
                    };
                    return Err(EvalError::wrong_arity{name: name.into(), expected, found: arguments.len()});
                }
                action(arguments)
            },
        }
    }
}
