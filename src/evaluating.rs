use crate::builtins::{self, Builtin};
use crate::error_handling::EvalError;
use crate::parsing::*;
use crate::symbols::*;
use std::fmt;

/// Nested calls of defined functions allowed before giving up.
pub const MAX_CALL_DEPTH: usize = 64;

/// Levels of nesting allowed across a whole evaluation, calls included.
pub const MAX_NESTING: usize = 2 * MAX_DEPTH;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    number(f64),
    /// An integer meant to be displayed in the given radix, from `bin`, `hex`, `oct` or `dec`.
    integer { value: i64, radix: u32 },
}

impl Value {
    pub fn to_f64(self) -> f64 {
        match self {
            Value::number(value) => value,
            Value::integer{value, ..} => value as f64,
        }
    }
}

/// Formats a number the way results are shown: integral values without a
/// fraction, very large or small magnitudes in exponent notation.
pub fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 {
        "0".into()
    } else if !value.is_finite() {
        value.to_string()
    } else if magnitude >= 1e16 || magnitude < 1e-5 {
        format!("{:e}", value)
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::number(value) => write!(f, "{}", format_number(value)),
            Value::integer{value, radix} => {
                let sign = if value < 0 { "-" } else { "" };
                let magnitude = value.unsigned_abs();
                match radix {
                    2 => write!(f, "{sign}{magnitude:b}"),
                    8 => write!(f, "{sign}{magnitude:o}"),
                    16 => write!(f, "{sign}{magnitude:x}"),
                    _ => write!(f, "{value}"),
                }
            },
        }
    }
}

struct Scope<'a> {
    symbols: &'a SymbolTable,
    argument: Option<f64>,
    depth: usize,
}

impl Scope<'_> {
    fn resolve(&self, name: &str) -> Result<f64, EvalError> {
        if let (Some(argument), FREE_VARIABLE) = (self.argument, name) {
            return Ok(argument);
        }
        match builtins::lookup(name) {
            Some(Builtin::constant(value)) => return Ok(*value),
            Some(Builtin::function{..}) => return Err(EvalError::not_a_value(name.into())),
            None => {},
        }
        if let Some(value) = self.symbols.variable(name) {
            Ok(value)
        } else if name == LAST_ANSWER {
            Ok(self.symbols.last_answer())
        } else if self.symbols.function(name).is_some() {
            Err(EvalError::not_a_value(name.into()))
        } else {
            Err(EvalError::undefined(name.into()))
        }
    }

    fn call(&self, name: &str, arguments: &[Expr], level: usize) -> Result<Value, EvalError> {
        let values = arguments
            .iter()
            .map(|argument| self.evaluate(argument, level).map(Value::to_f64))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(builtin) = builtins::lookup(name) {
            return builtin.call(name, &values);
        }
        if let Some(function) = self.symbols.function(name) {
            if values.len() != 1 {
                return Err(EvalError::wrong_arity{name: name.into(), expected: "1".into(), found: values.len()});
            }
            return self.enter(name, function, values[0], level);
        }
        if self.symbols.variable(name).is_some() || name == LAST_ANSWER {
            Err(EvalError::not_callable(name.into()))
        } else {
            Err(EvalError::undefined(name.into()))
        }
    }

    fn enter(&self, name: &str, function: &DefinedFunction, input: f64, level: usize) -> Result<Value, EvalError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(EvalError::recursion_limit(name.into()));
        }
        let scope = Scope {
            symbols: self.symbols,
            argument: Some(input),
            depth: self.depth + 1,
        };
        scope.evaluate(&function.body()?, level)
    }

    fn evaluate(&self, expression: &Expr, level: usize) -> Result<Value, EvalError> {
        if level >= MAX_NESTING {
            return Err(EvalError::too_deep);
        }
        let level = level + 1;
        match expression {
            Expr::number(value) => Ok(Value::number(*value)),
            Expr::identifier(name) => self.resolve(name).map(Value::number),
            Expr::unary(operator, operand) => {
                let value = self.evaluate(operand, level)?.to_f64();
                Ok(Value::number(operator.call(value)))
            },
            Expr::binary(operator, left, right) => {
                let left = self.evaluate(left, level)?.to_f64();
                let right = self.evaluate(right, level)?.to_f64();
                operator.call(left, right).map(Value::number)
            },
            Expr::call(name, arguments) => self.call(name, arguments, level),
        }
    }
}

/// Evaluates an expression against the built-ins and the session's symbols.
pub fn evaluate(expression: &Expr, symbols: &SymbolTable) -> Result<Value, EvalError> {
    let scope = Scope {
        symbols,
        argument: None,
        depth: 0,
    };
    scope.evaluate(expression, 0)
}

/// Calls a defined function with `x` bound to `input`.
///
/// Variables are looked up when the call happens, so reassigning one changes
/// what every function that mentions it returns.
pub fn apply(name: &str, function: &DefinedFunction, input: f64, symbols: &SymbolTable) -> Result<Value, EvalError> {
    let scope = Scope {
        symbols,
        argument: None,
        depth: 0,
    };
    scope.enter(name, function, input, 0)
}
