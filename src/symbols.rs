use crate::error_handling::EvalError;
use crate::parsing::{self, Expr};
use std::collections::HashMap;

/// Free variable of every defined function.
pub const FREE_VARIABLE: &str = "x";

/// Token that stands for the last answer.
pub const LAST_ANSWER: &str = "ans";

/// A user function of `x`, kept as the text it was defined with.
///
/// The text is only parsed when the function is called, so a body with a
/// syntax error is still stored and fails on every call.
#[derive(Clone, Debug, PartialEq)]
pub struct DefinedFunction {
    pub source: String,
}

impl DefinedFunction {
    pub fn new(source: &str) -> Self {
        Self{source: source.into()}
    }

    pub fn body(&self) -> Result<Expr, EvalError> {
        parsing::parse(&self.source)
    }
}

/// Variables, defined functions and the last answer of one session.
///
/// A name lives in at most one of the two tables: storing it in one removes
/// it from the other.
#[derive(Default, Debug)]
pub struct SymbolTable {
    variables: HashMap<String, f64>,
    functions: HashMap<String, DefinedFunction>,
    last_answer: Option<f64>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    pub fn function(&self, name: &str) -> Option<&DefinedFunction> {
        self.functions.get(name)
    }

    pub fn set_variable(&mut self, name: &str, value: f64) {
        self.functions.remove(name);
        self.variables.insert(name.into(), value);
    }

    pub fn define_function(&mut self, name: &str, function: DefinedFunction) {
        self.variables.remove(name);
        self.functions.insert(name.into(), function);
    }

    /// The last answer, `0` until something has been evaluated.
    pub fn last_answer(&self) -> f64 {
        self.last_answer.unwrap_or(0.0)
    }

    pub fn set_last_answer(&mut self, value: f64) {
        self.last_answer = Some(value);
    }

    /// Forgets every variable and defined function. The last answer survives.
    pub fn clear(&mut self) {
        self.variables.clear();
        self.functions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> DefinedFunction {
        DefinedFunction::new("x*x")
    }

    #[test]
    fn names_move_between_tables() {
        let mut symbols = SymbolTable::new();
        symbols.define_function("f", square());
        symbols.set_variable("f", 2.0);
        assert_eq!(symbols.variable("f"), Some(2.0));
        assert!(symbols.function("f").is_none());

        symbols.define_function("f", square());
        assert_eq!(symbols.variable("f"), None);
        assert_eq!(symbols.function("f"), Some(&square()));
    }

    #[test]
    fn clear_keeps_the_last_answer() {
        let mut symbols = SymbolTable::new();
        assert_eq!(symbols.last_answer(), 0.0);
        symbols.set_variable("a", 1.0);
        symbols.set_last_answer(4.0);
        symbols.clear();
        assert!(symbols.is_empty());
        assert_eq!(symbols.last_answer(), 4.0);
    }

    #[test]
    fn broken_bodies_are_kept_and_fail_when_parsed() {
        let mut symbols = SymbolTable::new();
        symbols.define_function("g", DefinedFunction::new("x +"));
        let stored = symbols.function("g").unwrap();
        assert_eq!(stored.source, "x +");
        assert_eq!(stored.body(), Err(EvalError::abrupt_end));
        assert!(square().body().unwrap().mentions(FREE_VARIABLE));
    }
}
