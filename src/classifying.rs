use crate::builtins;
use crate::converting::{self, Amount, ConversionRequest};
use crate::error_handling::*;
use crate::evaluating::{self, format_number, Value};
use crate::exchanging::RateSource;
use crate::inverting;
use crate::parsing;
use crate::plotting::{self, Plotter};
use crate::symbols::*;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use std::fmt;

const EVALUATE_USAGE: &str = "evaluate <function> for <x|y> == <value>";
const GRAPH_USAGE: &str = "graph <function>";

/// Names that would be shadowed by the request syntax itself.
const RESERVED: [&str; 4] = [FREE_VARIABLE, LAST_ANSWER, "evaluate", "graph"];

lazy_static! {
    static ref NAME_PATTERN: Regex =
        Regex::new(r"^(?P<name>[a-zA-Z_][a-zA-Z0-9_ ]*?)\s*(?P<parameter>\(\s*x\s*\))?$").unwrap();
    static ref MENTIONS_X: Regex = Regex::new(r"\bx\b").unwrap();
}

/// What an input line asks for, decided before anything is evaluated.
#[derive(Debug, PartialEq)]
pub enum Request<'a> {
    assignment { name: &'a str, rhs: &'a str },
    evaluation(Vec<&'a str>),
    graph(Vec<&'a str>),
    currency { amount: f64, conversion: ConversionRequest<'a> },
    unit { amount: f64, conversion: ConversionRequest<'a> },
    arithmetic(&'a str),
}

fn resolve_operand(token: &str, symbols: &SymbolTable) -> Option<f64> {
    if let Ok(value) = token.parse::<f64>() {
        return Some(value);
    }
    if token == LAST_ANSWER {
        Some(symbols.last_answer())
    } else {
        symbols.variable(token)
    }
}

fn resolve_amount(amount: Amount, symbols: &SymbolTable) -> Option<f64> {
    match amount {
        Amount::literal(literal) => literal.parse().ok(),
        Amount::name(name) => resolve_operand(name, symbols),
    }
}

/// Sorts a trimmed line into a request, trying each kind in a fixed order.
///
/// A conversion whose amount is a name only matches when that name holds a value.
pub fn classify<'a>(line: &'a str, symbols: &SymbolTable) -> Request<'a> {
    if line.contains('=') && !line.contains("==") {
        if let Some((name, rhs)) = line.split_once('=') {
            return Request::assignment{name: name.trim(), rhs: rhs.trim()};
        }
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    match words.first() {
        Some(&"evaluate") => return Request::evaluation(words),
        Some(&"graph") => return Request::graph(words),
        _ => {},
    }

    if let Some(conversion) = converting::match_currency(line) {
        if let Some(amount) = resolve_amount(conversion.amount, symbols) {
            return Request::currency{amount, conversion};
        }
    }
    if let Some(conversion) = converting::match_unit(line) {
        if let Some(amount) = resolve_amount(conversion.amount, symbols) {
            return Request::unit{amount, conversion};
        }
    }
    Request::arithmetic(line)
}

/// The successful outcome of a request.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    value(Value),
    assigned { name: String, value: f64 },
    defined { name: String },
    function_value { name: String, input: f64, output: Value },
    inverted { name: String, input: f64, target: f64 },
    graphed { name: String },
    currency { amount: f64, from: String, to: String, converted: f64 },
    unit { amount: f64, from: String, to: String, converted: f64 },
}

impl Reply {
    /// The number this reply stands for when it is assigned to a variable.
    pub fn number(&self) -> Option<f64> {
        match self {
            Reply::value(value) => Some(value.to_f64()),
            Reply::assigned{value, ..} => Some(*value),
            Reply::function_value{output, ..} => Some(output.to_f64()),
            Reply::inverted{input, ..} => Some(*input),
            Reply::currency{converted, ..} | Reply::unit{converted, ..} => Some(*converted),
            Reply::defined{..} | Reply::graphed{..} => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Reply::value(value) => write!(f, "{value}"),
            Reply::assigned{name, value} => write!(f, "{name} = {}", format_number(*value)),
            Reply::defined{name} => write!(f, "Function '{name}(x)' defined."),
            Reply::function_value{name, input, output} => {
                write!(f, "{name}({}) = {output}", format_number(*input))
            },
            Reply::inverted{name, input, target} => {
                write!(f, "{name}({}) = {}", format_number(*input), format_number(*target))
            },
            Reply::graphed{name} => write!(f, "Graphing {name}(x)"),
            Reply::currency{amount, from, to, converted} => {
                write!(f, "{} {from} = {converted:.2} {to}", format_number(*amount))
            },
            Reply::unit{amount, from, to, converted} => {
                write!(f, "{} {from} = {} {to}", format_number(*amount), format_number(*converted))
            },
        }
    }
}

/// One calculator session: the symbol tables plus the collaborators that
/// fetch exchange rates and draw graphs.
pub struct Session {
    symbols: SymbolTable,
    rates: Box<dyn RateSource>,
    plotter: Box<dyn Plotter>,
}

impl Session {
    pub fn new(rates: Box<dyn RateSource>, plotter: Box<dyn Plotter>) -> Self {
        Self {
            symbols: SymbolTable::new(),
            rates,
            plotter,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Deletes every variable and defined function.
    pub fn clear(&mut self) {
        info!("deleting all variables and functions");
        self.symbols.clear();
    }

    /// Classifies and carries out one line. A failed request leaves the
    /// symbol tables as they were.
    pub fn process(&mut self, line: &str) -> Result<Reply> {
        let line = line.trim();
        let request = classify(line, &self.symbols);
        debug!("{line:?} classified as {request:?}");

        match request {
            Request::assignment{name, rhs} => self.assign(name, rhs),
            Request::evaluation(words) => self.evaluate_function(&words),
            Request::graph(words) => self.graph(&words),
            Request::currency{amount, conversion} => self.convert_currency(amount, conversion),
            Request::unit{amount, conversion} => self.convert_unit(amount, conversion),
            Request::arithmetic(expression) => self.arithmetic(expression),
        }
    }

    fn assign(&mut self, target: &str, rhs: &str) -> Result<Reply> {
        let captures = NAME_PATTERN
            .captures(target)
            .ok_or_else(|| CalcError::invalid_name(target.into()))?;
        let name = captures.name("name").map_or(target, |name| name.as_str());
        if builtins::is_builtin(name) || RESERVED.contains(&name) {
            return Err(CalcError::invalid_name(name.into()));
        }

        // a body that does not parse can still be told apart by a bare x
        let parsed = parsing::parse(rhs);
        let is_function = captures.name("parameter").is_some()
            || match &parsed {
                Ok(body) => body.mentions(FREE_VARIABLE),
                Err(_) => MENTIONS_X.is_match(rhs),
            };

        if is_function {
            if rhs.is_empty() {
                return Err(CalcError::invalid_definition(EvalError::abrupt_end));
            }
            // syntax errors in the body surface when the function is called
            debug!("defining {name}(x) = {rhs}");
            self.symbols.define_function(name, DefinedFunction::new(rhs));
            return Ok(Reply::defined{name: name.into()});
        }

        let value = self.process(rhs)?.number().ok_or(EvalError::not_a_number)?;
        self.symbols.set_variable(name, value);
        Ok(Reply::assigned{name: name.into(), value})
    }

    fn lookup_function(&self, name: &str) -> Result<&DefinedFunction> {
        self.symbols
            .function(name)
            .ok_or_else(|| CalcError::undefined_function(name.into()))
    }

    fn evaluate_function(&mut self, words: &[&str]) -> Result<Reply> {
        let &[_, name, "for", variable, "==", value] = words else {
            return Err(CalcError::invalid_syntax(EVALUATE_USAGE));
        };
        let value = resolve_operand(value, &self.symbols).ok_or(CalcError::invalid_syntax(EVALUATE_USAGE))?;
        let function = self.lookup_function(name)?;

        match variable {
            FREE_VARIABLE => {
                let output = evaluating::apply(name, function, value, &self.symbols)?;
                Ok(Reply::function_value{name: name.into(), input: value, output})
            },
            "y" => {
                let f = |x| evaluating::apply(name, function, x, &self.symbols).map(Value::to_f64);
                match inverting::find_input(f, value) {
                    Some(input) => Ok(Reply::inverted{name: name.into(), input, target: value}),
                    None => Err(CalcError::root_not_found {
                        name: name.into(),
                        target: format_number(value),
                        steps: inverting::MAX_STEPS,
                    }),
                }
            },
            other => Err(CalcError::invalid_variable(other.into())),
        }
    }

    fn graph(&mut self, words: &[&str]) -> Result<Reply> {
        let &[_, name] = words else {
            return Err(CalcError::invalid_syntax(GRAPH_USAGE));
        };
        let function = self.lookup_function(name)?;

        let xs = plotting::sample_points();
        let ys: Vec<f64> = xs
            .iter()
            .map(|x| evaluating::apply(name, function, *x, &self.symbols).map_or(f64::NAN, Value::to_f64))
            .collect();

        self.plotter.plot(name, &xs, &ys);
        Ok(Reply::graphed{name: name.into()})
    }

    fn convert_currency(&mut self, amount: f64, conversion: ConversionRequest) -> Result<Reply> {
        let from = conversion.from.to_ascii_uppercase();
        let to = conversion.to.to_ascii_uppercase();
        match self.rates.rate(&from, &to) {
            Some(rate) => Ok(Reply::currency{amount, from, to, converted: amount * rate}),
            None => Err(CalcError::conversion_unavailable{from, to}),
        }
    }

    fn convert_unit(&mut self, amount: f64, conversion: ConversionRequest) -> Result<Reply> {
        let key = conversion.key();
        let convert = converting::unit_conversion(&key).ok_or(CalcError::unsupported_conversion(key))?;
        Ok(Reply::unit {
            amount,
            from: conversion.from.into(),
            to: conversion.to.into(),
            converted: convert(amount),
        })
    }

    fn arithmetic(&mut self, expression: &str) -> Result<Reply> {
        let tree = parsing::parse(expression)?;
        let value = evaluating::evaluate(&tree, &self.symbols)?;
        self.symbols.set_last_answer(value.to_f64());
        Ok(Reply::value(value))
    }
}
