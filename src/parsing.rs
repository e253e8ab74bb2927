use crate::error_handling::EvalError;
use crate::scanning::*;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UnaryOperator {
    negative,
    positive,
}

impl UnaryOperator {
    pub fn call(&self, value: f64) -> f64 {
        use UnaryOperator::*;
        match self {
            positive => value,
            negative => -value,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidOperator;

impl FromStr for UnaryOperator {
    type Err = InvalidOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use UnaryOperator::*;
        match s {
            "+" => Ok(positive),
            "-" => Ok(negative),
            _ => Err(InvalidOperator),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BinaryOperator {
    addition,
    subtraction,
    multiplication,
    division,
    modulo,
    exponentiation,
}

impl BinaryOperator {
    pub fn call(&self, left: f64, right: f64) -> Result<f64, EvalError> {
        use BinaryOperator::*;

        let value = match self {
            addition => left + right,
            subtraction => left - right,
            multiplication => left * right,
            division if right == 0.0 => return Err(EvalError::division_by_zero),
            division => left / right,
            modulo if right == 0.0 => return Err(EvalError::division_by_zero),
            modulo => left - right * (left / right).floor(),
            exponentiation if left == 0.0 && right < 0.0 => return Err(EvalError::division_by_zero),
            exponentiation => left.powf(right),
        };

        if value.is_nan() && !left.is_nan() && !right.is_nan() {
            Err(EvalError::domain(self.symbol().into()))
        } else {
            Ok(value)
        }
    }

    fn symbol(&self) -> &'static str {
        use BinaryOperator::*;
        match self {
            addition => "+",
            subtraction => "-",
            multiplication => "*",
            division => "/",
            modulo => "%",
            exponentiation => "^",
        }
    }
}

impl FromStr for BinaryOperator {
    type Err = InvalidOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use BinaryOperator::*;
        match s {
            "+" => Ok(addition),
            "-" => Ok(subtraction),
            "*" => Ok(multiplication),
            "/" => Ok(division),
            "%" => Ok(modulo),
            "^" | "**" => Ok(exponentiation),
            _ => Err(InvalidOperator),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operator {
    unary(UnaryOperator),
    binary(BinaryOperator),
}

/// A parsed arithmetic expression. Identifiers stay unresolved until evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    number(f64),
    identifier(String),
    unary(UnaryOperator, Box<Expr>),
    binary(BinaryOperator, Box<Expr>, Box<Expr>),
    call(String, Vec<Expr>),
}

impl Expr {
    /// Whether `name` appears anywhere as a bare identifier.
    pub fn mentions(&self, name: &str) -> bool {
        match self {
            Expr::number(_) => false,
            Expr::identifier(identifier) => identifier == name,
            Expr::unary(_, operand) => operand.mentions(name),
            Expr::binary(_, left, right) => left.mentions(name) || right.mentions(name),
            Expr::call(_, arguments) => arguments.iter().any(|argument| argument.mentions(name)),
        }
    }
}

enum StackNode {
    operator(Operator),
    paren,
    call { name: String, count: usize },
}

impl StackNode {
    fn precedence(&self) -> i32 {
        use BinaryOperator::*;
        use Operator::*;
        match self {
            Self::paren | Self::call{..} => 0,
            Self::operator(binary(operator)) =>
                match operator {
                    addition | subtraction => 1,
                    multiplication | division | modulo => 2,
                    exponentiation => 4,
                },
            Self::operator(unary(_)) => 3,
        }
    }
}

pub fn parse_number(content: &str) -> Result<f64, EvalError> {
    let invalid = || EvalError::invalid_number(content.into());
    let radix = match content.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return content.parse().map_err(|_| invalid()),
    };
    i64::from_str_radix(&content[2..], radix).map(|value| value as f64).map_err(|_| invalid())
}

/// Deepest tree the parser will build.
pub const MAX_DEPTH: usize = 1000;

/// Operands waiting for an operator, each with the depth of its tree.
struct Yard {
    output: Vec<(Expr, usize)>,
    stack: Vec<StackNode>,
}

impl Yard {
    fn new() -> Self {
        Self{output: Vec::new(), stack: Vec::new()}
    }

    fn add_number(&mut self, content: &str) -> Result<(), EvalError> {
        self.output.push((Expr::number(parse_number(content)?), 1));
        Ok(())
    }

    fn pop_operand(&mut self) -> Result<(Box<Expr>, usize), EvalError> {
        let (operand, depth) = self.output.pop().ok_or(EvalError::abrupt_end)?;
        Ok((Box::new(operand), depth))
    }

    fn push_node(&mut self, node: Expr, depth: usize) -> Result<(), EvalError> {
        if depth > MAX_DEPTH {
            return Err(EvalError::too_deep);
        }
        self.output.push((node, depth));
        Ok(())
    }

    fn apply(&mut self, operator: Operator) -> Result<(), EvalError> {
        match operator {
            Operator::unary(operator) => {
                let (operand, depth) = self.pop_operand()?;
                self.push_node(Expr::unary(operator, operand), depth + 1)
            },
            Operator::binary(operator) => {
                let (right, right_depth) = self.pop_operand()?;
                let (left, left_depth) = self.pop_operand()?;
                self.push_node(Expr::binary(operator, left, right), left_depth.max(right_depth) + 1)
            },
        }
    }

    fn pop_higher_operator(&mut self, precedence: i32) -> Option<Operator> {
        // exponentiation is right associative
        let pops = |node: &&StackNode| {
            let top = node.precedence();
            top > precedence || (top == precedence && precedence != 4)
        };
        if self.stack.last().filter(pops).is_some() {
            match self.stack.pop() {
                Some(StackNode::operator(operator)) => Some(operator),
                _ => None,
            }
        } else {
            None
        }
    }

    fn add_binary(&mut self, content: &str) -> Result<(), EvalError> {
        let operator = content.parse().map_err(|_| EvalError::invalid_operator(content.into()))?;
        let node = StackNode::operator(Operator::binary(operator));

        let precedence = node.precedence();
        while let Some(operator) = self.pop_higher_operator(precedence) {
            self.apply(operator)?;
        }
        self.stack.push(node);
        Ok(())
    }

    fn add_unary(&mut self, content: &str) -> Result<(), EvalError> {
        let operator = content.parse().map_err(|_| EvalError::invalid_operator(content.into()))?;
        self.stack.push(StackNode::operator(Operator::unary(operator)));
        Ok(())
    }

    fn add_left_paren(&mut self) {
        self.stack.push(StackNode::paren);
    }

    /// Turns the identifier just pushed into the head of a call.
    fn add_call(&mut self) -> Result<(), EvalError> {
        match self.output.pop() {
            Some((Expr::identifier(name), _)) => {
                self.stack.push(StackNode::call{name, count: 1});
                Ok(())
            },
            _ => Err(EvalError::did_not_expect("(".into())),
        }
    }

    fn close_call(&mut self, name: String, count: usize) -> Result<(), EvalError> {
        if self.output.len() < count {
            return Err(EvalError::abrupt_end);
        }
        let arguments = self.output.split_off(self.output.len() - count);
        let depth = arguments.iter().map(|(_, depth)| *depth).max().unwrap_or(0) + 1;
        let arguments = arguments.into_iter().map(|(argument, _)| argument).collect();
        self.push_node(Expr::call(name, arguments), depth)
    }

    fn add_right_paren(&mut self) -> Result<(), EvalError> {
        while let Some(stack_node) = self.stack.pop() {
            match stack_node {
                StackNode::paren => return Ok(()),
                StackNode::call{name, count} => return self.close_call(name, count),
                StackNode::operator(operator) => self.apply(operator)?,
            }
        }
        Err(EvalError::could_not_find("(".into()))
    }

    /// `f()` closes a call before any argument was pushed.
    fn add_empty_call(&mut self) -> Result<(), EvalError> {
        match self.stack.pop() {
            Some(StackNode::call{name, ..}) => self.close_call(name, 0),
            _ => Err(EvalError::did_not_expect(")".into())),
        }
    }

    fn add_comma(&mut self) -> Result<(), EvalError> {
        loop {
            match self.stack.last_mut() {
                Some(StackNode::call{count, ..}) => {
                    *count += 1;
                    return Ok(());
                },
                Some(StackNode::operator(_)) => {
                    if let Some(StackNode::operator(operator)) = self.stack.pop() {
                        self.apply(operator)?;
                    }
                },
                _ => return Err(EvalError::did_not_expect(",".into())),
            }
        }
    }

    fn finish(mut self) -> Result<Expr, EvalError> {
        while let Some(stack_node) = self.stack.pop() {
            match stack_node {
                StackNode::operator(operator) => self.apply(operator)?,
                _ => return Err(EvalError::could_not_find(")".into())),
            }
        }
        let (expression, _) = self.output.pop().ok_or(EvalError::abrupt_end)?;
        if self.output.is_empty() {
            Ok(expression)
        } else {
            Err(EvalError::abrupt_end)
        }
    }
}

fn handle_edge(yard: &mut Yard, token: &Token, after_call: bool) -> Result<bool, EvalError> {
    use TokenKind::*;
    match token.kind {
        number => {
            yard.add_number(&token.content)?;
            Ok(true)
        },
        identifier => {
            yard.output.push((Expr::identifier(token.content.clone()), 1));
            Ok(true)
        },
        operator => {
            yard.add_unary(&token.content)?;
            Ok(false)
        },
        punctuation => {
            match token.content.as_str() {
                "(" => yard.add_left_paren(),
                ")" if after_call => {
                    yard.add_empty_call()?;
                    return Ok(true);
                },
                other => return Err(EvalError::did_not_expect(other.into())),
            }
            Ok(false)
        },
    }
}

fn handle_middle(yard: &mut Yard, token: &Token, after_identifier: bool) -> Result<bool, EvalError> {
    use TokenKind::*;
    match token.kind {
        operator => {
            yard.add_binary(&token.content)?;
            Ok(true)
        },
        punctuation => {
            match token.content.as_str() {
                ")" => {
                    yard.add_right_paren()?;
                    Ok(false)
                },
                "," => {
                    yard.add_comma()?;
                    Ok(true)
                },
                "(" if after_identifier => {
                    yard.add_call()?;
                    Ok(true)
                },
                other => Err(EvalError::did_not_expect(other.into())),
            }
        },
        number | identifier => Err(EvalError::did_not_expect(token.content.clone())),
    }
}

/// Parses an arithmetic expression into a tree with the shunting-yard algorithm.
pub fn parse(expression_string: &str) -> Result<Expr, EvalError> {
    let mut source = StringScanner::new(expression_string)?;

    let mut is_edge = true;
    let mut previous: Option<Token> = None;
    let mut yard = Yard::new();

    while let Some(token) = source.get_current() {
        let token = token.clone();
        if is_edge {
            let after_call = previous.as_ref().is_some_and(|previous| previous.is(TokenKind::punctuation, "("))
                && matches!(yard.stack.last(), Some(StackNode::call{..}));
            if handle_edge(&mut yard, &token, after_call)? {
                is_edge = false;
            }
        } else {
            let after_identifier = previous.as_ref().is_some_and(|previous| previous.kind == TokenKind::identifier);
            if handle_middle(&mut yard, &token, after_identifier)? {
                is_edge = true;
            }
        }
        previous = Some(token);
        source.advance()?;
    }

    if is_edge {
        return Err(EvalError::abrupt_end);
    }
    yard.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use BinaryOperator::*;

    fn number(value: f64) -> Box<Expr> {
        Box::new(Expr::number(value))
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse("1 + 2 * 3").unwrap(),
            Expr::binary(addition, number(1.0), Box::new(Expr::binary(multiplication, number(2.0), number(3.0))))
        );
    }

    #[test]
    fn exponentiation_is_right_associative() {
        assert_eq!(
            parse("2 ^ 3 ** 2").unwrap(),
            Expr::binary(exponentiation, number(2.0), Box::new(Expr::binary(exponentiation, number(3.0), number(2.0))))
        );
    }

    #[test]
    fn negation_applies_after_exponentiation() {
        assert_eq!(
            parse("-2^2").unwrap(),
            Expr::unary(UnaryOperator::negative, Box::new(Expr::binary(exponentiation, number(2.0), number(2.0))))
        );
        assert_eq!(
            parse("2^-1").unwrap(),
            Expr::binary(exponentiation, number(2.0), Box::new(Expr::unary(UnaryOperator::negative, number(1.0))))
        );
    }

    #[test]
    fn calls_collect_their_arguments() {
        assert_eq!(
            parse("pow(2, 1 + 1)").unwrap(),
            Expr::call("pow".into(), vec![
                Expr::number(2.0),
                Expr::binary(addition, number(1.0), number(1.0)),
            ])
        );
        assert_eq!(parse("f()").unwrap(), Expr::call("f".into(), vec![]));
        assert_eq!(
            parse("sin(cos(0))").unwrap(),
            Expr::call("sin".into(), vec![Expr::call("cos".into(), vec![Expr::number(0.0)])])
        );
    }

    #[test]
    fn parentheses_group() {
        assert_eq!(
            parse("(1 + 2) * x").unwrap(),
            Expr::binary(
                multiplication,
                Box::new(Expr::binary(addition, number(1.0), number(2.0))),
                Box::new(Expr::identifier("x".into())),
            )
        );
    }

    #[test]
    fn reports_malformed_input() {
        assert_eq!(parse("1 +"), Err(EvalError::abrupt_end));
        assert_eq!(parse(""), Err(EvalError::abrupt_end));
        assert_eq!(parse("(1 + 2"), Err(EvalError::could_not_find(")".into())));
        assert_eq!(parse("1 + 2)"), Err(EvalError::could_not_find("(".into())));
        assert_eq!(parse("2 3"), Err(EvalError::did_not_expect("3".into())));
        assert_eq!(parse("1, 2"), Err(EvalError::did_not_expect(",".into())));
        assert_eq!(parse("1.2.3"), Err(EvalError::invalid_number("1.2.3".into())));
        assert_eq!(parse("2 (3)"), Err(EvalError::did_not_expect("(".into())));
    }

    #[test]
    fn rejects_trees_nested_too_deeply() {
        let negations = "-".repeat(100_000) + "1";
        assert_eq!(parse(&negations), Err(EvalError::too_deep));
        let sum = vec!["1"; 60_000].join("+");
        assert_eq!(parse(&sum), Err(EvalError::too_deep));
        let calls = "sin(".repeat(5_000) + "0" + &")".repeat(5_000);
        assert_eq!(parse(&calls), Err(EvalError::too_deep));

        let powers = vec!["1"; MAX_DEPTH].join("^");
        assert!(parse(&powers).is_ok());
        let parens = "(".repeat(10_000) + "1" + &")".repeat(10_000);
        assert_eq!(parse(&parens), Ok(Expr::number(1.0)));
    }

    #[test]
    fn mentions_finds_whole_identifiers_only() {
        assert!(parse("x * 2").unwrap().mentions("x"));
        assert!(parse("max(x, 1)").unwrap().mentions("x"));
        assert!(!parse("exp(1)").unwrap().mentions("x"));
    }

    #[test]
    fn radix_literals() {
        assert_eq!(parse_number("0x1f"), Ok(31.0));
        assert_eq!(parse_number("0b101"), Ok(5.0));
        assert_eq!(parse_number("0o17"), Ok(15.0));
        assert_eq!(parse_number("0xzz"), Err(EvalError::invalid_number("0xzz".into())));
    }
}
