use crate::error_handling::EvalError;

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    identifier, number, operator, punctuation
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub content: String,
    pub kind: TokenKind,
}

impl Token {
    fn new(content: &str, kind: TokenKind) -> Self {
        Self{content: content.into(), kind}
    }

    pub fn is(&self, kind: TokenKind, content: &str) -> bool {
        self.kind == kind && self.content == content
    }
}

pub trait Scanner {
    fn get_current(&self) -> Option<&Token>;
    fn advance(&mut self) -> Result<(), EvalError>;
}

pub struct StringScanner<'a> {
    string: &'a str,
    token: Option<Token>,
    index: usize,
}

fn is_operator(character: char) -> bool {
    matches!(character, '+' | '-' | '*' | '/' | '^' | '%')
}

fn is_punctuation(character: char) -> bool {
    matches!(character, '(' | ')' | ',')
}

fn is_digit_or_dot(character: char) -> bool {
    character.is_ascii_digit() || character == '.'
}

fn is_identifier_start(character: char) -> bool {
    character.is_ascii_alphabetic() || character == '_'
}

fn is_identifier_part(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '_'
}

impl<'a> StringScanner<'a> {
    pub fn new(string: &'a str) -> Result<Self, EvalError> {
        let mut source = Self {
            string,
            token: None,
            index: 0,
        };
        source.advance()?;
        Ok(source)
    }

    fn count<P: Fn(char) -> bool>(&self, from: usize, predicate: P) -> usize {
        self.string[from..]
            .chars()
            .take_while(|c| predicate(*c))
            .map(char::len_utf8)
            .sum()
    }

    fn view(&self) -> &'a str {
        &self.string[self.index..]
    }

    fn skip_whitespace(&mut self) {
        self.index += self.count(self.index, char::is_whitespace);
    }

    fn get_number(&self) -> Token {
        let view = self.view();
        let radix_prefix = ["0x", "0X", "0o", "0O", "0b", "0B"];
        if radix_prefix.iter().any(|prefix| view.starts_with(prefix)) {
            let count = 2 + self.count(self.index + 2, is_identifier_part);
            return Token::new(&view[..count], TokenKind::number);
        }

        let mut count = self.count(self.index, is_digit_or_dot);
        let rest = &view[count..];
        if rest.starts_with(['e', 'E']) {
            let sign = if rest[1..].starts_with(['+', '-']) { 1 } else { 0 };
            let digits = rest[1 + sign..].chars().take_while(char::is_ascii_digit).count();
            if digits > 0 {
                count += 1 + sign + digits;
            }
        }
        Token::new(&view[..count], TokenKind::number)
    }

    fn get_identifier(&self) -> Token {
        let count = self.count(self.index, is_identifier_part);
        Token::new(&self.view()[..count], TokenKind::identifier)
    }

    fn get_operator(&self) -> Token {
        if self.view().starts_with("**") {
            Token::new("**", TokenKind::operator)
        } else {
            Token::new(&self.view()[..1], TokenKind::operator)
        }
    }

    fn get_token(&self) -> Result<Option<Token>, EvalError> {
        let view = self.view();
        let Some(first) = view.chars().next() else {
            return Ok(None);
        };

        let starts_number = first.is_ascii_digit()
            || (first == '.' && view[1..].starts_with(|c: char| c.is_ascii_digit()));

        if starts_number {
            Ok(Some(self.get_number()))
        } else if is_identifier_start(first) {
            Ok(Some(self.get_identifier()))
        } else if is_operator(first) {
            Ok(Some(self.get_operator()))
        } else if is_punctuation(first) {
            Ok(Some(Token::new(&view[..1], TokenKind::punctuation)))
        } else {
            Err(EvalError::invalid_character(first))
        }
    }
}

impl Scanner for StringScanner<'_> {
    fn get_current(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    fn advance(&mut self) -> Result<(), EvalError> {
        self.skip_whitespace();
        let token = self.get_token()?;
        if let Some(token) = &token {
            self.index += token.content.len();
        }
        self.token = token;
        Ok(())
    }
}
