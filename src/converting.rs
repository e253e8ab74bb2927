use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

pub type Conversion = fn(f64) -> f64;

lazy_static! {
    static ref UNIT_CONVERSIONS: HashMap<&'static str, Conversion> = {
        let table: [(&'static str, Conversion); 20] = [
            ("cm to in", |x| x / 2.54),
            ("in to cm", |x| x * 2.54),
            ("m to ft", |x| x * 3.28084),
            ("ft to m", |x| x / 3.28084),
            ("km to mile", |x| x * 0.621371),
            ("mile to km", |x| x / 0.621371),
            ("acre to m^2", |x| x * 4046.86),
            ("m^2 to acre", |x| x / 4046.86),
            ("gal(US) to L", |x| x * 3.78541),
            ("L to gal(US)", |x| x / 3.78541),
            ("oz to g", |x| x * 28.3495),
            ("g to oz", |x| x / 28.3495),
            ("km/h to m/s", |x| x / 3.6),
            ("m/s to km/h", |x| x * 3.6),
            ("atm to Pa", |x| x * 101325.0),
            ("Pa to atm", |x| x / 101325.0),
            ("hp to kW", |x| x * 0.7457),
            ("kW to hp", |x| x / 0.7457),
            ("F to C", |x| (x - 32.0) * 5.0 / 9.0),
            ("C to F", |x| x * 9.0 / 5.0 + 32.0),
        ];
        HashMap::from(table)
    };

    static ref CURRENCY_PATTERN: Regex = Regex::new(
        r"(?i)^(?:(?P<number>-?\d+(?:\.\d+)?)\s*|(?P<name>[a-z_][a-z0-9_]*)\s+)(?P<from>[a-z]{3})\s+to\s+(?P<to>[a-z]{3})\s*$"
    ).unwrap();

    static ref UNIT_PATTERN: Regex = Regex::new(
        r"(?i)^(?:(?P<number>-?\d+(?:\.\d+)?)\s*|(?P<name>[a-z_][a-z0-9_]*)\s+)(?P<from>[a-z^0-9/()]+)\s+to\s+(?P<to>[a-z^0-9/()]+)\s*$"
    ).unwrap();
}

/// The quantity in front of a conversion: a literal or a name still to be resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Amount<'a> {
    literal(&'a str),
    name(&'a str),
}

/// `<amount> <from> to <to>`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConversionRequest<'a> {
    pub amount: Amount<'a>,
    pub from: &'a str,
    pub to: &'a str,
}

impl ConversionRequest<'_> {
    /// The registry key, `"<from> to <to>"`.
    pub fn key(&self) -> String {
        format!("{} to {}", self.from, self.to)
    }
}

fn capture<'a>(pattern: &Regex, line: &'a str) -> Option<ConversionRequest<'a>> {
    let captures = pattern.captures(line)?;
    let amount = match (captures.name("number"), captures.name("name")) {
        (Some(number), _) => Amount::literal(number.as_str()),
        (None, Some(name)) => Amount::name(name.as_str()),
        (None, None) => return None,
    };
    Some(ConversionRequest {
        amount,
        from: captures.name("from")?.as_str(),
        to: captures.name("to")?.as_str(),
    })
}

/// Matches `<amount> <XXX> to <YYY>` with three-letter codes, in any case.
pub fn match_currency(line: &str) -> Option<ConversionRequest<'_>> {
    capture(&CURRENCY_PATTERN, line)
}

/// Matches `<amount> <unit> to <unit>`.
pub fn match_unit(line: &str) -> Option<ConversionRequest<'_>> {
    capture(&UNIT_PATTERN, line)
}

/// Looks up `key` in the unit registry. Keys are case sensitive.
pub fn unit_conversion(key: &str) -> Option<Conversion> {
    UNIT_CONVERSIONS.get(key).copied()
}
