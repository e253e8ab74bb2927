use shell_calc::evaluating::Value;
use shell_calc::exchanging::{NoRates, RateSource};
use shell_calc::plotting::Plotter;
use shell_calc::{CalcError, EvalError, Reply, Session};
use std::cell::RefCell;
use std::rc::Rc;

struct FixedRates;

impl RateSource for FixedRates {
    fn rate(&self, from: &str, to: &str) -> Option<f64> {
        match (from, to) {
            ("USD", "EUR") => Some(0.92),
            ("USD", "BDT") => Some(110.0),
            _ => None,
        }
    }
}

#[derive(Clone, Default)]
struct RecordingPlotter {
    plots: Rc<RefCell<Vec<(String, Vec<f64>, Vec<f64>)>>>,
}

impl Plotter for RecordingPlotter {
    fn plot(&mut self, name: &str, xs: &[f64], ys: &[f64]) {
        self.plots.borrow_mut().push((name.into(), xs.to_vec(), ys.to_vec()));
    }
}

fn session() -> Session {
    Session::new(Box::new(FixedRates), Box::new(RecordingPlotter::default()))
}

fn number(session: &mut Session, line: &str) -> f64 {
    session.process(line).unwrap().number().unwrap()
}

#[test]
fn assigned_variables_evaluate_to_their_value() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session();
    for (name, literal) in [("a", 2.5), ("_tmp", -3.0), ("rate2", 1e-3), ("my var", 7.0)] {
        let reply = session.process(&format!("{name} = {literal}"))?;
        assert_eq!(reply, Reply::assigned{name: name.into(), value: literal});
        if !name.contains(' ') {
            assert_eq!(number(&mut session, name), literal);
        }
    }
    Ok(())
}

#[test]
fn assignment_evaluates_the_right_hand_side_as_a_request() {
    let mut session = session();
    assert_eq!(number(&mut session, "a = 2 + 3"), 5.0);
    assert_eq!(number(&mut session, "a = a * 2"), 10.0);
    assert_eq!(session.symbols().variable("a"), Some(10.0));

    let inches = number(&mut session, "len = 10 cm to in");
    assert!((inches - 10.0 / 2.54).abs() < 1e-12);

    assert_eq!(number(&mut session, "b = c = 4"), 4.0);
    assert_eq!(session.symbols().variable("c"), Some(4.0));
}

#[test]
fn square_function_evaluates_and_inverts() -> Result<(), CalcError> {
    let mut session = session();
    assert_eq!(session.process("f(x) = x*x")?, Reply::defined{name: "f".into()});

    let reply = session.process("evaluate f for x == 3")?;
    assert_eq!(reply, Reply::function_value{name: "f".into(), input: 3.0, output: Value::number(9.0)});
    assert_eq!(reply.to_string(), "f(3) = 9");

    let Reply::inverted{input, target, ..} = session.process("evaluate f for y == 9")? else {
        panic!("expected an inversion");
    };
    assert_eq!(target, 9.0);
    assert!((input * input - 9.0).abs() <= 1e-6);
    assert!(input > 0.0);
    Ok(())
}

#[test]
fn inversion_only_scans_forward() {
    let mut session = session();
    session.process("g = x + 5").unwrap();
    assert!(matches!(
        session.process("evaluate g for y == 1"),
        Err(CalcError::root_not_found{..})
    ));
}

#[test]
fn evaluation_directive_errors() {
    let mut session = session();
    session.process("f = 2 * x").unwrap();
    assert!(matches!(session.process("evaluate f for x 3"), Err(CalcError::invalid_syntax(_))));
    assert!(matches!(session.process("evaluate f at x == 3"), Err(CalcError::invalid_syntax(_))));
    assert!(matches!(session.process("evaluate f for x == three"), Err(CalcError::invalid_syntax(_))));
    assert_eq!(session.process("evaluate f for z == 3"), Err(CalcError::invalid_variable("z".into())));
    assert_eq!(session.process("evaluate h for x == 3"), Err(CalcError::undefined_function("h".into())));
}

#[test]
fn evaluation_value_may_be_a_variable() {
    let mut session = session();
    session.process("f = 2 * x").unwrap();
    session.process("n = 4").unwrap();
    assert_eq!(number(&mut session, "evaluate f for x == n"), 8.0);
}

#[test]
fn last_answer_feeds_the_next_expression() {
    let mut session = session();
    assert_eq!(number(&mut session, "ans + 1"), 1.0);
    assert_eq!(number(&mut session, "2 + 2"), 4.0);
    assert_eq!(number(&mut session, "ans * 10"), 40.0);
    assert_eq!(session.symbols().last_answer(), 40.0);
}

#[test]
fn repeated_expressions_are_idempotent() {
    let mut session = session();
    let first = session.process("sqrt(2) * sin(pi / 4)").unwrap();
    let after_first = session.symbols().last_answer();
    let second = session.process("sqrt(2) * sin(pi / 4)").unwrap();
    assert_eq!(first, second);
    assert_eq!(after_first, session.symbols().last_answer());
}

#[test]
fn unit_conversions() {
    let mut session = session();
    let reply = session.process("10 cm to in").unwrap();
    assert!((reply.number().unwrap() - 3.937007874015748).abs() < 1e-12);
    assert!(reply.to_string().starts_with("10 cm = 3.937"));

    assert_eq!(number(&mut session, "0 C to F"), 32.0);
    assert_eq!(session.process("0 C to F").unwrap().to_string(), "0 C = 32 F");
    assert_eq!(
        session.process("10 cm to ly"),
        Err(CalcError::unsupported_conversion("cm to ly".into()))
    );
}

#[test]
fn currency_conversions() {
    let mut session = session();
    assert_eq!(session.process("10 usd to eur").unwrap().to_string(), "10 USD = 9.20 EUR");
    assert_eq!(
        session.process("10 usd to xyz"),
        Err(CalcError::conversion_unavailable{from: "USD".into(), to: "XYZ".into()})
    );

    let mut offline = Session::new(Box::new(NoRates), Box::new(RecordingPlotter::default()));
    assert!(matches!(offline.process("5 eur to usd"), Err(CalcError::conversion_unavailable{..})));
}

#[test]
fn three_letter_units_go_to_currency_first() {
    let mut session = session();
    // "atm" looks like a currency code, so "kpa" is never looked up as a unit
    assert!(matches!(session.process("1 atm to kpa"), Err(CalcError::conversion_unavailable{..})));
    assert_eq!(number(&mut session, "1 atm to Pa"), 101325.0);
    assert!(matches!(session.process("pi to e"), Err(CalcError::evaluation(_))));
}

#[test]
fn builtin_names_cannot_be_shadowed() {
    let mut session = session();
    session.process("a = 1").unwrap();
    for line in ["sin = 5", "pi = 3", "ans = 2", "x = 1", "2a = 1", "sin(x) = x"] {
        assert!(matches!(session.process(line), Err(CalcError::invalid_name(_))), "{line}");
    }
    assert_eq!(session.symbols().variable("a"), Some(1.0));
    assert!(session.symbols().variable("sin").is_none());
    assert_eq!(number(&mut session, "sin(0)"), 0.0);
}

#[test]
fn failed_requests_leave_state_alone() {
    let mut session = session();
    session.process("a = 1").unwrap();
    session.process("5").unwrap();

    assert_eq!(
        session.process("a = 1 / 0"),
        Err(CalcError::evaluation(EvalError::division_by_zero))
    );
    assert!(session.process("b = nothing + 1").is_err());
    assert!(session.process("c = graph f").is_err());

    assert_eq!(session.symbols().variable("a"), Some(1.0));
    assert_eq!(session.symbols().variable("b"), None);
    assert_eq!(session.symbols().variable("c"), None);
    assert_eq!(session.symbols().last_answer(), 5.0);
}

#[test]
fn definitions_are_checked_when_called() {
    let mut session = session();
    assert!(session.process("f = x + later").is_ok());
    assert_eq!(
        session.process("evaluate f for x == 1"),
        Err(CalcError::evaluation(EvalError::undefined("later".into())))
    );
    session.process("later = 2").unwrap();
    assert_eq!(number(&mut session, "evaluate f for x == 1"), 3.0);

    assert_eq!(session.process("g = x +"), Ok(Reply::defined{name: "g".into()}));
    assert!(session.symbols().function("g").is_some());
    assert_eq!(
        session.process("evaluate g for x == 1"),
        Err(CalcError::evaluation(EvalError::abrupt_end))
    );
    assert_eq!(
        session.process("g(2) + 1"),
        Err(CalcError::evaluation(EvalError::abrupt_end))
    );
    assert!(matches!(session.process("h(x) ="), Err(CalcError::invalid_definition(_))));
    assert!(session.symbols().function("h").is_none());
}

#[test]
fn oversized_input_is_an_error_not_a_crash() {
    let mut session = session();
    let negations = "-".repeat(100_000) + "1";
    assert_eq!(session.process(&negations), Err(CalcError::evaluation(EvalError::too_deep)));
    let sum = vec!["1"; 60_000].join("+");
    assert_eq!(session.process(&sum), Err(CalcError::evaluation(EvalError::too_deep)));

    assert_eq!(number(&mut session, "fact(1e15)"), f64::INFINITY);
    assert_eq!(number(&mut session, "1 + 1"), 2.0);
}

#[test]
fn x_inside_other_names_is_not_a_definition() {
    let mut session = session();
    assert_eq!(number(&mut session, "a = exp(0)"), 1.0);
    assert!(session.symbols().function("a").is_none());
}

#[test]
fn graph_samples_minus_ten_to_ten() {
    let plotter = RecordingPlotter::default();
    let plots = plotter.plots.clone();
    let mut session = Session::new(Box::new(NoRates), Box::new(plotter));

    session.process("h = sqrt(x)").unwrap();
    assert_eq!(session.process("graph h").unwrap().to_string(), "Graphing h(x)");
    assert_eq!(session.process("graph nope"), Err(CalcError::undefined_function("nope".into())));
    assert!(matches!(session.process("graph"), Err(CalcError::invalid_syntax(_))));

    let plots = plots.borrow();
    assert_eq!(plots.len(), 1);
    let (name, xs, ys) = &plots[0];
    assert_eq!(name, "h");
    assert_eq!(xs.len(), 201);
    assert!(ys[0].is_nan());
    assert_eq!(ys[200], 10f64.sqrt());
}

#[test]
fn clear_forgets_symbols() {
    let mut session = session();
    session.process("a = 3").unwrap();
    session.process("f = x").unwrap();
    session.clear();
    assert!(session.symbols().is_empty());
    assert_eq!(
        session.process("a + 1"),
        Err(CalcError::evaluation(EvalError::undefined("a".into())))
    );
}

#[test]
fn defined_functions_can_be_called_in_expressions() {
    let mut session = session();
    session.process("f(x) = x^2 + 1").unwrap();
    assert_eq!(number(&mut session, "f(2) * 2"), 10.0);
    assert_eq!(number(&mut session, "bin(5)"), 5.0);
    assert_eq!(session.process("hex(255)").unwrap().to_string(), "ff");
}
