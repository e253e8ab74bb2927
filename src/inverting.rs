//! Brute-force inversion of a defined function.
//!
//! The scan starts at `x = 0` and only ever moves in the positive direction
//! by a fixed step, so it cannot find inputs below zero and it misses any
//! solution that does not sit within tolerance of a grid point
//! (`y == 2` for `x*x`, for instance).

use crate::error_handling::EvalError;
use log::trace;

pub const START: f64 = 0.0;
pub const STEP: f64 = 0.1;
pub const TOLERANCE: f64 = 1e-6;
/// Grid points tried before giving up, which covers `0 <= x <= 10000`.
pub const MAX_STEPS: usize = 100_000;

/// Finds the first grid point `x` with `|f(x) - target| <= TOLERANCE`.
///
/// Points where `f` fails to evaluate are skipped.
pub fn find_input<F>(f: F, target: f64) -> Option<f64>
where
    F: Fn(f64) -> Result<f64, EvalError>,
{
    // k / 10 lands on 3.0 exactly, k * 0.1 does not
    let per_unit = STEP.recip();
    for step in 0..=MAX_STEPS {
        let x = START + step as f64 / per_unit;
        match f(x) {
            Ok(y) if (y - target).abs() <= TOLERANCE => return Some(x),
            Ok(_) => {},
            Err(e) => trace!("skipping x = {x}: {e}"),
        }
    }
    None
}
