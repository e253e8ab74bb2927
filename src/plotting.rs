use log::warn;
use termplot::{Domain, Plot, Size};

pub const SAMPLE_STEP: f64 = 0.1;
pub const SAMPLE_RANGE: std::ops::RangeInclusive<i32> = -100..=100;

/// Renders the samples of a defined function.
///
/// `ys[i]` belongs to `xs[i]`; points where the function failed are NaN.
pub trait Plotter {
    fn plot(&mut self, name: &str, xs: &[f64], ys: &[f64]);
}

/// The x values a graph is sampled at, `-10` to `10` by `0.1`.
pub fn sample_points() -> Vec<f64> {
    let per_unit = SAMPLE_STEP.recip();
    SAMPLE_RANGE.map(|i| i as f64 / per_unit).collect()
}

/// Straight lines between neighbouring samples.
fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let index = xs.partition_point(|sample| *sample <= x);
    match index {
        0 => ys.first().copied().unwrap_or(f64::NAN),
        i if i >= xs.len() => ys.last().copied().unwrap_or(f64::NAN),
        i => {
            let (x0, x1) = (xs[i - 1], xs[i]);
            let (y0, y1) = (ys[i - 1], ys[i]);
            y0 + (y1 - y0) * (x - x0) / (x1 - x0)
        },
    }
}

fn bounds(ys: &[f64]) -> Option<(f64, f64)> {
    let finite = ys.iter().copied().filter(|y| y.is_finite());
    let (low, high) = finite.fold(None, |bounds, y| match bounds {
        None => Some((y, y)),
        Some((low, high)) => Some((f64::min(low, y), f64::max(high, y))),
    })?;
    if low == high {
        Some((low - 1.0, high + 1.0))
    } else {
        Some((low, high))
    }
}

/// Draws the graph on the terminal.
pub struct TerminalPlotter {
    pub width: usize,
    pub height: usize,
}

impl Default for TerminalPlotter {
    fn default() -> Self {
        Self{width: 120, height: 40}
    }
}

impl Plotter for TerminalPlotter {
    fn plot(&mut self, name: &str, xs: &[f64], ys: &[f64]) {
        let (Some(first), Some(last)) = (xs.first().copied(), xs.last().copied()) else {
            return;
        };
        let Some((low, high)) = bounds(ys) else {
            warn!("{name}(x) has no finite values to plot");
            return;
        };

        let xs = xs.to_vec();
        let ys = ys.to_vec();
        let title = format!("Graph of {name}(x)");

        let mut plot = Plot::default();
        plot.set_domain(Domain(first..last))
            .set_codomain(Domain(low..high))
            .set_size(Size::new(self.width, self.height))
            .set_title(&title)
            .set_x_label("x")
            .set_y_label("y")
            .add_plot(Box::new(termplot::plot::Graph::new(move |x| {
                interpolate(&xs, &ys, x)
            })));

        println!("\n{plot}");
    }
}
