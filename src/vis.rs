use crate::analytic;
use crate::monte_carlo::mc_results::{ObservableSummary, SweepResult};
use plotly::common::{ErrorData, ErrorType, Mode};
use plotly::layout::{Axis, GridPattern, Layout, LayoutGrid};
use plotly::{Plot, Scatter};
use std::path::Path;
use tracing::info;

fn save_or_show(plot: Plot, show: bool, save_as: Option<&Path>) {
    if let Some(path) = save_as {
        plot.write_html(path);
        info!("Wrote plot to {}", path.display());
    }

    if show {
        plot.show();
    }
}

/// `n` equally spaced values from `lower` to `upper`, both included.
fn linspace(lower: f64, upper: f64, n: usize) -> Vec<f64> {
    let dx = (upper - lower) / (n - 1) as f64;
    (0..n).map(|i| lower + i as f64 * dx).collect()
}

fn line_trace_from_func(
    func: impl Fn(f64) -> f64,
    lower: f64,
    upper: f64,
    n: usize,
) -> Box<Scatter<f64, f64>> {
    let xx: Vec<f64> = linspace(lower, upper, n)
        .into_iter()
        .filter(|x| func(*x).is_finite())
        .collect();
    let yy = xx.iter().map(|x| func(*x)).collect();
    Scatter::new(xx, yy).mode(Mode::Lines)
}

fn scatter_trace_with_errors(
    summaries: &[ObservableSummary],
    value: impl Fn(&ObservableSummary) -> (f64, f64),
    name: &str,
) -> Box<Scatter<f64, f64>> {
    let (values, errors): (Vec<f64>, Vec<f64>) = summaries.iter().map(value).unzip();
    Scatter::new(summaries.iter().map(|s| s.beta).collect(), values)
        .name(name)
        .mode(Mode::Markers)
        .error_y(ErrorData::new(ErrorType::Data).array(errors))
}

/// Per-site Monte Carlo estimates with error bars next to the exact solution.
///
/// The sign of the sampled magnetisation depends on which ordered state the chain fell into,
/// so its absolute value is compared.
pub fn plot_comparison(result: &SweepResult, show: bool, save_as: Option<&Path>) {
    let summaries = result.get_per_site_summaries();
    if summaries.is_empty() {
        return;
    }
    let betas: Vec<f64> = summaries.iter().map(|s| s.beta).collect();
    let plot_min = betas.iter().copied().fold(f64::INFINITY, f64::min);
    let plot_max = betas.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let resolution = 200;

    let mut plot = Plot::new();
    plot.add_trace(scatter_trace_with_errors(
        summaries,
        |s| (s.magnetisation.abs(), s.magnetisation_error),
        "Abs Magnetisation Per Spin",
    ));
    plot.add_trace(
        line_trace_from_func(analytic::magnetisation_per_site, plot_min, plot_max, resolution)
            .name("Exact Magnetisation"),
    );
    plot.add_trace(
        scatter_trace_with_errors(summaries, |s| (s.energy, s.energy_error), "Energy Per Spin")
            .x_axis("x2")
            .y_axis("y2"),
    );
    plot.add_trace(
        line_trace_from_func(analytic::energy_per_site, plot_min, plot_max, resolution)
            .name("Exact Energy")
            .x_axis("x2")
            .y_axis("y2"),
    );
    plot.add_trace(
        scatter_trace_with_errors(
            summaries,
            |s| (s.specific_heat, s.specific_heat_error),
            "Specific Heat Per Spin",
        )
        .x_axis("x3")
        .y_axis("y3"),
    );
    plot.add_trace(
        line_trace_from_func(analytic::specific_heat_per_site, plot_min, plot_max, resolution)
            .name("Exact Specific Heat")
            .x_axis("x3")
            .y_axis("y3"),
    );

    let layout = Layout::new()
        .grid(
            LayoutGrid::new()
                .rows(1)
                .columns(3)
                .pattern(GridPattern::Independent),
        )
        .title(result.get_lattice_description())
        .x_axis(Axis::new().title("Inverse Temperature [1]"))
        .x_axis2(Axis::new().title("Inverse Temperature [1]"))
        .x_axis3(Axis::new().title("Inverse Temperature [1]"))
        .y_axis(Axis::new().title("Abs Magnetisation [1]"))
        .y_axis2(Axis::new().title("Energy [1]"))
        .y_axis3(Axis::new().title("Specific Heat [1]"));
    plot.set_layout(layout);

    save_or_show(plot, show, save_as);
}
