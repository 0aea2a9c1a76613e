use clap::{Parser, ValueEnum};
use ising::analytic;
use ising::config::SimulationConfig;
use ising::monte_carlo::{self, mc_results::SweepResult, update_rule::UpdateRule};
use ising::output;
use ising::vis;
use ising::Result;
use rand::{rngs::SmallRng, SeedableRng};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RuleArg {
    Metropolis,
    HeatBath,
}

impl From<RuleArg> for UpdateRule {
    fn from(rule: RuleArg) -> Self {
        match rule {
            RuleArg::Metropolis => UpdateRule::Metropolis,
            RuleArg::HeatBath => UpdateRule::HeatBath,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Metropolis and heat-bath Monte Carlo of the 2d Ising model, compared with Onsager's solution."
)]
struct Cli {
    /// Simulation config in TOML format. Every missing key falls back to the reference run.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed for the random number generator. Overrides the config file.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Single-spin update rule. Overrides the config file.
    #[arg(short, long, value_enum)]
    rule: Option<RuleArg>,

    /// Directory the CSV tables (and the plot) are written to.
    #[arg(short, long, value_name = "PATH", default_value = "result")]
    output_dir: PathBuf,

    /// Also write an HTML plot comparing the samples with the exact solution.
    #[arg(long)]
    plot: bool,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn setup_logging(verbosity: u8, quiet: bool) {
    let level_filter = if quiet {
        LevelFilter::ERROR
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(level_filter)
        .with(stderr_layer)
        .init();
}

fn print_summary(result: &SweepResult) {
    let settings = result.get_settings();
    let chain = settings.get_chain();
    println!("{}", result.get_lattice_description());
    println!(
        "{} updates, {} sweeps per chain, burn-in {}, sampled every {} sweeps",
        settings.get_update_rule().name(),
        chain.get_total_sweeps(),
        chain.get_burn_in(),
        chain.get_interval()
    );
    println!(
        "{:>8} {:>14} {:>12} {:>14} {:>12} {:>12} {:>12}",
        "beta", "magnetisation", "error", "energy", "error", "spec. heat", "error"
    );
    for point in result.get_points() {
        match &point.outcome {
            Ok(s) => println!(
                "{:>8.3} {:>14.3} {:>12.3} {:>14.3} {:>12.3} {:>12.3} {:>12.3}",
                s.beta,
                s.magnetisation,
                s.magnetisation_error,
                s.energy,
                s.energy_error,
                s.specific_heat,
                s.specific_heat_error
            ),
            Err(e) => println!("{:>8.3} failed: {e}", point.beta),
        }
    }
}

fn run_app(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(rule) = cli.rule {
        config.update_rule = rule.into();
    }
    config.validate()?;
    debug!("Effective configuration: {:?}", config);

    let mut rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_rng(&mut rand::rng()),
    };

    let result = monte_carlo::simulate(&config, &mut rng)?;
    let reference = analytic::solve(&config.betas);

    std::fs::create_dir_all(&cli.output_dir)?;
    let rule_name = config.update_rule.name();
    output::write_summary_csv(
        &cli.output_dir.join(format!("{rule_name}.csv")),
        &result,
    )?;
    output::write_analytic_csv(&cli.output_dir.join("analytic.csv"), &reference)?;
    if cli.plot {
        let plot_path = cli.output_dir.join(format!("{rule_name}.html"));
        vis::plot_comparison(&result, false, Some(&plot_path));
    }

    print_summary(&result);
    info!(
        "Exact transition at beta_c = {:.6}",
        analytic::critical_beta()
    );
    Ok(())
}

pub fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = run_app(cli) {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
