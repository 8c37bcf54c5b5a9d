use clap::Parser;
use env_logger::Builder;
use log::{debug, info};
use pyxis_plot::{
    env::Env,
    experiments::{self, RunOptions, baselines::PlotConfig, collect::Pairing},
};

#[derive(Parser)]
#[command(version, about = "Plot throughput vs. p99 slowdown for kayak and pyxis runs")]
struct Cli {
    /// Run number. Logs are read from `<experiments-dir>/<run>/results`
    run: u32,
    /// Directory holding one sub-directory per run
    #[arg(long)]
    experiments_dir: Option<String>,
    /// YAML file with the baselines to plot and the chart style
    #[arg(long)]
    config: Option<String>,
    /// Name of the figure written to `<run>/figures`
    #[arg(long)]
    output: Option<String>,
    /// Keep each log file's throughput and latency paired instead of sorting
    /// both lists on their own
    #[arg(long)]
    keep_pairs: bool,
    /// Fail if any log file is missing a metric
    #[arg(long)]
    strict: bool,
    /// Also write the plotted series as CSV next to the figure
    #[arg(long)]
    csv: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize the logger.
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    let mut builder = Builder::from_env(env);
    builder.init();

    let cli = Cli::parse();
    debug!("{} v{}", Env::SYS_NAME, Env::get_version());

    let mut config = match &cli.config {
        Some(path) => PlotConfig::from_file(&Env::expand_path(path))?,
        None => PlotConfig::default(),
    };
    if let Some(output) = &cli.output {
        config.output = output.clone();
    }

    let experiments_root = match &cli.experiments_dir {
        Some(dir) => Env::expand_path(dir),
        None => Env::experiments_root(),
    };
    let run_dir = Env::run_root(&experiments_root, cli.run);

    let opts = RunOptions {
        pairing: if cli.keep_pairs {
            Pairing::PerFile
        } else {
            Pairing::Independent
        },
        strict: cli.strict,
        write_csv: cli.csv,
    };

    let plot_path = experiments::run_tput_slo(&run_dir, &config, &opts)?;
    info!("main(): run {} plotted to {}", cli.run, plot_path.display());

    Ok(())
}
