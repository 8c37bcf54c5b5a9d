use crate::experiments::{
    baselines::PlotConfig,
    collect::{BaselineResults, Pairing, collect_baseline},
    plot::{PlotSeries, plot_tput_slo},
};
use anyhow::Result;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub mod baselines;
pub mod collect;
pub mod color;
pub mod parse;
pub mod plot;

pub const TPUT_SLO_NAME: &str = "tput-slo";

/// Knobs of a single throughput-vs-SLO run that are not part of the plot
/// configuration file.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub pairing: Pairing,
    /// Fail if any log file is missing a metric.
    pub strict: bool,
    /// Also dump the plotted series as CSV next to the figure.
    pub write_csv: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Record<'a> {
    baseline: &'a str,
    throughput: u64,
    p99: f64,
}

fn check_dir(path: &Path, what: &str) -> Result<()> {
    if !path.is_dir() {
        let reason = format!("{what} directory not found (path={})", path.display());
        error!("{reason}");
        anyhow::bail!(reason);
    }

    Ok(())
}

fn write_csv(path: &Path, results: &[BaselineResults]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        let reason = format!("error opening csv file (path={}, error={e:?})", path.display());
        error!("{reason}");
        anyhow::anyhow!(reason)
    })?;

    for baseline in results {
        for (tput, p99) in baseline.throughputs.iter().zip(baseline.latencies.iter()) {
            writer.serialize(Record {
                baseline: &baseline.name,
                throughput: *tput,
                p99: *p99,
            })?;
        }
    }
    writer.flush()?;

    info!("wrote plotted series to: {}", path.display());
    Ok(())
}

/// Collect every configured baseline from `<run_dir>/<results_dir>` and plot
/// them to `<run_dir>/<figures_dir>/<output>`. Returns the figure path.
pub fn run_tput_slo(run_dir: &Path, config: &PlotConfig, opts: &RunOptions) -> Result<PathBuf> {
    config.validate()?;
    check_dir(run_dir, "run")?;

    let results_dir = run_dir.join(&config.results_dir);
    check_dir(&results_dir, "results")?;

    let mut results = Vec::with_capacity(config.baselines.len());
    for baseline in &config.baselines {
        let baseline_results = collect_baseline(&results_dir, &baseline.name, opts.pairing)?;
        for (path, summary) in &baseline_results.files {
            debug!(
                "{}: {} (throughput={}, p99={})",
                baseline.name,
                path.display(),
                summary.throughput,
                summary.p99
            );
        }
        results.push(baseline_results);
    }

    let num_diagnostics: usize = results.iter().map(|r| r.diagnostics.len()).sum();
    if num_diagnostics > 0 {
        if opts.strict {
            let unmatched = results
                .iter()
                .flat_map(|r| r.diagnostics.iter())
                .map(|d| format!("{}: {} ({})", d.path.display(), d.metric, d.reason))
                .collect::<Vec<_>>()
                .join(", ");
            let reason = format!(
                "{num_diagnostics} log file metric(s) could not be extracted (dir={}): {unmatched}",
                results_dir.display()
            );
            error!("{reason}");
            anyhow::bail!(reason);
        }
        warn!("plotting without {num_diagnostics} unmatched log file metric(s)");
    }

    let series: Vec<PlotSeries> = config
        .baselines
        .iter()
        .zip(results.iter())
        .map(|(baseline, results)| PlotSeries {
            config: baseline,
            results,
        })
        .collect();

    let figures_dir = run_dir.join(&config.figures_dir);
    let plot_path = figures_dir.join(&config.output);
    plot_tput_slo(&series, &config.chart, &plot_path)?;

    if opts.write_csv {
        write_csv(&plot_path.with_extension("csv"), &results)?;
    }

    Ok(plot_path)
}
