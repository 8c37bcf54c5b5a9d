use crate::experiments::parse::{Extraction, LogSummary, Metric, parse_log};
use anyhow::Result;
use log::{debug, error, info, warn};
use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
};

/// How the throughput and latency lists of a baseline are ordered. Either
/// way, a file missing one of its metrics contributes to neither list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pairing {
    /// Sort both lists ascending on their own. The i-th throughput and the
    /// i-th latency need not come from the same log file.
    #[default]
    Independent,
    /// Keep each file's (throughput, latency) together, ordered by
    /// throughput.
    PerFile,
}

/// A log file that did not yield one of its metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct FileDiagnostic {
    pub path: PathBuf,
    pub metric: Metric,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BaselineResults {
    pub name: String,
    pub throughputs: Vec<u64>,
    pub latencies: Vec<f64>,
    pub files: Vec<(PathBuf, LogSummary)>,
    pub diagnostics: Vec<FileDiagnostic>,
}

impl BaselineResults {
    /// Points as drawn in the chart: (latency, throughput).
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.latencies
            .iter()
            .zip(self.throughputs.iter())
            .map(|(lat, tput)| (*lat, *tput as f64))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.throughputs.is_empty() && self.latencies.is_empty()
    }
}

fn check_extraction<T: Copy + std::fmt::Display>(
    path: &Path,
    metric: Metric,
    extraction: &Extraction<T>,
    diagnostics: &mut Vec<FileDiagnostic>,
) -> Option<T> {
    if let Some(value) = extraction.value() {
        return Some(value);
    }

    let reason = extraction.to_string();
    warn!(
        "no {metric} found in log file (path={}, reason={reason})",
        path.display()
    );
    diagnostics.push(FileDiagnostic {
        path: path.to_path_buf(),
        metric,
        reason,
    });
    None
}

/// List the regular files in `results_dir` whose name contains `filter`,
/// ordered by file name.
pub fn get_baseline_files(results_dir: &Path, filter: &str) -> Result<Vec<PathBuf>> {
    let mut log_files = Vec::new();
    for entry in fs::read_dir(results_dir).map_err(|e| {
        let reason = format!(
            "error reading from directory (path={}, error={e:?})",
            results_dir.display()
        );
        error!("{reason}");
        anyhow::anyhow!(reason)
    })? {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                let file_name = entry.file_name();
                if !file_name.to_string_lossy().contains(filter) {
                    continue;
                }
                if !path.is_file() {
                    debug!("skipping non-file entry (path={})", path.display());
                    continue;
                }
                log_files.push(path);
            }
            Err(e) => {
                let reason = format!("error opening directory entry (error={e:?})");
                error!("{reason}");
                anyhow::bail!(reason);
            }
        }
    }

    log_files.sort();
    Ok(log_files)
}

pub fn collect_baseline(
    results_dir: &Path,
    filter: &str,
    pairing: Pairing,
) -> Result<BaselineResults> {
    let log_files = get_baseline_files(results_dir, filter)?;
    if log_files.is_empty() {
        warn!(
            "no log files for baseline (name={filter}, dir={})",
            results_dir.display()
        );
    }

    let mut files = Vec::with_capacity(log_files.len());
    let mut diagnostics = Vec::new();
    let mut pairs = Vec::new();

    for path in log_files {
        let summary = parse_log(&path)?;
        let tput = check_extraction(
            &path,
            Metric::Throughput,
            &summary.throughput,
            &mut diagnostics,
        );
        let p99 = check_extraction(&path, Metric::P99, &summary.p99, &mut diagnostics);

        match (tput, p99) {
            (Some(tput), Some(p99)) => pairs.push((tput, p99)),
            _ => debug!(
                "leaving incomplete log file out of the series (path={})",
                path.display()
            ),
        }

        files.push((path, summary));
    }

    let (throughputs, latencies): (Vec<u64>, Vec<f64>) = match pairing {
        Pairing::Independent => {
            // NOTE: sorting each list on its own drops the per-file pairing
            // between throughput and latency. Use `Pairing::PerFile` to keep it.
            let (mut throughputs, mut latencies): (Vec<u64>, Vec<f64>) =
                pairs.into_iter().unzip();
            throughputs.sort_unstable();
            latencies.sort_by(f64::total_cmp);
            (throughputs, latencies)
        }
        Pairing::PerFile => {
            pairs.sort_by(|a, b| match a.0.cmp(&b.0) {
                Ordering::Equal => a.1.total_cmp(&b.1),
                other => other,
            });
            pairs.into_iter().unzip()
        }
    };

    info!(
        "collected baseline (name={filter}, files={}, points={}, diagnostics={})",
        files.len(),
        throughputs.len(),
        diagnostics.len()
    );

    Ok(BaselineResults {
        name: filter.to_string(),
        throughputs,
        latencies,
        files,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_log(dir: &Path, name: &str, tput: Option<u64>, p99: Option<f64>) {
        let mut contents = String::from("Finished\n");
        if let Some(tput) = tput {
            contents.push_str(&format!("Throughput: {tput} req/s\n"));
        }
        if let Some(p99) = p99 {
            contents.push_str(&format!("Slowdown: avg=1.0 p50=1.0 p99=x({p99:.1})\n"));
        }
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_no_matching_files() {
        let temp_dir = tempdir().unwrap();
        write_log(temp_dir.path(), "pyxis_1.log", Some(10), Some(1.0));

        let results = collect_baseline(temp_dir.path(), "kayak", Pairing::Independent).unwrap();
        assert!(results.throughputs.is_empty());
        assert!(results.latencies.is_empty());
        assert!(results.is_empty());
        assert!(results.diagnostics.is_empty());
    }

    #[test]
    fn test_lists_are_sorted_independently() {
        let temp_dir = tempdir().unwrap();
        write_log(temp_dir.path(), "kayak_a.log", Some(300), Some(1.5));
        write_log(temp_dir.path(), "kayak_b.log", Some(100), Some(4.5));
        write_log(temp_dir.path(), "kayak_c.log", Some(200), Some(2.5));
        write_log(temp_dir.path(), "pyxis_a.log", Some(999), Some(9.5));

        let results = collect_baseline(temp_dir.path(), "kayak", Pairing::Independent).unwrap();
        assert_eq!(results.throughputs, vec![100, 200, 300]);
        assert_eq!(results.latencies, vec![1.5, 2.5, 4.5]);
        assert_eq!(results.files.len(), 3);
        assert_eq!(
            results.points(),
            vec![(1.5, 100.0), (2.5, 200.0), (4.5, 300.0)]
        );
    }

    #[test]
    fn test_per_file_pairing() {
        let temp_dir = tempdir().unwrap();
        write_log(temp_dir.path(), "kayak_a.log", Some(300), Some(1.5));
        write_log(temp_dir.path(), "kayak_b.log", Some(100), Some(4.5));
        write_log(temp_dir.path(), "kayak_c.log", Some(200), None);

        let results = collect_baseline(temp_dir.path(), "kayak", Pairing::PerFile).unwrap();
        assert_eq!(results.throughputs, vec![100, 300]);
        assert_eq!(results.latencies, vec![4.5, 1.5]);
        assert_eq!(results.diagnostics.len(), 1);
    }

    #[test]
    fn test_unmatched_metrics_become_diagnostics() {
        let temp_dir = tempdir().unwrap();
        write_log(temp_dir.path(), "kayak_a.log", Some(300), None);
        write_log(temp_dir.path(), "kayak_b.log", None, Some(2.0));

        write_log(temp_dir.path(), "kayak_c.log", Some(100), Some(4.5));

        let results = collect_baseline(temp_dir.path(), "kayak", Pairing::Independent).unwrap();
        assert_eq!(results.throughputs, vec![100]);
        assert_eq!(results.latencies, vec![4.5]);
        assert_eq!(results.points(), vec![(4.5, 100.0)]);
        assert_eq!(results.files.len(), 3);
        assert_eq!(results.diagnostics.len(), 2);

        assert_eq!(results.diagnostics[0].metric, Metric::P99);
        assert!(results.diagnostics[0].path.ends_with("kayak_a.log"));
        assert_eq!(results.diagnostics[1].metric, Metric::Throughput);
        assert!(results.diagnostics[1].path.ends_with("kayak_b.log"));
    }

    #[test]
    fn test_substring_filter_and_directories() {
        let temp_dir = tempdir().unwrap();
        write_log(temp_dir.path(), "run-kayak-2.txt", Some(5), Some(1.0));
        write_log(temp_dir.path(), "Kayak_upper.log", Some(6), Some(1.0));
        fs::create_dir(temp_dir.path().join("kayak_dir")).unwrap();

        let files = get_baseline_files(temp_dir.path(), "kayak").unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("run-kayak-2.txt"));
    }

    #[test]
    fn test_missing_results_dir() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("results");
        assert!(collect_baseline(&missing, "kayak", Pairing::Independent).is_err());
    }
}
