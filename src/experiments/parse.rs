use anyhow::{Context, Result};
use log::{debug, error, info};
use regex::Regex;
use std::{fmt, fs, path::Path, sync::LazyLock};

pub const THROUGHPUT_LABEL: &str = "Throughput";
pub const SLOWDOWN_LABEL: &str = "Slowdown";

// Both templates must match the whole (trimmed) line.
static THROUGHPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Throughput: (?P<tput>[-+]?\d+) req/s$").expect("throughput template is valid")
});
static SLOWDOWN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Slowdown: (?P<stats>.+?) p99=(?P<tag>.+?)\((?P<p99>[-+]?\d*\.\d+)\)$")
        .expect("slowdown template is valid")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Throughput,
    P99,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Throughput => write!(f, "throughput"),
            Metric::P99 => write!(f, "p99"),
        }
    }
}

/// Outcome of looking for one metric in one log file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Extraction<T> {
    Matched(T),
    /// No line carries the metric's label.
    Missing,
    /// The label appears on `line` (1-based) but the line does not follow the
    /// template, and no other line matched.
    Malformed { line: usize },
}

impl<T: Copy> Extraction<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            Extraction::Matched(value) => Some(*value),
            Extraction::Missing | Extraction::Malformed { .. } => None,
        }
    }

    fn or_malformed(self, line: usize) -> Self {
        match self {
            Extraction::Matched(_) => self,
            Extraction::Missing | Extraction::Malformed { .. } => Extraction::Malformed { line },
        }
    }
}

impl<T: fmt::Display> fmt::Display for Extraction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extraction::Matched(value) => write!(f, "{value}"),
            Extraction::Missing => write!(f, "no matching line"),
            Extraction::Malformed { line } => write!(f, "malformed line {line}"),
        }
    }
}

/// Throughput (req/s) and p99 slowdown extracted from a single log file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogSummary {
    pub throughput: Extraction<u64>,
    pub p99: Extraction<f64>,
}

impl Default for LogSummary {
    fn default() -> Self {
        LogSummary {
            throughput: Extraction::Missing,
            p99: Extraction::Missing,
        }
    }
}

pub fn parse_log(path: &Path) -> Result<LogSummary> {
    info!("parsing log file (path={})", path.display());

    let text = fs::read_to_string(path).map_err(|e| {
        let reason = format!("error reading log file (path={}, error={e:?})", path.display());
        error!("{reason}");
        anyhow::anyhow!(reason)
    })?;

    parse_log_str(&text).with_context(|| format!("log file {}", path.display()))
}

pub fn parse_log_str(text: &str) -> Result<LogSummary> {
    let mut summary = LogSummary::default();

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = line.trim();

        if line.contains(THROUGHPUT_LABEL) {
            summary.throughput = match THROUGHPUT_RE.captures(line) {
                Some(caps) => {
                    let tput = caps["tput"].parse::<u64>().map_err(|e| {
                        let reason = format!(
                            "invalid throughput value (line={lineno}, value={}, error={e})",
                            &caps["tput"]
                        );
                        error!("{reason}");
                        anyhow::anyhow!(reason)
                    })?;
                    Extraction::Matched(tput)
                }
                None => {
                    debug!("throughput line does not follow template (line={lineno}): {line}");
                    summary.throughput.or_malformed(lineno)
                }
            };
        }

        if line.contains(SLOWDOWN_LABEL) {
            summary.p99 = match SLOWDOWN_RE.captures(line) {
                Some(caps) => {
                    let p99 = caps["p99"].parse::<f64>().map_err(|e| {
                        let reason = format!(
                            "invalid p99 value (line={lineno}, value={}, error={e})",
                            &caps["p99"]
                        );
                        error!("{reason}");
                        anyhow::anyhow!(reason)
                    })?;
                    Extraction::Matched(p99)
                }
                None => {
                    debug!("slowdown line does not follow template (line={lineno}): {line}");
                    summary.p99.or_malformed(lineno)
                }
            };
        }
    }

    Ok(summary)
}
