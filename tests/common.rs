use anyhow::Result;
use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

/// Create `<experiments_root>/<run>/results` and return the run directory.
pub fn create_run_dir(experiments_root: &Path, run: u32) -> Result<PathBuf> {
    let run_dir = experiments_root.join(format!("{run}"));
    fs::create_dir_all(run_dir.join("results"))?;
    Ok(run_dir)
}

/// Write a client log with the summary lines the benchmark client prints
/// when it finishes.
pub fn write_client_log(run_dir: &Path, file_name: &str, tput: u64, p99: f64) -> Result<()> {
    let contents = format!(
        "Running for 60 seconds\nFinished\nThroughput: {tput} req/s\nSlowdown: avg=1.0 p50=1.0 p99=x({p99:.1})\n"
    );
    fs::write(run_dir.join("results").join(file_name), contents)?;
    Ok(())
}

pub fn run_pyxis_plot(experiments_root: &Path, args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_pyxis-plot"))
        .arg("--experiments-dir")
        .arg(experiments_root)
        .args(args)
        .env("RUST_LOG", "debug")
        .output()?;
    Ok(output)
}

/// Contents of every `<text>` element of an SVG document, trimmed.
pub fn svg_texts(svg: &str) -> Vec<String> {
    svg.split("<text")
        .skip(1)
        .filter_map(|element| {
            let start = element.find('>')? + 1;
            let end = element.find("</text>")?;
            Some(element[start..end].trim().to_string())
        })
        .collect()
}

/// Number of shapes filled with the `#rrggbb` color `hex`.
pub fn count_filled(svg: &str, hex: &str) -> usize {
    svg.to_lowercase()
        .matches(&format!("fill=\"{}\"", hex.to_lowercase()))
        .count()
}
