use crate::experiments::{
    TPUT_SLO_NAME,
    color::{FONT_SIZE, LEGEND_FONT_SIZE, MARKER_SIZE, STROKE_WIDTH, get_color_from_label},
};
use anyhow::{Context, Result};
use log::error;
use plotters::prelude::RGBColor;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, fs, path::Path};

/// The systems compared out of the box.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SystemBaseline {
    Kayak,
    Pyxis,
}

impl fmt::Display for SystemBaseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemBaseline::Kayak => write!(f, "kayak"),
            SystemBaseline::Pyxis => write!(f, "pyxis"),
        }
    }
}

impl SystemBaseline {
    pub fn iter_variants() -> std::slice::Iter<'static, SystemBaseline> {
        static VARIANTS: [SystemBaseline; 2] = [SystemBaseline::Kayak, SystemBaseline::Pyxis];
        VARIANTS.iter()
    }

    pub fn default_config(&self) -> BaselineConfig {
        match self {
            SystemBaseline::Kayak => BaselineConfig {
                name: self.to_string(),
                label: "Kayak".to_string(),
                marker: Marker::Circle,
                color: "orange".to_string(),
            },
            SystemBaseline::Pyxis => BaselineConfig {
                name: self.to_string(),
                label: "Pyxis".to_string(),
                marker: Marker::Square,
                color: "blue".to_string(),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Marker {
    Circle,
    Square,
    Triangle,
    Cross,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Circle => write!(f, "circle"),
            Marker::Square => write!(f, "square"),
            Marker::Triangle => write!(f, "triangle"),
            Marker::Cross => write!(f, "cross"),
        }
    }
}

/// One series in the chart: which log files feed it and how it is drawn.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BaselineConfig {
    /// Substring a log file name must contain to belong to this baseline.
    pub name: String,
    /// Legend label.
    pub label: String,
    pub marker: Marker,
    /// Named color label or `#rrggbb`.
    pub color: String,
}

impl BaselineConfig {
    pub fn get_color(&self) -> Result<RGBColor> {
        get_color_from_label(&self.color)
            .with_context(|| format!("color for baseline (name={})", self.name))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
    pub legend_font_size: u32,
    pub marker_size: u32,
    pub line_width: u32,
    pub x_desc: String,
    pub y_desc: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            width: 1000,
            height: 800,
            font_size: FONT_SIZE,
            legend_font_size: LEGEND_FONT_SIZE,
            marker_size: MARKER_SIZE,
            line_width: STROKE_WIDTH,
            x_desc: "SLO".to_string(),
            y_desc: "Throughput (requests/s)".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Directory, relative to the run directory, holding the log files.
    pub results_dir: String,
    /// Directory, relative to the run directory, the figure is written to.
    pub figures_dir: String,
    pub output: String,
    pub baselines: Vec<BaselineConfig>,
    pub chart: ChartConfig,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            results_dir: "results".to_string(),
            figures_dir: "figures".to_string(),
            output: format!("{TPUT_SLO_NAME}.png"),
            baselines: SystemBaseline::iter_variants()
                .map(SystemBaseline::default_config)
                .collect(),
            chart: ChartConfig::default(),
        }
    }
}

impl PlotConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PlotConfig =
            serde_yaml::from_str(yaml).context("failed to parse plot configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path).map_err(|e| {
            let reason = format!(
                "error reading plot configuration (path={}, error={e:?})",
                path.display()
            );
            error!("{reason}");
            anyhow::anyhow!(reason)
        })?;

        Self::from_yaml(&yaml).with_context(|| format!("config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.baselines.is_empty() {
            error!("plot configuration lists no baselines");
            anyhow::bail!("plot configuration lists no baselines");
        }

        let mut seen = BTreeSet::new();
        for baseline in &self.baselines {
            if baseline.name.is_empty() {
                error!("baseline with empty name (label={})", baseline.label);
                anyhow::bail!("baseline with empty name (label={})", baseline.label);
            }
            if !seen.insert(baseline.name.as_str()) {
                error!("duplicate baseline (name={})", baseline.name);
                anyhow::bail!("duplicate baseline (name={})", baseline.name);
            }
            baseline.get_color()?;
        }

        if self.output.is_empty() {
            anyhow::bail!("empty output file name");
        }

        Ok(())
    }
}
