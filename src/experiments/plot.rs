use crate::experiments::{
    baselines::{BaselineConfig, ChartConfig, Marker},
    collect::BaselineResults,
};
use anyhow::{Context, Result};
use log::{debug, error, info};
use plotters::{coord::Shift, coord::types::RangedCoordf64, prelude::*};
use std::{fs, ops::Range, path::Path};

/// One baseline to draw, with its style and collected results.
pub struct PlotSeries<'a> {
    pub config: &'a BaselineConfig,
    pub results: &'a BaselineResults,
}

type TputSloChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Axis range covering `values` with a 10% margin on each side. Ranges over
/// non-negative data never start below zero. No data gives `0..1`.
pub(crate) fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
        (min.min(v), max.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }

    let span = max - min;
    let margin = if span > 0.0 {
        span * 0.1
    } else {
        max.abs().max(1.0) * 0.1
    };

    let lower = if min >= 0.0 {
        (min - margin).max(0.0)
    } else {
        min - margin
    };
    lower..(max + margin)
}

fn draw_markers<'a, DB: DrawingBackend + 'a>(
    chart: &mut TputSloChart<'a, DB>,
    points: &[(f64, f64)],
    baseline: &BaselineConfig,
    style: &ChartConfig,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let color = baseline.get_color()?;
    let size = style.marker_size;
    let half = size as i32;
    let line_width = style.line_width;
    let edge = BLACK.stroke_width(1);
    let label = baseline.label.as_str();

    // The legend entry is drawn in backend pixels: a short line with the
    // marker in its middle.
    match baseline.marker {
        Marker::Circle => {
            chart
                .draw_series(points.iter().map(|p| Circle::new(*p, size, color.filled())))?
                .label(label)
                .legend(move |(x, y)| {
                    EmptyElement::at((x, y))
                        + PathElement::new(vec![(0, 0), (30, 0)], color.stroke_width(line_width))
                        + Circle::new((15, 0), size, color.filled())
                        + Circle::new((15, 0), size, edge)
                });
            chart.draw_series(points.iter().map(|p| Circle::new(*p, size, edge)))?;
        }
        Marker::Square => {
            chart
                .draw_series(points.iter().map(|p| {
                    EmptyElement::at(*p)
                        + Rectangle::new([(-half, -half), (half, half)], color.filled())
                }))?
                .label(label)
                .legend(move |(x, y)| {
                    EmptyElement::at((x, y))
                        + PathElement::new(vec![(0, 0), (30, 0)], color.stroke_width(line_width))
                        + Rectangle::new([(15 - half, -half), (15 + half, half)], color.filled())
                        + Rectangle::new([(15 - half, -half), (15 + half, half)], edge)
                });
            chart.draw_series(points.iter().map(|p| {
                EmptyElement::at(*p) + Rectangle::new([(-half, -half), (half, half)], edge)
            }))?;
        }
        Marker::Triangle => {
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|p| TriangleMarker::new(*p, size, color.filled())),
                )?
                .label(label)
                .legend(move |(x, y)| {
                    EmptyElement::at((x, y))
                        + PathElement::new(vec![(0, 0), (30, 0)], color.stroke_width(line_width))
                        + TriangleMarker::new((15, 0), size, color.filled())
                });
        }
        Marker::Cross => {
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|p| Cross::new(*p, size, color.stroke_width(2))),
                )?
                .label(label)
                .legend(move |(x, y)| {
                    EmptyElement::at((x, y))
                        + PathElement::new(vec![(0, 0), (30, 0)], color.stroke_width(line_width))
                        + Cross::new((15, 0), size, color.stroke_width(2))
                });
        }
    }

    Ok(())
}

fn draw_tput_slo<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &[PlotSeries<'_>],
    style: &ChartConfig,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let all_points: Vec<(f64, f64)> = series.iter().flat_map(|s| s.results.points()).collect();
    let x_range = axis_range(all_points.iter().map(|(x, _)| *x));
    let y_range = axis_range(all_points.iter().map(|(_, y)| *y));
    debug!("tput-slo axis ranges (x={x_range:?}, y={y_range:?})");

    let font_size = style.font_size;
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(font_size * 3)
        .y_label_area_size(font_size * 5)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .x_desc(style.x_desc.as_str())
        .y_desc(style.y_desc.as_str())
        .label_style(("sans-serif", font_size).into_font())
        .axis_desc_style(("sans-serif", font_size).into_font())
        .x_label_formatter(&|x| format!("{:.1}", x))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()?;

    for s in series {
        let points = s.results.points();
        let color = s.config.get_color()?;

        chart.draw_series(LineSeries::new(
            points.clone(),
            color.stroke_width(style.line_width),
        ))?;
        draw_markers(&mut chart, &points, s.config, style)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .margin(10)
        .legend_area_size(40)
        .label_font(("sans-serif", style.legend_font_size).into_font())
        .background_style(&WHITE)
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Render the throughput-vs-SLO chart to `out_path`, creating its parent
/// directory and overwriting any previous figure. A `.svg` extension selects
/// the SVG backend, anything else is written as a bitmap.
pub fn plot_tput_slo(
    series: &[PlotSeries<'_>],
    style: &ChartConfig,
    out_path: &Path,
) -> Result<()> {
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            let reason = format!(
                "error creating figures directory (path={}, error={e:?})",
                parent.display()
            );
            error!("{reason}");
            anyhow::anyhow!(reason)
        })?;
    }

    let size = (style.width, style.height);
    let is_svg = out_path.extension().and_then(|e| e.to_str()) == Some("svg");
    let result = if is_svg {
        let root = SVGBackend::new(out_path, size).into_drawing_area();
        draw_tput_slo(&root, series, style)
    } else {
        let root = BitMapBackend::new(out_path, size).into_drawing_area();
        draw_tput_slo(&root, series, style)
    };
    result.with_context(|| format!("failed to plot {}", out_path.display()))?;

    info!("generated plot at: {}", out_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::baselines::PlotConfig;
    use tempfile::tempdir;

    fn results(name: &str, throughputs: Vec<u64>, latencies: Vec<f64>) -> BaselineResults {
        BaselineResults {
            name: name.to_string(),
            throughputs,
            latencies,
            files: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_axis_range() {
        assert_eq!(axis_range(std::iter::empty()), 0.0..1.0);

        let range = axis_range([1.0, 3.0].into_iter());
        assert!((range.start - 0.8).abs() < 1e-9);
        assert!((range.end - 3.2).abs() < 1e-9);

        // Margin never pushes non-negative data below zero
        let range = axis_range([0.1, 10.0].into_iter());
        assert_eq!(range.start, 0.0);

        let range = axis_range([5.0].into_iter());
        assert!(range.start < 5.0 && range.end > 5.0);
    }

    #[test]
    fn test_plot_svg_all_markers() {
        let temp_dir = tempdir().unwrap();
        let out_path = temp_dir.path().join("figures").join("tput-slo.svg");

        let mut configs = PlotConfig::default().baselines;
        configs[0].marker = Marker::Triangle;
        configs[1].marker = Marker::Cross;
        let kayak = results("kayak", vec![1000, 1500], vec![3.7, 4.1]);
        let pyxis = results("pyxis", vec![2000], vec![1.2]);
        let series = vec![
            PlotSeries {
                config: &configs[0],
                results: &kayak,
            },
            PlotSeries {
                config: &configs[1],
                results: &pyxis,
            },
        ];

        plot_tput_slo(&series, &ChartConfig::default(), &out_path).unwrap();

        let svg = fs::read_to_string(&out_path).unwrap();
        assert!(svg.contains("<svg"));
        for label in ["Kayak", "Pyxis", "SLO"] {
            assert!(svg.contains(label), "missing {label} in figure");
        }
    }

    #[test]
    fn test_plot_png_with_points() {
        let temp_dir = tempdir().unwrap();
        let out_path = temp_dir.path().join("figures").join("tput-slo.png");

        let config = PlotConfig::default();
        let kayak = results("kayak", vec![1000], vec![3.7]);
        let pyxis = results("pyxis", vec![2000], vec![1.2]);
        let series = vec![
            PlotSeries {
                config: &config.baselines[0],
                results: &kayak,
            },
            PlotSeries {
                config: &config.baselines[1],
                results: &pyxis,
            },
        ];

        plot_tput_slo(&series, &config.chart, &out_path).unwrap();
        assert!(fs::metadata(&out_path).unwrap().len() > 0);
    }

    #[test]
    fn test_plot_png_with_empty_series() {
        let temp_dir = tempdir().unwrap();
        let out_path = temp_dir.path().join("tput-slo.png");

        let config = PlotConfig::default();
        let empty = results("kayak", Vec::new(), Vec::new());
        let series = vec![PlotSeries {
            config: &config.baselines[0],
            results: &empty,
        }];

        plot_tput_slo(&series, &config.chart, &out_path).unwrap();
        assert!(fs::metadata(&out_path).unwrap().len() > 0);

        // A second run overwrites the figure
        plot_tput_slo(&series, &config.chart, &out_path).unwrap();
        assert!(out_path.exists());
    }
}
