//! Figures rendered from the final analysis with plotters.
//!
//! Five charts under `<results>/figures/`, each saved as PNG and SVG:
//! - 01 average score per method (bars)
//! - 02 robustness per method (bars, improvement in the caption)
//! - 03 per-domain scores grouped by domain (bars)
//! - 04 method × domain heatmap
//! - 05 per-domain trajectory across methods (lines)
//!
//! plotters is built without a TrueType backend, so text is only carried by
//! the SVG copies. `trajectory_preview` prints the trajectories to stdout.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::ScoringMode;
use crate::reports::analysis::FinalAnalysis;
use crate::reports::METHODS;

const SIZE: (u32, u32) = (1000, 600);
const METHOD_COLORS: [RGBColor; 4] = [
    RGBColor(231, 76, 60),
    RGBColor(52, 152, 219),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
];
const DOMAIN_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];
const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
/// Lowest y value of the trajectory axis unless a score falls below it.
const TRAJECTORY_FLOOR: f64 = 0.3;

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    AverageScores,
    Robustness,
    PerDomain,
    Heatmap,
    Trajectory,
}

impl Figure {
    pub const ALL: [Figure; 5] = [
        Figure::AverageScores,
        Figure::Robustness,
        Figure::PerDomain,
        Figure::Heatmap,
        Figure::Trajectory,
    ];

    pub fn stem(self) -> &'static str {
        match self {
            Figure::AverageScores => "01_average_scores",
            Figure::Robustness => "02_robustness_scores",
            Figure::PerDomain => "03_per_domain_performance",
            Figure::Heatmap => "04_performance_heatmap",
            Figure::Trajectory => "05_robustness_trajectory",
        }
    }

    fn draw<DB: DrawingBackend>(
        self,
        root: &DrawingArea<DB, Shift>,
        analysis: &FinalAnalysis,
        mode: ScoringMode,
    ) -> DrawResult<DB> {
        root.fill(&WHITE)?;
        match self {
            Figure::AverageScores => draw_method_bars(
                root,
                &format!("Average {} Across All Domains", score_label(mode)),
                score_label(mode),
                &analysis.averages.values(),
                1.0,
                3,
            ),
            Figure::Robustness => {
                let values = analysis.robustness.values();
                let y_max = (values.iter().cloned().fold(0.0, f64::max) * 1.3).max(0.01);
                draw_method_bars(
                    root,
                    &format!(
                        "Robustness Across Domains (lower is better), multi vs single: -{:.1}%",
                        analysis.robustness_improvement_percent
                    ),
                    "Std dev across domains",
                    &values,
                    y_max,
                    4,
                )
            }
            Figure::PerDomain => draw_per_domain(root, analysis, mode),
            Figure::Heatmap => draw_heatmap(root, analysis),
            Figure::Trajectory => draw_trajectory(root, analysis, mode),
        }
    }
}

fn score_label(mode: ScoringMode) -> &'static str {
    match mode {
        ScoringMode::Correctness => "Accuracy",
        ScoringMode::Reward => "Reward Score",
    }
}

/// Label for a category axis whose categories sit on whole numbers.
fn category_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Pale yellow at 0.0 to dark green at 1.0.
fn heat_color(value: f64) -> RGBColor {
    let t = value.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(lerp(255, 0), lerp(255, 104), lerp(204, 55))
}

fn method_labels() -> Vec<String> {
    METHODS.iter().map(|m| m.to_string()).collect()
}

fn domain_labels(analysis: &FinalAnalysis) -> Vec<String> {
    analysis.per_domain.iter().map(|r| r.domain.clone()).collect()
}

fn draw_method_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    caption: &str,
    y_desc: &str,
    values: &[f64],
    y_max: f64,
    precision: usize,
) -> DrawResult<DB> {
    let labels = method_labels();
    let n = values.len() as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(caption, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n - 0.5).max(0.5), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(values.len())
        .x_label_formatter(&|x| category_label(&labels, *x))
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.35, 0.0), (x + 0.35, *v)],
            METHOD_COLORS[i % METHOD_COLORS.len()].mix(0.8).filled(),
        )
    }))?;
    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        Text::new(
            format!("{v:.precision$}"),
            (i as f64 - 0.1, *v + y_max * 0.02),
            ("sans-serif", 16).into_font(),
        )
    }))?;
    Ok(())
}

fn draw_per_domain<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    analysis: &FinalAnalysis,
    mode: ScoringMode,
) -> DrawResult<DB> {
    let labels = domain_labels(analysis);
    let n = labels.len() as f64;
    let width = 0.8 / METHODS.len() as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(format!("Per-Domain {}", score_label(mode)), ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n - 0.5).max(0.5), 0.0..1.0)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| category_label(&labels, *x))
        .y_desc(score_label(mode))
        .draw()?;

    for (m, method) in METHODS.iter().enumerate() {
        let color = METHOD_COLORS[m];
        let offset = -0.4 + width * m as f64;
        chart
            .draw_series(analysis.per_domain.iter().enumerate().map(|(d, row)| {
                let x = d as f64 + offset;
                Rectangle::new([(x, 0.0), (x + width, row.scores()[m])], color.filled())
            }))?
            .label(*method)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;
    Ok(())
}

fn draw_heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    analysis: &FinalAnalysis,
) -> DrawResult<DB> {
    let domains = domain_labels(analysis);
    // First method on the top row.
    let methods: Vec<String> = METHODS.iter().rev().map(|m| m.to_string()).collect();
    let n = domains.len() as f64;
    let top = (METHODS.len() - 1) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption("Per-Domain Scores Heatmap", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(160)
        .build_cartesian_2d(-0.5..(n - 0.5).max(0.5), -0.5..(top + 0.5))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(domains.len())
        .y_labels(METHODS.len())
        .x_label_formatter(&|x| category_label(&domains, *x))
        .y_label_formatter(&|y| category_label(&methods, *y))
        .draw()?;

    for m in 0..METHODS.len() {
        let y = top - m as f64;
        chart.draw_series(analysis.per_domain.iter().enumerate().map(|(d, row)| {
            let x = d as f64;
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                heat_color(row.scores()[m]).filled(),
            )
        }))?;
        chart.draw_series(analysis.per_domain.iter().enumerate().map(|(d, row)| {
            Text::new(
                format!("{:.3}", row.scores()[m]),
                (d as f64 - 0.12, y),
                ("sans-serif", 18).into_font(),
            )
        }))?;
    }
    Ok(())
}

/// Trajectory y-axis: `[min(0.3, lowest score), max(1.0, highest score)]`.
fn trajectory_range(analysis: &FinalAnalysis) -> (f64, f64) {
    let scores = analysis.per_domain.iter().flat_map(|r| r.scores());
    scores.fold((TRAJECTORY_FLOOR, 1.0), |(lo, hi), s| (lo.min(s), hi.max(s)))
}

fn draw_trajectory<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    analysis: &FinalAnalysis,
    mode: ScoringMode,
) -> DrawResult<DB> {
    let labels = method_labels();
    let (lo, hi) = trajectory_range(analysis);

    let mut chart = ChartBuilder::on(root)
        .caption("Score Trajectory Across Methods", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.2..(METHODS.len() as f64 - 0.8), lo..hi)?;

    chart
        .configure_mesh()
        .x_labels(METHODS.len())
        .x_label_formatter(&|x| category_label(&labels, *x))
        .y_desc(score_label(mode))
        .draw()?;

    for (d, row) in analysis.per_domain.iter().enumerate() {
        let color = DOMAIN_COLORS[d % DOMAIN_COLORS.len()];
        let points: Vec<(f64, f64)> = row
            .scores()
            .iter()
            .enumerate()
            .map(|(i, s)| (i as f64, *s))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))?
            .label(row.domain.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
        chart.draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 5, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::LowerRight)
        .draw()?;
    Ok(())
}

/// One block character per value, scaled into `[lo, hi]`.
fn sparkline(values: &[f64], lo: f64, hi: f64) -> String {
    let range = (hi - lo).max(0.001);
    values
        .iter()
        .map(|v| {
            let normalized = ((v - lo) / range).clamp(0.0, 1.0);
            SPARK_CHARS[((normalized * 7.0).round() as usize).min(7)]
        })
        .collect()
}

/// Terminal version of the trajectory figure, one sparkline per domain.
pub fn trajectory_preview(analysis: &FinalAnalysis) -> String {
    let (lo, hi) = trajectory_range(analysis);
    let domain_width = analysis
        .per_domain
        .iter()
        .map(|r| r.domain.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("Score trajectory: {}\n", METHODS.join(" → "));
    for row in &analysis.per_domain {
        let scores = row.scores();
        let values = scores
            .iter()
            .map(|s| format!("{s:.3}"))
            .collect::<Vec<_>>()
            .join(" → ");
        out.push_str(&format!(
            "{:<domain_width$}  {}  {values}\n",
            row.domain,
            sparkline(&scores, lo, hi)
        ));
    }
    out
}

fn figure_error(path: &Path, err: impl Display) -> AppError {
    AppError::Figure {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Writes the five figures for `analysis` as `<stem>[_reward].{png,svg}`.
pub fn render_analysis(
    analysis: &FinalAnalysis,
    results_dir: &Path,
    mode: ScoringMode,
) -> Result<Vec<PathBuf>, AppError> {
    let figures_dir = results_dir.join("figures");
    std::fs::create_dir_all(&figures_dir)?;

    let suffix = mode.file_suffix();
    let mut written = Vec::with_capacity(Figure::ALL.len() * 2);
    for figure in Figure::ALL {
        let png = figures_dir.join(format!("{}{suffix}.png", figure.stem()));
        {
            let root = BitMapBackend::new(&png, SIZE).into_drawing_area();
            figure
                .draw(&root, analysis, mode)
                .and_then(|_| root.present())
                .map_err(|e| figure_error(&png, e))?;
        }

        let svg = png.with_extension("svg");
        {
            let root = SVGBackend::new(&svg, SIZE).into_drawing_area();
            figure
                .draw(&root, analysis, mode)
                .and_then(|_| root.present())
                .map_err(|e| figure_error(&svg, e))?;
        }

        info!("Saved {}", png.display());
        written.push(png);
        written.push(svg);
    }
    Ok(written)
}
