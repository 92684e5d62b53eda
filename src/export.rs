use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use eframe::egui::Color32;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::color::month_name;
use crate::config::CHART_SIZE;
use crate::data::model::ObservationTable;
use crate::views::{x_to_date, Chart, ChartBody, ChartKind, GroupedBars, Series};

// ---------------------------------------------------------------------------
// Batch export
// ---------------------------------------------------------------------------

/// Write every chart view of `table` as an SVG file into `dir`, creating the
/// directory if needed.  Returns the written paths in view order.
pub fn export_all(table: &ObservationTable, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating export directory {}", dir.display()))?;

    ChartKind::ALL
        .iter()
        .map(|&kind| {
            let chart = Chart::build(kind, table);
            let path = dir.join(format!("{}.svg", kind.file_stem()));
            export_chart(&chart, &path)?;
            Ok(path)
        })
        .collect()
}

/// Render one chart to an SVG file.
pub fn export_chart(chart: &Chart, path: &Path) -> Result<()> {
    let svg = render_svg(chart)?;
    std::fs::write(path, svg).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote '{}' to {}", chart.title, path.display());
    Ok(())
}

/// Render one chart to an SVG document.
pub fn render_svg(chart: &Chart) -> Result<String> {
    let size = (CHART_SIZE[0] as u32, CHART_SIZE[1] as u32);
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_chart(&root, chart).map_err(|e| anyhow!("drawing '{}': {e}", chart.title))?;
        root.present()
            .map_err(|e| anyhow!("finishing '{}': {e}", chart.title))?;
    }
    Ok(svg)
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

fn to_rgba(color: Color32) -> RGBAColor {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    RGBAColor(r, g, b, f64::from(a) / 255.0)
}

/// Widen `[lo, hi]` by a small margin so data does not touch the frame.
fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo - span * 0.02, hi + span * 0.02)
    }
}

/// Dates for line charts, year categories for bar charts.
fn x_tick_label(body: &ChartBody, x: f64) -> String {
    match body {
        ChartBody::Lines(_) => x_to_date(x)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        ChartBody::Bars(bars) => bars.year_at(x).map(|y| y.to_string()).unwrap_or_default(),
    }
}

fn draw_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, chart: &Chart) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let (x0, x1, y0, y1) = chart.extent().unwrap_or((0.0, 1.0, 0.0, 1.0));
    let (x_range, y_range) = match &chart.body {
        ChartBody::Lines(_) => (padded(x0, x1), padded(y0, y1)),
        ChartBody::Bars(bars) => (
            (-0.5, bars.years.len().max(1) as f64 - 0.5),
            (y0.min(0.0), y1.max(0.0) * 1.05 + f64::EPSILON),
        ),
    };

    let mut ctx = ChartBuilder::on(root)
        .caption(chart.title, ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;

    let x_formatter = |x: &f64| x_tick_label(&chart.body, *x);

    let mut mesh = ctx.configure_mesh();
    mesh.x_desc(chart.x_label)
        .y_desc(chart.y_label)
        .x_label_formatter(&x_formatter);
    if let ChartBody::Bars(bars) = &chart.body {
        mesh.disable_x_mesh().x_labels(bars.years.len() * 2 + 1);
    }
    mesh.draw()?;

    match &chart.body {
        ChartBody::Lines(series) => {
            for s in series {
                draw_series_line(&mut ctx, s)?;
            }
        }
        ChartBody::Bars(bars) => draw_grouped_bars(&mut ctx, bars)?,
    }

    if chart.has_legend() {
        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        if let Some(title) = chart.legend_title {
            // Right-aligned just above the plot frame, over the legend box.
            let (xs, ys) = ctx.plotting_area().get_pixel_range();
            let style = TextStyle::from(("sans-serif", 14).into_font())
                .pos(Pos::new(HPos::Right, VPos::Bottom));
            root.draw(&Text::new(title, (xs.end - 5, ys.start - 2), style))?;
        }
    }
    Ok(())
}

fn draw_series_line<DB: DrawingBackend>(
    ctx: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    series: &Series,
) -> DrawResult<DB> {
    let color = to_rgba(series.color);
    for (i, segment) in series.segments.iter().enumerate() {
        let anno = ctx.draw_series(LineSeries::new(
            segment.iter().map(|p| (p[0], p[1])),
            color.stroke_width(2),
        ))?;
        // One legend entry per series, not per segment.
        if let (0, Some(label)) = (i, &series.label) {
            anno.label(label).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        }
    }
    Ok(())
}

fn draw_grouped_bars<DB: DrawingBackend>(
    ctx: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    bars: &GroupedBars,
) -> DrawResult<DB> {
    let half = bars.bar_width / 2.0;
    for month in &bars.months {
        let color = to_rgba(month.color);
        ctx.draw_series(month.bars.iter().map(|&(x, mean)| {
            Rectangle::new([(x - half, 0.0), (x + half, mean)], color.filled())
        }))?
        .label(month_name(month.month))
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use super::*;
    use crate::data::model::Observation;

    fn sample_table(days: u64) -> ObservationTable {
        let start = NaiveDate::from_ymd_opt(2020, 11, 15).unwrap();
        (0..days)
            .map(|i| Observation::new(start + Days::new(i), 100.0 + (i % 7) as f64))
            .collect()
    }

    #[test]
    fn export_all_writes_one_svg_per_view() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts");
        let paths = export_all(&sample_table(90), &out).unwrap();

        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["raw_series.svg", "rolling_mean.svg", "monthly_average.svg"]);
        for path in &paths {
            let svg = std::fs::read_to_string(path).unwrap();
            assert!(svg.contains("<svg"));
        }
    }

    #[test]
    fn svg_carries_titles_and_legend_labels() {
        let table = sample_table(90);

        let svg = render_svg(&Chart::build(ChartKind::RollingMean, &table)).unwrap();
        assert!(svg.contains("Daily Page Views with Rolling Mean"));
        assert!(svg.contains("30-day Rolling Mean"));

        let svg = render_svg(&Chart::build(ChartKind::MonthlyAverage, &table)).unwrap();
        assert!(svg.contains("Monthly Average Page Views"));
        assert!(svg.contains("Nov"));
        assert!(svg.contains("Jan"));
        assert!(svg.contains(">\nMonth\n</text>"));

        let svg = render_svg(&Chart::build(ChartKind::RawSeries, &table)).unwrap();
        assert!(!svg.contains(">\nMonth\n</text>"));
    }

    #[test]
    fn single_observation_still_renders() {
        let svg = render_svg(&Chart::build(ChartKind::RawSeries, &sample_table(1))).unwrap();
        assert!(svg.contains("Daily Page Views"));
    }

    #[test]
    fn padding_handles_flat_ranges() {
        assert_eq!(padded(5.0, 5.0), (4.0, 6.0));
        let (lo, hi) = padded(0.0, 100.0);
        assert!(lo < 0.0 && hi > 100.0);
    }
}
