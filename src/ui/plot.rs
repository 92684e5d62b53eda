use eframe::egui::{Align, Layout, Ui};
use egui_plot::{Bar, BarChart, Corner, Legend, Line, Plot, PlotPoints};

use crate::color::month_name;
use crate::state::ViewerState;
use crate::views::{x_to_date, year_at, ChartBody, GroupedBars, Series};

// ---------------------------------------------------------------------------
// Chart plot (central panel)
// ---------------------------------------------------------------------------

/// Render the window's chart view in the central panel.
pub fn chart_plot(ui: &mut Ui, state: &ViewerState) {
    let chart = &state.chart;

    let mut plot = Plot::new(chart.kind.file_stem())
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if chart.has_legend() {
        plot = plot.legend(Legend::default().position(Corner::RightTop));
        if let Some(title) = chart.legend_title {
            ui.with_layout(Layout::right_to_left(Align::Min), |ui: &mut Ui| {
                ui.strong(title);
            });
        }
    }

    match &chart.body {
        ChartBody::Lines(series) => {
            plot.x_axis_formatter(|mark, _range| date_label(mark.value))
                .label_formatter(|name, point| {
                    let date = date_label(point.x);
                    if name.is_empty() {
                        format!("{date}\n{:.1}", point.y)
                    } else {
                        format!("{name}\n{date}\n{:.1}", point.y)
                    }
                })
                .show(ui, |plot_ui| {
                    for s in series {
                        for line in series_lines(s) {
                            plot_ui.line(line);
                        }
                    }
                });
        }
        ChartBody::Bars(bars) => {
            let years = bars.years.clone();
            plot.x_axis_formatter(move |mark, _range| year_label(&years, mark.value))
                .include_y(0.0)
                .show(ui, |plot_ui| {
                    for chart in month_charts(bars) {
                        plot_ui.bar_chart(chart);
                    }
                });
        }
    }
}

fn date_label(x: f64) -> String {
    x_to_date(x)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn year_label(years: &[i32], x: f64) -> String {
    year_at(years, x).map(|y| y.to_string()).unwrap_or_default()
}

/// One egui line per contiguous segment; segments of a series share a name
/// so the legend shows a single entry.
fn series_lines(series: &Series) -> Vec<Line<'_>> {
    series
        .segments
        .iter()
        .map(|segment| {
            let points: PlotPoints = segment.iter().copied().collect();
            let line = Line::new(points).color(series.color).width(1.5);
            match &series.label {
                Some(label) => line.name(label),
                None => line,
            }
        })
        .collect()
}

/// One bar chart per month so each month gets a legend entry.
fn month_charts(bars: &GroupedBars) -> Vec<BarChart> {
    bars.months
        .iter()
        .map(|month| {
            let items: Vec<Bar> = month
                .bars
                .iter()
                .map(|&(x, mean)| Bar::new(x, mean).width(bars.bar_width))
                .collect();
            BarChart::new(items)
                .name(month_name(month.month))
                .color(month.color)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_labels_only_on_group_centres() {
        let years = [2019, 2020];
        assert_eq!(year_label(&years, 0.0), "2019");
        assert_eq!(year_label(&years, 1.0), "2020");
        assert_eq!(year_label(&years, 0.5), "");
        assert_eq!(year_label(&years, -1.0), "");
        assert_eq!(year_label(&years, 2.0), "");
    }

    #[test]
    fn date_labels_follow_the_day_axis() {
        assert_eq!(date_label(0.0), "1970-01-01");
        assert_eq!(date_label(31.0), "1970-02-01");
        assert_eq!(date_label(f64::INFINITY), "");
    }
}
