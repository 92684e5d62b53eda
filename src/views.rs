use chrono::{Days, NaiveDate};
use eframe::egui::Color32;

use crate::color::{self, MonthPalette};
use crate::config::ROLLING_WINDOW;
use crate::data::aggregate::{rolling_mean, MonthlyAverages};
use crate::data::model::ObservationTable;

// ---------------------------------------------------------------------------
// View identity
// ---------------------------------------------------------------------------

/// The three chart views, in the order they are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    RawSeries,
    RollingMean,
    MonthlyAverage,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::RawSeries,
        ChartKind::RollingMean,
        ChartKind::MonthlyAverage,
    ];

    /// File name (without extension) used by the exporter.
    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::RawSeries => "raw_series",
            ChartKind::RollingMean => "rolling_mean",
            ChartKind::MonthlyAverage => "monthly_average",
        }
    }
}

// ---------------------------------------------------------------------------
// Date axis
// ---------------------------------------------------------------------------

/// 1970-01-01, which is `NaiveDate`'s default.
fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Plot coordinate of a date: days since 1970-01-01.
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.signed_duration_since(epoch()).num_days() as f64
}

/// Inverse of [`date_to_x`], rounding to the nearest day.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() {
        return None;
    }
    let days = x.round() as i64;
    if days >= 0 {
        epoch().checked_add_days(Days::new(days as u64))
    } else {
        epoch().checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

// ---------------------------------------------------------------------------
// Chart model
// ---------------------------------------------------------------------------

/// A polyline drawn against the date axis.  Undefined stretches split the
/// line into separate segments.
#[derive(Debug, Clone)]
pub struct Series {
    /// Legend label; `None` keeps the series out of the legend.
    pub label: Option<String>,
    pub color: Color32,
    pub segments: Vec<Vec<[f64; 2]>>,
}

impl Series {
    fn from_points(
        label: Option<&str>,
        color: Color32,
        points: impl IntoIterator<Item = Option<[f64; 2]>>,
    ) -> Self {
        let mut segments: Vec<Vec<[f64; 2]>> = Vec::new();
        let mut current = Vec::new();
        for point in points {
            match point {
                Some(p) => current.push(p),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        Self {
            label: label.map(str::to_string),
            color,
            segments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All points of all segments.
    pub fn points(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.segments.iter().flatten().copied()
    }
}

/// Bars for one month across all years of the pivot.
#[derive(Debug, Clone)]
pub struct MonthBars {
    pub month: u32,
    pub color: Color32,
    /// `(x centre, mean)` for each year that has data for this month.
    pub bars: Vec<(f64, f64)>,
}

/// Grouped bar layout: year `k` is centred at `x = k`, its month bars share
/// half of the unit slot.
#[derive(Debug, Clone)]
pub struct GroupedBars {
    pub years: Vec<i32>,
    pub bar_width: f64,
    pub months: Vec<MonthBars>,
}

impl GroupedBars {
    const GROUP_WIDTH: f64 = 0.5;

    fn from_monthly(monthly: &MonthlyAverages, palette: &MonthPalette) -> Self {
        let years = monthly.years();
        let months = monthly.months();
        let bar_width = Self::GROUP_WIDTH / months.len().max(1) as f64;

        let months = months
            .iter()
            .enumerate()
            .map(|(j, &month)| {
                let offset = -Self::GROUP_WIDTH / 2.0 + (j as f64 + 0.5) * bar_width;
                let bars = years
                    .iter()
                    .enumerate()
                    .filter_map(|(k, &year)| {
                        monthly.get(year, month).map(|mean| (k as f64 + offset, mean))
                    })
                    .collect();
                MonthBars {
                    month,
                    color: palette.color_for(month),
                    bars,
                }
            })
            .collect();

        Self {
            years,
            bar_width,
            months,
        }
    }

    /// Year label for a category position, if it falls on one.
    pub fn year_at(&self, x: f64) -> Option<i32> {
        year_at(&self.years, x)
    }
}

/// Year whose group is centred at category position `x`.
pub fn year_at(years: &[i32], x: f64) -> Option<i32> {
    if (x - x.round()).abs() > 1e-6 || x < 0.0 {
        return None;
    }
    years.get(x.round() as usize).copied()
}

/// What a chart draws.
#[derive(Debug, Clone)]
pub enum ChartBody {
    /// Date-indexed lines.
    Lines(Vec<Series>),
    /// Year groups of month bars.
    Bars(GroupedBars),
}

/// A fully computed chart view, independent of how it is displayed.
#[derive(Debug, Clone)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// Legend title, when the legend has one.
    pub legend_title: Option<&'static str>,
    pub body: ChartBody,
}

impl Chart {
    /// Build `kind` from a borrowed table.  Derived columns live only in the
    /// returned chart; the table is never modified.
    pub fn build(kind: ChartKind, table: &ObservationTable) -> Self {
        match kind {
            ChartKind::RawSeries => raw_series(table),
            ChartKind::RollingMean => rolling_mean_overlay(table, ROLLING_WINDOW),
            ChartKind::MonthlyAverage => monthly_average(table),
        }
    }

    /// Whether the chart has a legend.
    pub fn has_legend(&self) -> bool {
        match &self.body {
            ChartBody::Lines(series) => series.iter().any(|s| s.label.is_some()),
            ChartBody::Bars(bars) => !bars.months.is_empty(),
        }
    }

    /// Data extent as `(x_min, x_max, y_min, y_max)`, or `None` if empty.
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        let points: Vec<[f64; 2]> = match &self.body {
            ChartBody::Lines(series) => series.iter().flat_map(Series::points).collect(),
            ChartBody::Bars(bars) => bars
                .months
                .iter()
                .flat_map(|m| m.bars.iter())
                .flat_map(|&(x, y)| {
                    let half = bars.bar_width / 2.0;
                    [[x - half, 0.0], [x + half, y]]
                })
                .collect(),
        };
        points.iter().fold(None, |acc, &[x, y]| {
            let (x0, x1, y0, y1) = acc.unwrap_or((x, x, y, y));
            Some((x0.min(x), x1.max(x), y0.min(y), y1.max(y)))
        })
    }
}

// ---------------------------------------------------------------------------
// View builders
// ---------------------------------------------------------------------------

fn daily_points(table: &ObservationTable) -> impl Iterator<Item = Option<[f64; 2]>> + '_ {
    table
        .observations
        .iter()
        .map(|o| (!o.value.is_nan()).then(|| [date_to_x(o.date), o.value]))
}

/// Value against date, single line.
pub fn raw_series(table: &ObservationTable) -> Chart {
    Chart {
        kind: ChartKind::RawSeries,
        title: "Daily Page Views",
        x_label: "Date",
        y_label: "Page Views",
        legend_title: None,
        body: ChartBody::Lines(vec![Series::from_points(
            None,
            color::SKY_BLUE,
            daily_points(table),
        )]),
    }
}

/// Daily values with a trailing `window`-period mean drawn on top.
pub fn rolling_mean_overlay(table: &ObservationTable, window: usize) -> Chart {
    let means = rolling_mean(&table.values(), window);
    let daily = Series::from_points(
        Some("Daily"),
        color::SKY_BLUE.gamma_multiply(color::OVERLAY_ALPHA),
        daily_points(table),
    );
    let label = format!("{window}-day Rolling Mean");
    let smoothed = Series::from_points(
        Some(label.as_str()),
        color::ORANGE,
        table
            .observations
            .iter()
            .zip(&means)
            .map(|(o, m)| m.map(|mean| [date_to_x(o.date), mean])),
    );

    let mut series = vec![daily];
    if smoothed.is_empty() {
        log::warn!(
            "Rolling mean undefined: {} observations for a {window}-day window",
            table.len()
        );
    } else {
        series.push(smoothed);
    }

    Chart {
        kind: ChartKind::RollingMean,
        title: "Daily Page Views with Rolling Mean",
        x_label: "Date",
        y_label: "Page Views",
        legend_title: None,
        body: ChartBody::Lines(series),
    }
}

/// Per-month means grouped by year.
pub fn monthly_average(table: &ObservationTable) -> Chart {
    let monthly = MonthlyAverages::from_table(table);
    log::info!(
        "Monthly averages: {} months over {} years",
        monthly.len(),
        monthly.years().len()
    );

    Chart {
        kind: ChartKind::MonthlyAverage,
        title: "Monthly Average Page Views",
        x_label: "Year",
        y_label: "Average Page Views",
        legend_title: Some("Month"),
        body: ChartBody::Bars(GroupedBars::from_monthly(&monthly, &MonthPalette::default())),
    }
}
