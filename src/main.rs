mod app;
mod color;
mod config;
mod data;
mod error;
mod export;
mod state;
mod ui;
mod views;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;

use app::ChartWindowApp;
use config::{Output, RunConfig, CHART_SIZE};
use data::model::ObservationTable;
use error::PipelineError;
use views::{Chart, ChartKind};

/// Plot a daily page-view series: raw values, a 30-day rolling mean and
/// monthly averages, after dropping outliers outside the 2.5%–97.5% band.
#[derive(Parser)]
#[command(name = "page-views", version, long_about = None)]
struct Cli {
    /// Input file (csv, tsv, json or parquet) with `date` and `value` columns
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Write the three charts as SVG files into DIR instead of opening windows
    #[arg(short, long, value_name = "DIR")]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = RunConfig::resolve(cli.input, cli.export);

    let table = prepare_table(&config.input)?;

    match &config.output {
        Output::Interactive => {
            for kind in ChartKind::ALL {
                show_window(Chart::build(kind, &table), table.len())?;
            }
        }
        Output::Export(dir) => {
            for path in export::export_all(&table, dir)? {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

/// Load the series and drop outliers.  An empty result is fatal.
fn prepare_table(input: &Path) -> Result<ObservationTable> {
    let table = data::loader::load_file(input)?;
    let outcome = data::filter::remove_outliers(table);
    if outcome.table.is_empty() {
        log::error!("All {} observations were removed by the outlier filter", outcome.removed);
        return Err(PipelineError::EmptyTable.into());
    }
    Ok(outcome.table)
}

/// Open a native window for one view and block until it is closed.
fn show_window(chart: Chart, observation_count: usize) -> Result<()> {
    let title = chart.title;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title)
            .with_inner_size(CHART_SIZE)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    log::info!("Showing '{title}'");
    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| Ok(Box::new(ChartWindowApp::new(chart, observation_count)))),
    )
    .map_err(|e| anyhow!("chart window '{title}' failed: {e}"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn csv_file(rows: impl IntoIterator<Item = (String, String)>) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "date,value").unwrap();
        for (date, value) in rows {
            writeln!(file, "{date},{value}").unwrap();
        }
        file
    }

    #[test]
    fn cli_accepts_input_and_export_dir() {
        let cli = Cli::parse_from(["page-views", "views.csv", "--export", "charts"]);
        assert_eq!(cli.input, Some(PathBuf::from("views.csv")));
        assert_eq!(cli.export, Some(PathBuf::from("charts")));

        let cli = Cli::parse_from(["page-views"]);
        assert!(cli.input.is_none() && cli.export.is_none());
    }

    #[test]
    fn pipeline_drops_injected_outliers() {
        let start = chrono::NaiveDate::from_ymd_opt(2016, 5, 9).unwrap();
        let rows = (0..100u64).map(|i| {
            let value = match i {
                5 => 10_000.0,
                50 => -10_000.0,
                _ => (i + 1) as f64,
            };
            ((start + chrono::Days::new(i)).to_string(), value.to_string())
        });
        let file = csv_file(rows);

        let table = prepare_table(file.path()).unwrap();
        assert!(table.observations.iter().all(|o| o.value.abs() < 10_000.0));
        assert_eq!(table.len(), 94);
    }

    #[test]
    fn pipeline_rolling_mean_on_a_month_of_days() {
        let start = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let values: Vec<f64> = (1..=31).map(f64::from).collect();
        let table: ObservationTable = values
            .iter()
            .enumerate()
            .map(|(i, &v)| data::model::Observation::new(start + chrono::Days::new(i as u64), v))
            .collect();

        let means = data::aggregate::rolling_mean(&table.values(), config::ROLLING_WINDOW);
        assert_eq!(means[30], Some(16.5));
    }

    #[test]
    fn pipeline_fails_when_nothing_survives_filtering() {
        let file = csv_file([("2020-01-01".to_string(), String::new())]);
        let err = prepare_table(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::EmptyTable)
        ));
    }

    #[test]
    fn pipeline_propagates_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(prepare_table(&dir.path().join("page_views.csv")).is_err());
    }

    #[test]
    fn export_mode_writes_three_files() {
        let start = chrono::NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        let file = csv_file((0..60u64).map(|i| {
            ((start + chrono::Days::new(i)).to_string(), (500 + i * 3).to_string())
        }));
        let out = tempfile::tempdir().unwrap();

        let table = prepare_table(file.path()).unwrap();
        let paths = export::export_all(&table, out.path()).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.exists()));
    }
}
