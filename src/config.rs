use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Fixed analysis parameters
// ---------------------------------------------------------------------------

/// Input file used when no path is given on the command line.
pub const DEFAULT_INPUT: &str = "page_views.csv";

/// Trailing window of the rolling-mean view, in observations.
pub const ROLLING_WINDOW: usize = 30;

/// Lower quantile kept by the outlier filter.
pub const LOWER_QUANTILE: f64 = 0.025;

/// Upper quantile kept by the outlier filter.
pub const UPPER_QUANTILE: f64 = 0.975;

/// Chart size in pixels, for both windows and exported files.
pub const CHART_SIZE: [f32; 2] = [1400.0, 700.0];

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Where the three chart views go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// One native window per view, opened in sequence.
    Interactive,
    /// One SVG file per view, written into this directory.
    Export(PathBuf),
}

/// Fully resolved settings for a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: Output,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: Output::Interactive,
        }
    }
}

impl RunConfig {
    /// Overlay command-line choices on the defaults.
    pub fn resolve(input: Option<PathBuf>, export_dir: Option<PathBuf>) -> Self {
        let defaults = Self::default();
        Self {
            input: input.unwrap_or(defaults.input),
            output: export_dir.map(Output::Export).unwrap_or(defaults.output),
        }
    }
}
