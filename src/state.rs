use std::path::Path;

use crate::export;
use crate::views::Chart;

// ---------------------------------------------------------------------------
// Window state
// ---------------------------------------------------------------------------

/// The full state of one chart window, independent of rendering.
pub struct ViewerState {
    /// The view shown in this window.
    pub chart: Chart,

    /// Number of observations the view was built from.
    pub observation_count: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl ViewerState {
    pub fn new(chart: Chart, observation_count: usize) -> Self {
        Self {
            chart,
            observation_count,
            status_message: None,
        }
    }

    /// Export the current view; failures are reported in the status line.
    pub fn save_svg(&mut self, path: &Path) {
        match export::export_chart(&self.chart, path) {
            Ok(()) => {
                self.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to save chart: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Whether the status line holds an error.
    pub fn has_error(&self) -> bool {
        self.status_message
            .as_deref()
            .is_some_and(|msg| msg.starts_with("Error"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ObservationTable;
    use crate::views::raw_series;

    #[test]
    fn save_reports_success_and_failure_in_the_status_line() {
        let mut state = ViewerState::new(raw_series(&ObservationTable::default()), 0);
        let dir = tempfile::tempdir().unwrap();

        state.save_svg(&dir.path().join("raw.svg"));
        assert!(state.status_message.as_deref().unwrap().starts_with("Saved"));
        assert!(!state.has_error());

        state.save_svg(&dir.path().join("missing").join("raw.svg"));
        assert!(state.has_error());
    }
}
