use eframe::egui;

use crate::state::ViewerState;
use crate::ui::{panels, plot};
use crate::views::Chart;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

/// One window showing one chart view.
pub struct ChartWindowApp {
    pub state: ViewerState,
}

impl ChartWindowApp {
    pub fn new(chart: Chart, observation_count: usize) -> Self {
        Self {
            state: ViewerState::new(chart, observation_count),
        }
    }
}

impl eframe::App for ChartWindowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| ui.heading(self.state.chart.title));
            plot::chart_plot(ui, &self.state);
        });
    }
}
