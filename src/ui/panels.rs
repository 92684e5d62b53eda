use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Save as SVG…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Close").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!("{} observations", state.observation_count));

        if let Some(msg) = &state.status_message {
            ui.separator();
            let text = RichText::new(msg);
            ui.label(if state.has_error() {
                text.color(Color32::RED)
            } else {
                text
            });
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Save chart")
        .set_file_name(format!("{}.svg", state.chart.kind.file_stem()))
        .add_filter("SVG", &["svg"])
        .save_file();

    if let Some(path) = file {
        state.save_svg(&path);
    }
}
