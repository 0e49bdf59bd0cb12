use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use rusty_survey::{CohortTable, N_QUESTIONS, QUESTION_COLUMNS};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – settings, imputed rows, cohort table
// ---------------------------------------------------------------------------

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Settings");
    ui.separator();

    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Max missing answers per subject");
        changed |= ui
            .add(egui::DragValue::new(&mut state.config.maximal_nans_per_sub).range(0..=N_QUESTIONS))
            .changed();
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Age threshold");
        changed |= ui
            .add(
                egui::DragValue::new(&mut state.config.age_threshold)
                    .range(0.0..=120.0)
                    .speed(1.0),
            )
            .changed();
    });
    if changed {
        let result = state.apply_config();
        state.report("Apply settings", result);
    }

    ui.separator();

    let Some(session) = &state.session else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Legend ----
            if let Some(cm) = &state.color_map {
                ui.strong("Genders");
                ui.horizontal_wrapped(|ui: &mut Ui| {
                    for (label, color) in cm.legend_entries() {
                        ui.label(RichText::new(format!("■ {label}")).color(color));
                    }
                });
                ui.separator();
            }

            // ---- Imputation summary ----
            let header_text = format!("Imputed rows  ({})", state.imputed_rows.len());
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("imputed_rows")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for &i in &state.imputed_rows {
                        if let Some(row) = session.data.rows.get(i) {
                            ui.label(format!("#{i}: {row}"));
                        }
                    }
                });

            // ---- Scores ----
            if let Some(scores) = session.data.scores() {
                let scored = scores.iter().flatten().count();
                ui.label(format!("{scored} of {} subjects scored", scores.len()));
            }
            ui.separator();

            // ---- Cohort table ----
            if let Some(cohorts) = &state.cohorts {
                ui.strong("Cohort means");
                cohort_table(ui, cohorts);
            }
        });
}

fn cohort_table(ui: &mut Ui, cohorts: &CohortTable) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .columns(Column::auto(), N_QUESTIONS)
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("gender");
            });
            header.col(|ui| {
                ui.strong(format!("> {}", cohorts.age_threshold));
            });
            header.col(|ui| {
                ui.strong("n");
            });
            for col in QUESTION_COLUMNS {
                header.col(|ui| {
                    ui.strong(col);
                });
            }
        })
        .body(|mut body| {
            for row in &cohorts.rows {
                body.row(18.0, |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(row.key.gender.as_str());
                    });
                    table_row.col(|ui| {
                        ui.label(row.key.above_threshold.to_string());
                    });
                    table_row.col(|ui| {
                        ui.label(row.members.to_string());
                    });
                    for mean in &row.means {
                        table_row.col(|ui| {
                            ui.label(mean.map_or_else(|| "NaN".to_string(), |m| format!("{m:.2}")));
                        });
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / pipeline toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.session.is_some(), egui::Button::new("Export JSON…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let loaded = state.session.is_some();
        if ui
            .add_enabled(loaded, egui::Button::new("Remove invalid emails"))
            .clicked()
        {
            let result = state.remove_invalid_emails();
            state.report("Remove invalid emails", result);
        }
        if ui
            .add_enabled(loaded, egui::Button::new("Fill missing answers"))
            .clicked()
        {
            let result = state.fill_missing();
            state.report("Fill missing answers", result);
        }
        if ui.add_enabled(loaded, egui::Button::new("Score")).clicked() {
            let result = state.score();
            state.report("Score", result);
        }

        ui.separator();

        if let Some(session) = &state.session {
            ui.label(format!(
                "{} responses from {}",
                session.data.len(),
                session.data_fname().display()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open questionnaire data")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        let result = state.open(&path);
        state.report("Open", result);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export table as JSON")
        .set_file_name("cleaned.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        let result = state.export(&path);
        state.report("Export", result);
    }
}
