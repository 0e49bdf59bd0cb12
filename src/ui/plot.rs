use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};
use rusty_survey::{AgeHistogram, CohortTable, N_QUESTIONS, QUESTION_COLUMNS};

use crate::color::ColorMap;
use crate::state::AppState;

/// Horizontal room each question gets in the cohort chart.
const GROUP_WIDTH: f64 = 0.8;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the age histogram above the cohort means.
pub fn plots(ui: &mut Ui, state: &AppState) {
    if state.session.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to analyse responses  (File → Open…)");
        });
        return;
    }

    let half = (ui.available_height() / 2.0 - 8.0).max(120.0);

    if let Some(hist) = &state.histogram {
        ui.strong("Age distribution");
        age_histogram_plot(ui, hist, half);
    }
    ui.separator();
    if let (Some(cohorts), Some(colors)) = (&state.cohorts, &state.color_map) {
        ui.strong(format!(
            "Mean answer by gender and age > {}",
            cohorts.age_threshold
        ));
        cohort_plot(ui, cohorts, colors, half);
    }
}

// ---------------------------------------------------------------------------
// Age histogram
// ---------------------------------------------------------------------------

fn age_histogram_plot(ui: &mut Ui, hist: &AgeHistogram, height: f32) {
    let bars: Vec<Bar> = hist
        .bins()
        .enumerate()
        .map(|(i, (lo, hi, count))| {
            Bar::new((lo + hi) / 2.0, count as f64)
                .width(hi - lo)
                .name(hist.bin_label(i))
        })
        .collect();

    Plot::new("age_histogram")
        .height(height)
        .x_axis_label("Age")
        .y_axis_label("Participants")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .color(Color32::LIGHT_BLUE)
                    .name("participants"),
            );
        });
}

// ---------------------------------------------------------------------------
// Cohort means
// ---------------------------------------------------------------------------

/// One bar group per question, one bar per cohort. Cohorts above the age
/// threshold are drawn in a darker shade of their gender colour.
fn cohort_plot(ui: &mut Ui, cohorts: &CohortTable, colors: &ColorMap, height: f32) {
    let n = cohorts.len().max(1) as f64;
    let bar_width = GROUP_WIDTH / n;

    Plot::new("cohort_means")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Question")
        .y_axis_label("Mean answer")
        .x_axis_formatter(|mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() < 1e-6 && (0.0..N_QUESTIONS as f64).contains(&idx) {
                QUESTION_COLUMNS[idx as usize].to_string()
            } else {
                String::new()
            }
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (k, row) in cohorts.rows.iter().enumerate() {
                let offset = (k as f64 + 0.5) * bar_width - GROUP_WIDTH / 2.0;
                let bars: Vec<Bar> = row
                    .means
                    .iter()
                    .enumerate()
                    .filter_map(|(j, mean)| {
                        mean.map(|m| Bar::new(j as f64 + offset, m).width(bar_width * 0.95))
                    })
                    .collect();

                let mut color = colors.color_for(&row.key.gender);
                if row.key.above_threshold {
                    color = color.gamma_multiply(0.6);
                }

                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(color)
                        .name(format!("{} (n={})", row.key, row.members)),
                );
            }
        });
}
