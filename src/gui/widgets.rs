use eframe::egui::{self, Align, Color32, Layout, ProgressBar, RichText};

use crate::ai::GenerationSlot;
use crate::role::TabSpec;
use crate::shell::HeaderModel;
use crate::theme::{parse_color, ThemeConfig};

#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderResponse {
    pub back: bool,
    pub search: bool,
    pub notifications: bool,
    pub logout: bool,
}

pub fn header(ui: &mut egui::Ui, model: &HeaderModel, theme: &ThemeConfig) -> HeaderResponse {
    let mut response = HeaderResponse::default();
    ui.horizontal(|ui| {
        if model.show_back && ui.button("<").on_hover_text("Back").clicked() {
            response.back = true;
        }
        ui.label(
            RichText::new(&model.title)
                .heading()
                .color(parse_color(&theme.accent)),
        );
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui.button("Sign out").clicked() {
                response.logout = true;
            }
            let bell = if model.badge > 0 {
                format!("Alerts ({})", model.badge)
            } else {
                "Alerts".to_string()
            };
            if ui.button(bell).clicked() {
                response.notifications = true;
            }
            if ui.button("Search").clicked() {
                response.search = true;
            }
        });
    });
    response
}

/// Returns the id of a tab the user clicked.
pub fn bottom_nav(ui: &mut egui::Ui, tabs: &'static [TabSpec], active: &str) -> Option<&'static str> {
    let mut picked = None;
    ui.columns(tabs.len().max(1), |cols| {
        for (col, tab) in cols.iter_mut().zip(tabs) {
            col.vertical_centered(|ui| {
                let text = format!("{}\n{}", tab.icon, tab.label);
                if ui.selectable_label(tab.id == active, text).clicked() {
                    picked = Some(tab.id);
                }
            });
        }
    });
    picked
}

pub fn placeholder(ui: &mut egui::Ui, text: &str) {
    ui.add_space(24.0);
    ui.vertical_centered(|ui| {
        ui.label(RichText::new(text).strong());
        ui.label("Use the back button or pick a tab below.");
    });
}

pub fn empty_state(ui: &mut egui::Ui, text: &str) {
    ui.add_space(12.0);
    ui.vertical_centered(|ui| ui.weak(text));
}

pub fn section(ui: &mut egui::Ui, title: &str) {
    ui.add_space(8.0);
    ui.label(RichText::new(title).strong());
    ui.separator();
}

pub fn card<R>(ui: &mut egui::Ui, theme: &ThemeConfig, add: impl FnOnce(&mut egui::Ui) -> R) -> R {
    egui::Frame::none()
        .fill(parse_color(&theme.surface))
        .stroke(egui::Stroke::new(1.0, parse_color(&theme.border)))
        .rounding(egui::Rounding::same(theme.radius))
        .inner_margin(egui::vec2(10.0, 8.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            add(ui)
        })
        .inner
}

pub fn stat_tiles(ui: &mut egui::Ui, theme: &ThemeConfig, stats: &[(&str, String)]) {
    ui.columns(stats.len().max(1), |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(stats) {
            card(col, theme, |ui| {
                ui.label(
                    RichText::new(value)
                        .size(20.0)
                        .strong()
                        .color(parse_color(&theme.accent)),
                );
                ui.label(RichText::new(*label).color(parse_color(&theme.muted_text)));
            });
        }
    });
}

/// Clickable row with a secondary line. Returns true when clicked.
pub fn nav_row(ui: &mut egui::Ui, title: &str, subtitle: &str) -> bool {
    let response = ui
        .horizontal(|ui| {
            let clicked = ui.selectable_label(false, RichText::new(title).strong()).clicked();
            ui.weak(subtitle);
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.weak(">");
            });
            clicked
        })
        .inner;
    ui.separator();
    response
}

pub fn percent_bar(ui: &mut egui::Ui, label: &str, percent: Option<f32>) {
    ui.horizontal(|ui| {
        ui.label(label);
        match percent {
            Some(p) => {
                ui.add(
                    ProgressBar::new(p / 100.0)
                        .fill(score_color(p))
                        .text(format!("{p:.1}%")),
                );
            }
            None => {
                ui.weak("no data");
            }
        }
    });
}

pub fn field_error(ui: &mut egui::Ui, error: &Option<String>) {
    if let Some(message) = error {
        ui.colored_label(Color32::from_rgb(200, 60, 60), message);
    }
}

pub fn info_line(ui: &mut egui::Ui, message: &Option<String>) {
    if let Some(message) = message {
        ui.colored_label(Color32::from_rgb(40, 140, 80), message);
    }
}

/// Spinner while a request runs, the apology once it fails.
pub fn generation_status<T: Send + 'static>(ui: &mut egui::Ui, slot: &GenerationSlot<T>) {
    if slot.is_in_flight() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Generating...");
        });
    } else if let Some(message) = slot.failure_message() {
        ui.colored_label(Color32::from_rgb(200, 60, 60), message);
    }
}

pub fn render_markdown(ui: &mut egui::Ui, text: &str) {
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(h) = trimmed.strip_prefix("# ") {
            ui.heading(h.trim());
        } else if let Some(h) = trimmed.strip_prefix("## ") {
            ui.label(RichText::new(h.trim()).strong());
        } else if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            ui.label(format!("• {}", item.trim()));
        } else if trimmed.is_empty() {
            ui.add_space(6.0);
        } else {
            ui.add(egui::Label::new(trimmed.trim_matches('*')).wrap(true));
        }
    }
}

pub fn chat_bubble(ui: &mut egui::Ui, theme: &ThemeConfig, sender: &str, text: &str, mine: bool) {
    let (fill, stroke, text_color) = if mine {
        (
            parse_color(&theme.accent_soft),
            parse_color(&theme.accent),
            parse_color(&theme.accent),
        )
    } else {
        (
            parse_color(&theme.surface),
            parse_color(&theme.border),
            parse_color(&theme.text),
        )
    };
    let layout = if mine {
        Layout::right_to_left(Align::Min)
    } else {
        Layout::left_to_right(Align::Min)
    };
    let max_width = ui.available_width() * 0.85;
    ui.add_space(4.0);
    ui.with_layout(layout, |ui| {
        egui::Frame::none()
            .fill(fill)
            .stroke(egui::Stroke::new(1.0, stroke))
            .rounding(egui::Rounding::same(6.0))
            .inner_margin(egui::vec2(10.0, 8.0))
            .show(ui, |ui| {
                ui.set_max_width(max_width);
                ui.label(
                    RichText::new(sender)
                        .strong()
                        .color(parse_color(&theme.muted_text)),
                );
                ui.add(egui::Label::new(RichText::new(text).color(text_color)).wrap(true));
            });
    });
}

pub fn score_color(score: f32) -> Color32 {
    let t = (score / 100.0).clamp(0.0, 1.0);
    let r = ((1.0 - t) * 255.0) as u8;
    let g = (t * 200.0 + 55.0).min(255.0) as u8;
    Color32::from_rgb(r, g, 64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_color_runs_red_to_green() {
        let low = score_color(0.0);
        let high = score_color(100.0);
        assert!(low.r() > high.r());
        assert!(high.g() > low.g());
        assert_eq!(score_color(150.0), high);
    }
}
