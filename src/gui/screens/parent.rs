use eframe::egui::{self, RichText, ScrollArea};

use super::common::{
    attendance_history, conversation_list, conversation_view, report_card_view, MessageDraft,
};
use super::{ScreenCx, Screens};
use crate::ai::prompts::progress_summary_request;
use crate::ai::GenerationSlot;
use crate::fixtures::CURRENT_TERM;
use crate::gui::widgets;
use crate::navigation::{NavigationFrame, Props};
use crate::reports::{format_percent, report_card_summary, subject_averages};
use crate::views::{ParentRegistry, ParentView};

#[derive(Default)]
pub struct ParentScreens {
    selected_child: Option<String>,
    summary_for: String,
    summary: GenerationSlot<String>,
    message: MessageDraft,
}

impl Screens for ParentScreens {
    type Registry = ParentRegistry;

    fn render(
        &mut self,
        view: ParentView,
        frame: &NavigationFrame,
        ui: &mut egui::Ui,
        cx: &mut ScreenCx<'_>,
    ) {
        if view == ParentView::Conversation {
            conversation_view(ui, cx, frame, &mut self.message);
            return;
        }
        ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| match view {
                ParentView::Overview => overview(ui, cx),
                ParentView::Progress => self.progress(ui, cx, frame),
                ParentView::Attendance => {
                    if let Some((id, _)) = child_from(cx, frame) {
                        attendance_history(ui, cx, &id);
                    } else {
                        widgets::empty_state(ui, "Student not found.");
                    }
                }
                ParentView::ReportCard => report_card(ui, cx, frame),
                ParentView::ProgressSummary => self.progress_summary(ui, cx, frame),
                ParentView::Messages => conversation_list(ui, cx),
                ParentView::Conversation => {}
            });
    }

    fn poll(&mut self) -> bool {
        self.summary.poll();
        self.summary.is_in_flight()
    }
}

/// The child named by the frame, if it belongs to the signed-in parent.
fn child_from(cx: &ScreenCx<'_>, frame: &NavigationFrame) -> Option<(String, String)> {
    let id = frame.props.get_str("studentId")?;
    let store = cx.store.read();
    let child = store
        .children_of(&cx.session.user_id)
        .into_iter()
        .find(|s| s.id == id)
        .map(|s| (s.id.clone(), s.name.clone()));
    child
}

fn child_props(id: &str) -> Props {
    Props::new().with("studentId", id)
}

fn overview(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
    let store = cx.store.read();
    let children = store.children_of(&cx.session.user_id);
    ui.label(format!("Hello, {}", cx.session.display_name));
    if children.is_empty() {
        widgets::empty_state(ui, "No children linked to this account.");
        return;
    }
    for child in children {
        let summary = report_card_summary(&store, &child.id, CURRENT_TERM);
        let clicked = widgets::card(ui, cx.theme, |ui| {
            ui.label(RichText::new(&child.name).strong());
            if let Some(summary) = &summary {
                ui.label(format!(
                    "{} · average {} · attendance {}",
                    summary.class_name,
                    format_percent(summary.overall),
                    format_percent(summary.attendance)
                ));
            }
            ui.button("View progress").clicked()
        });
        if clicked {
            cx.nav.navigate_to(
                "progress",
                format!("{}'s Progress", child.name),
                child_props(&child.id),
            );
        }
        ui.add_space(4.0);
    }

    let upcoming: Vec<_> = store
        .latest_announcements(2)
        .map(|a| a.title.clone())
        .collect();
    if !upcoming.is_empty() {
        widgets::section(ui, "School news");
        for title in upcoming {
            ui.label(format!("• {title}"));
        }
    }
}

fn report_card(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>, frame: &NavigationFrame) {
    let Some((id, _)) = child_from(cx, frame) else {
        widgets::empty_state(ui, "Student not found.");
        return;
    };
    let summary = report_card_summary(&cx.store.read(), &id, CURRENT_TERM);
    match summary {
        Some(summary) if summary.published => report_card_view(ui, cx.theme, &summary),
        Some(_) => widgets::empty_state(
            ui,
            &format!("The {CURRENT_TERM} report card has not been published yet."),
        ),
        None => widgets::empty_state(ui, "Student not found."),
    }
}

impl ParentScreens {
    fn progress(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>, frame: &NavigationFrame) {
        let children: Vec<(String, String)> = cx
            .store
            .read()
            .children_of(&cx.session.user_id)
            .into_iter()
            .map(|s| (s.id.clone(), s.name.clone()))
            .collect();
        if children.is_empty() {
            widgets::empty_state(ui, "No children linked to this account.");
            return;
        }

        // Opened from the tab bar there is no student in the frame; fall back to a picker.
        let (id, name) = match child_from(cx, frame) {
            Some(child) => child,
            None => {
                let current = self
                    .selected_child
                    .as_ref()
                    .and_then(|id| children.iter().find(|(c, _)| c == id))
                    .unwrap_or(&children[0])
                    .clone();
                ui.horizontal(|ui| {
                    for (child_id, child_name) in &children {
                        if ui.selectable_label(*child_id == current.0, child_name).clicked() {
                            self.selected_child = Some(child_id.clone());
                        }
                    }
                });
                current
            }
        };

        let (subjects, recent) = {
            let store = cx.store.read();
            let grades = store.grades_for(&id);
            let recent: Vec<String> = grades
                .iter()
                .rev()
                .take(4)
                .map(|g| format!("{} · {}: {:.0}%", g.subject, g.assessment, g.percent()))
                .collect();
            (subject_averages(&grades), recent)
        };

        ui.label(RichText::new(&name).strong());
        widgets::section(ui, "Subjects");
        if subjects.is_empty() {
            widgets::empty_state(ui, "No marks recorded yet.");
        }
        for (subject, average) in &subjects {
            widgets::percent_bar(ui, subject, Some(*average));
        }
        if !recent.is_empty() {
            widgets::section(ui, "Recent marks");
            for line in recent {
                ui.label(line);
            }
        }

        widgets::section(ui, "More");
        ui.horizontal_wrapped(|ui| {
            if ui.button("Attendance").clicked() {
                cx.nav
                    .navigate_to("attendance", format!("{name} · Attendance"), child_props(&id));
            }
            if ui.button("Report card").clicked() {
                cx.nav
                    .navigate_to("reportCard", format!("{name} · Report Card"), child_props(&id));
            }
            if ui.button("AI summary").clicked() {
                cx.nav.navigate_to(
                    "progressSummary",
                    format!("{name} · Summary"),
                    child_props(&id),
                );
            }
        });
    }

    fn progress_summary(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>, frame: &NavigationFrame) {
        let Some((id, name)) = child_from(cx, frame) else {
            widgets::empty_state(ui, "Student not found.");
            return;
        };
        if self.summary_for != id {
            self.summary_for = id.clone();
            self.summary.clear();
        }

        ui.label(format!("A short, plain-language summary of how {name} is doing this term."));
        if ui
            .add_enabled(!self.summary.is_in_flight(), egui::Button::new("Summarize progress"))
            .clicked()
        {
            let card = report_card_summary(&cx.store.read(), &id, CURRENT_TERM);
            if let Some(card) = card {
                self.summary
                    .start(cx.ai, "progress_summary", progress_summary_request(&card), |o| {
                        Ok(o.into_text())
                    });
            }
        }
        widgets::generation_status(ui, &self.summary);
        if let Some(text) = self.summary.ready() {
            widgets::card(ui, cx.theme, |ui| widgets::render_markdown(ui, text));
        }
    }
}
