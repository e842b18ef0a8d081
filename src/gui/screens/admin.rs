use eframe::egui::{self, RichText, ScrollArea, TextEdit};

use super::common::report_card_view;
use super::{require, ScreenCx, Screens};
use crate::ai::prompts::school_report_request;
use crate::ai::GenerationSlot;
use crate::fixtures::CURRENT_TERM;
use crate::gui::widgets;
use crate::navigation::{NavigationFrame, Props};
use crate::reports::{class_summary, format_percent, report_card_summary, school_overview};
use crate::store::StoreCommand;
use crate::views::{AdminRegistry, AdminView};

#[derive(Default)]
struct AnnouncementForm {
    title: String,
    body: String,
    error: Option<String>,
}

#[derive(Default)]
pub struct AdminScreens {
    announcement: AnnouncementForm,
    report: GenerationSlot<String>,
    notice: Option<String>,
}

impl Screens for AdminScreens {
    type Registry = AdminRegistry;

    fn render(
        &mut self,
        view: AdminView,
        frame: &NavigationFrame,
        ui: &mut egui::Ui,
        cx: &mut ScreenCx<'_>,
    ) {
        ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| match view {
                AdminView::Overview => self.overview(ui, cx),
                AdminView::Students => students(ui, cx),
                AdminView::StudentDetail => self.student_detail(ui, cx, frame),
                AdminView::Classes => classes(ui, cx),
                AdminView::ClassDetail => class_detail(ui, cx, frame),
                AdminView::Announcements => announcements(ui, cx),
                AdminView::NewAnnouncement => self.new_announcement(ui, cx),
                AdminView::Reports => self.reports(ui, cx),
            });
    }

    fn poll(&mut self) -> bool {
        self.report.poll();
        self.report.is_in_flight()
    }
}

impl AdminScreens {
    fn overview(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
        let (school, overview) = {
            let store = cx.store.read();
            (store.school_name.clone(), school_overview(&store))
        };
        ui.label(RichText::new(school).strong());
        widgets::stat_tiles(
            ui,
            cx.theme,
            &[
                ("Students", overview.students.to_string()),
                ("Teachers", overview.teachers.to_string()),
                ("Classes", overview.classes.to_string()),
            ],
        );
        ui.add_space(6.0);
        widgets::percent_bar(ui, "Average grade", overview.average);
        widgets::percent_bar(ui, "Attendance", overview.attendance);

        widgets::section(ui, "Quick actions");
        ui.horizontal_wrapped(|ui| {
            if ui.button("New announcement").clicked() {
                cx.nav
                    .navigate_to("newAnnouncement", "New Announcement", Props::new());
            }
            if ui.button("Term report").clicked() {
                cx.nav.navigate_to("reports", "Term Report", Props::new());
            }
            if ui.button("Refresh").clicked() {
                cx.nav.refresh();
            }
        });

        widgets::section(ui, "Latest announcements");
        let store = cx.store.read();
        if store.announcements.is_empty() {
            widgets::empty_state(ui, "Nothing announced yet.");
        }
        for announcement in store.latest_announcements(3) {
            widgets::card(ui, cx.theme, |ui| {
                ui.label(RichText::new(&announcement.title).strong());
                ui.label(&announcement.body);
            });
        }
    }

    fn student_detail(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>, frame: &NavigationFrame) {
        let student_id = frame.props.get_str("studentId").unwrap_or_default();
        let (summary, parent) = {
            let store = cx.store.read();
            let parent = store
                .student(student_id)
                .and_then(|s| s.parent_id.as_deref())
                .map(|id| store.person_name(id));
            (report_card_summary(&store, student_id, CURRENT_TERM), parent)
        };
        let Some(summary) = summary else {
            widgets::empty_state(ui, "Student not found.");
            return;
        };

        report_card_view(ui, cx.theme, &summary);
        ui.label(format!(
            "Parent/guardian: {}",
            parent.unwrap_or_else(|| "not on file".to_string())
        ));

        widgets::section(ui, "Report card");
        let label = if summary.published {
            "Unpublish report card"
        } else {
            "Publish report card"
        };
        if ui.button(label).clicked() {
            let result = cx.store.dispatch(StoreCommand::SetReportCardPublished {
                student_id: summary.student_id.clone(),
                term: summary.term.clone(),
                published: !summary.published,
            });
            self.notice = Some(match result {
                Ok(()) if summary.published => "Report card hidden from parents.".to_string(),
                Ok(()) => "Report card published to parents.".to_string(),
                Err(e) => e.to_string(),
            });
        }
        widgets::info_line(ui, &self.notice);
    }

    fn new_announcement(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
        let form = &mut self.announcement;
        ui.label("Title");
        ui.add(TextEdit::singleline(&mut form.title).hint_text("e.g. Sports day"));
        ui.label("Message");
        ui.add(
            TextEdit::multiline(&mut form.body)
                .desired_rows(6)
                .hint_text("What should families know?"),
        );
        widgets::field_error(ui, &form.error);

        if ui.button("Post announcement").clicked() {
            form.error = require(&[("Title", form.title.as_str()), ("Message", form.body.as_str())])
                .and_then(|()| {
                    cx.store
                        .dispatch(StoreCommand::PostAnnouncement {
                            title: form.title.clone(),
                            body: form.body.clone(),
                        })
                        .map_err(|e| e.to_string())
                })
                .err();
            if form.error.is_none() {
                *form = AnnouncementForm::default();
                cx.nav.handle_back();
            }
        }
    }

    fn reports(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
        let (school, overview) = {
            let store = cx.store.read();
            (store.school_name.clone(), school_overview(&store))
        };
        ui.label(format!(
            "{} students · average {} · attendance {} · {} report cards published",
            overview.students,
            format_percent(overview.average),
            format_percent(overview.attendance),
            overview.published_reports
        ));
        ui.add_space(6.0);
        if ui
            .add_enabled(
                !self.report.is_in_flight(),
                egui::Button::new("Generate term summary"),
            )
            .clicked()
        {
            self.report.start(
                cx.ai,
                "school_report",
                school_report_request(&school, &overview),
                |o| Ok(o.into_text()),
            );
        }
        widgets::generation_status(ui, &self.report);
        if let Some(text) = self.report.ready() {
            widgets::card(ui, cx.theme, |ui| widgets::render_markdown(ui, text));
        }
    }
}

fn students(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
    let store = cx.store.read();
    for student in &store.students {
        let subtitle = format!("Year {} · {}", student.year_level, student.class_id);
        if widgets::nav_row(ui, &student.name, &subtitle) {
            cx.nav.navigate_to(
                "studentDetail",
                student.name.clone(),
                Props::new().with("studentId", student.id.as_str()),
            );
        }
    }
}

fn classes(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
    let store = cx.store.read();
    for class in &store.classes {
        let subtitle = format!("{} · {}", class.subject, store.person_name(&class.teacher_id));
        if widgets::nav_row(ui, &class.name, &subtitle) {
            cx.nav.navigate_to(
                "classDetail",
                class.name.clone(),
                Props::new().with("classId", class.id.as_str()),
            );
        }
    }
}

fn class_detail(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>, frame: &NavigationFrame) {
    let class_id = frame.props.get_str("classId").unwrap_or_default();
    let store = cx.store.read();
    let (Some(class), Some(summary)) = (store.class(class_id), class_summary(&store, class_id)) else {
        widgets::empty_state(ui, "Class not found.");
        return;
    };
    widgets::card(ui, cx.theme, |ui| {
        ui.label(RichText::new(&class.subject).strong());
        ui.label(format!(
            "Teacher: {} · Room {}",
            store.person_name(&class.teacher_id),
            class.room
        ));
        ui.label(format!("Schedule: {}", class.schedule.join(", ")));
        ui.label(format!("{} students", summary.student_count));
    });
    widgets::percent_bar(ui, "Class average", summary.average);
    widgets::percent_bar(ui, "Attendance", summary.attendance);

    widgets::section(ui, "Students");
    if summary.ranking.is_empty() {
        widgets::empty_state(ui, "No marks recorded yet.");
    }
    for (name, average) in &summary.ranking {
        widgets::percent_bar(ui, name, Some(*average));
    }
}

fn announcements(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
    if ui.button("+ New announcement").clicked() {
        cx.nav
            .navigate_to("newAnnouncement", "New Announcement", Props::new());
    }
    ui.add_space(6.0);
    let store = cx.store.read();
    if store.announcements.is_empty() {
        widgets::empty_state(ui, "Nothing announced yet.");
    }
    for announcement in store.latest_announcements(usize::MAX) {
        widgets::card(ui, cx.theme, |ui| {
            ui.label(RichText::new(&announcement.title).strong());
            ui.weak(announcement.posted_at.format("%d %b %Y").to_string());
            ui.label(&announcement.body);
        });
        ui.add_space(4.0);
    }
}
