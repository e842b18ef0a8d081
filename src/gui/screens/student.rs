use chrono::Local;
use eframe::egui::{self, RichText, ScrollArea, TextEdit};

use super::common::quiz_view;
use super::{require, ScreenCx, Screens};
use crate::ai::prompts::{parse_quiz, practice_quiz_request, study_help_request, Quiz};
use crate::ai::GenerationSlot;
use crate::gui::widgets;
use crate::navigation::{NavigationFrame, Props};
use crate::reports::{average_percent, format_percent, letter_grade, subject_averages};
use crate::views::{StudentRegistry, StudentView};

#[derive(Default)]
struct StudyForm {
    subject: String,
    question: String,
    error: Option<String>,
}

#[derive(Default)]
struct PracticeForm {
    subject: String,
    topic: String,
    error: Option<String>,
    picks: Vec<Option<usize>>,
    checked: bool,
}

#[derive(Default)]
pub struct StudentScreens {
    study: StudyForm,
    answer: GenerationSlot<String>,
    practice: PracticeForm,
    quiz: GenerationSlot<Quiz>,
}

impl Screens for StudentScreens {
    type Registry = StudentRegistry;

    fn render(
        &mut self,
        view: StudentView,
        frame: &NavigationFrame,
        ui: &mut egui::Ui,
        cx: &mut ScreenCx<'_>,
    ) {
        ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| match view {
                StudentView::Overview => overview(ui, cx),
                StudentView::Assignments => assignments(ui, cx),
                StudentView::AssignmentDetail => assignment_detail(ui, cx, frame),
                StudentView::Grades => grades(ui, cx),
                StudentView::StudyHelper => self.study_helper(ui, cx),
                StudentView::PracticeQuiz => self.practice_quiz(ui, cx),
                StudentView::Timetable => timetable(ui, cx),
            });
    }

    fn poll(&mut self) -> bool {
        self.answer.poll();
        if self.quiz.poll() {
            self.practice.picks.clear();
            self.practice.checked = false;
        }
        self.answer.is_in_flight() || self.quiz.is_in_flight()
    }
}

fn overview(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
    let store = cx.store.read();
    let student_id = cx.session.user_id.as_str();
    let grades = store.grades_for(student_id);
    let due = store.assignments_for_student(student_id);
    let outstanding: Vec<_> = due
        .iter()
        .filter(|a| store.submission_by(&a.id, student_id).is_none())
        .collect();

    ui.label(format!("Hi {}!", cx.session.display_name));
    widgets::stat_tiles(
        ui,
        cx.theme,
        &[
            ("Average", format_percent(average_percent(&grades))),
            ("To hand in", outstanding.len().to_string()),
            ("Classes", store.classes_for_student(student_id).len().to_string()),
        ],
    );

    widgets::section(ui, "Up next");
    if outstanding.is_empty() {
        widgets::empty_state(ui, "All caught up.");
    }
    for assignment in outstanding.into_iter().take(3) {
        let subtitle = format!("{} · due {}", assignment.subject, assignment.due.format("%a %d %b"));
        if widgets::nav_row(ui, &assignment.title, &subtitle) {
            cx.nav.navigate_to(
                "assignmentDetail",
                assignment.title.clone(),
                Props::new().with("assignmentId", assignment.id.as_str()),
            );
        }
    }

    widgets::section(ui, "Shortcuts");
    ui.horizontal_wrapped(|ui| {
        if ui.button("Timetable").clicked() {
            cx.nav.navigate_to("timetable", "My Timetable", Props::new());
        }
        if ui.button("Practice quiz").clicked() {
            cx.nav.navigate_to("practiceQuiz", "Practice Quiz", Props::new());
        }
    });
}

fn assignments(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
    let store = cx.store.read();
    let student_id = cx.session.user_id.as_str();
    let list = store.assignments_for_student(student_id);
    if list.is_empty() {
        widgets::empty_state(ui, "No homework set.");
    }
    for assignment in list {
        let status = match store.submission_by(&assignment.id, student_id) {
            Some(s) if s.feedback.is_some() => "marked",
            Some(_) => "handed in",
            None => "to do",
        };
        let subtitle = format!(
            "{} · due {} · {status}",
            assignment.subject,
            assignment.due.format("%d %b")
        );
        if widgets::nav_row(ui, &assignment.title, &subtitle) {
            cx.nav.navigate_to(
                "assignmentDetail",
                assignment.title.clone(),
                Props::new().with("assignmentId", assignment.id.as_str()),
            );
        }
    }
}

fn assignment_detail(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>, frame: &NavigationFrame) {
    let assignment_id = frame.props.get_str("assignmentId").unwrap_or_default();
    let store = cx.store.read();
    let student_id = cx.session.user_id.as_str();
    let Some(assignment) = store
        .assignments_for_student(student_id)
        .into_iter()
        .find(|a| a.id == assignment_id)
    else {
        widgets::empty_state(ui, "Assignment not found.");
        return;
    };

    widgets::card(ui, cx.theme, |ui| {
        ui.label(RichText::new(&assignment.subject).strong());
        let days = (assignment.due - Local::now().date_naive()).num_days();
        let when = match days {
            d if d < 0 => format!("was due {}", assignment.due.format("%d %b")),
            0 => "due today".to_string(),
            d => format!("due in {d} days ({})", assignment.due.format("%d %b")),
        };
        ui.weak(when);
        ui.add_space(4.0);
        ui.label(&assignment.description);
    });

    widgets::section(ui, "Your work");
    match store.submission_by(&assignment.id, student_id) {
        Some(submission) => {
            ui.label(&submission.text);
            if let Some(feedback) = &submission.feedback {
                widgets::section(ui, "Feedback");
                ui.label(feedback);
            }
            if let Some(score) = submission.score {
                ui.label(format!("Score: {score:.0}"));
            }
        }
        None => widgets::empty_state(ui, "Not handed in yet."),
    }

    ui.add_space(6.0);
    if ui.button("Ask the study helper").clicked() {
        cx.nav.navigate_to("studyHelper", "Study Helper", Props::new());
    }
}

fn grades(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
    let store = cx.store.read();
    let grades = store.grades_for(&cx.session.user_id);
    if grades.is_empty() {
        widgets::empty_state(ui, "No marks recorded yet.");
        return;
    }
    let overall = average_percent(&grades);
    ui.label(format!(
        "Overall: {} {}",
        format_percent(overall),
        overall.map(letter_grade).unwrap_or_default()
    ));
    widgets::section(ui, "By subject");
    for (subject, average) in subject_averages(&grades) {
        widgets::percent_bar(ui, &format!("{subject} ({})", letter_grade(average)), Some(average));
    }
    widgets::section(ui, "All marks");
    egui::Grid::new("student_grades")
        .striped(true)
        .num_columns(3)
        .show(ui, |ui| {
            for grade in &grades {
                ui.label(&grade.subject);
                ui.label(&grade.assessment);
                ui.label(format!("{:.0}/{:.0}", grade.score, grade.max_score));
                ui.end_row();
            }
        });
}

fn timetable(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
    let store = cx.store.read();
    let mut slots: Vec<(String, String, String)> = store
        .classes_for_student(&cx.session.user_id)
        .into_iter()
        .flat_map(|c| {
            c.schedule
                .iter()
                .map(move |slot| (slot.clone(), c.subject.clone(), c.room.clone()))
        })
        .collect();
    if slots.is_empty() {
        widgets::empty_state(ui, "No timetable yet.");
        return;
    }
    slots.sort_by_key(|(slot, _, _)| weekday_order(slot));
    egui::Grid::new("timetable")
        .striped(true)
        .num_columns(3)
        .show(ui, |ui| {
            for (slot, subject, room) in &slots {
                ui.strong(slot.as_str());
                ui.label(subject.as_str());
                ui.label(format!("Room {room}"));
                ui.end_row();
            }
        });
}

/// Sort key for slots like "Tue 09:00": weekday first, then time.
fn weekday_order(slot: &str) -> (usize, String) {
    const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    let (day, time) = slot.split_once(' ').unwrap_or((slot, ""));
    let index = DAYS.iter().position(|d| *d == day).unwrap_or(DAYS.len());
    (index, time.to_string())
}

impl StudentScreens {
    fn study_helper(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
        let form = &mut self.study;
        ui.label("Stuck on something? Ask for an explanation or a hint.");
        ui.horizontal(|ui| {
            ui.label("Subject");
            ui.add(TextEdit::singleline(&mut form.subject).hint_text("e.g. Science"));
        });
        ui.add(
            TextEdit::multiline(&mut form.question)
                .desired_rows(3)
                .hint_text("Type your question..."),
        );
        if ui
            .add_enabled(!self.answer.is_in_flight(), egui::Button::new("Ask"))
            .clicked()
        {
            form.error = require(&[
                ("Subject", form.subject.as_str()),
                ("Question", form.question.as_str()),
            ])
            .err();
            if form.error.is_none() {
                self.answer.start(
                    cx.ai,
                    "study_help",
                    study_help_request(form.subject.trim(), form.question.trim()),
                    |o| Ok(o.into_text()),
                );
            }
        }
        widgets::field_error(ui, &form.error);
        widgets::generation_status(ui, &self.answer);
        if let Some(text) = self.answer.ready() {
            widgets::card(ui, cx.theme, |ui| widgets::render_markdown(ui, text));
        }
    }

    fn practice_quiz(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
        let form = &mut self.practice;
        egui::Grid::new("practice_form").num_columns(2).show(ui, |ui| {
            ui.label("Subject");
            ui.text_edit_singleline(&mut form.subject);
            ui.end_row();
            ui.label("Topic");
            ui.add(TextEdit::singleline(&mut form.topic).hint_text("e.g. Photosynthesis"));
            ui.end_row();
        });
        if ui
            .add_enabled(!self.quiz.is_in_flight(), egui::Button::new("Make a quiz"))
            .clicked()
        {
            form.error = require(&[
                ("Subject", form.subject.as_str()),
                ("Topic", form.topic.as_str()),
            ])
            .err();
            if form.error.is_none() {
                self.quiz.start(
                    cx.ai,
                    "practice_quiz",
                    practice_quiz_request(form.subject.trim(), form.topic.trim()),
                    parse_quiz,
                );
            }
        }
        widgets::field_error(ui, &form.error);
        widgets::generation_status(ui, &self.quiz);

        if let Some(quiz) = self.quiz.ready() {
            ui.separator();
            quiz_view(ui, quiz, Some(&mut form.picks), form.checked);
            ui.horizontal(|ui| {
                if ui.button("Check answers").clicked() {
                    form.checked = true;
                }
                if form.checked {
                    ui.strong(format!(
                        "{} / {} correct",
                        quiz.score(&form.picks),
                        quiz.questions.len()
                    ));
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timetable_slots_sort_by_weekday_then_time() {
        let mut slots = vec!["Fri 09:00", "Mon 11:00", "Mon 09:00", "Someday"];
        slots.sort_by_key(|s| weekday_order(s));
        assert_eq!(slots, vec!["Mon 09:00", "Mon 11:00", "Fri 09:00", "Someday"]);
    }
}
