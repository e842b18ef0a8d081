use chrono::{Local, NaiveDate};
use eframe::egui::{self, ComboBox, DragValue, RichText, ScrollArea, TextEdit};

use super::common::{conversation_list, conversation_view, preview, quiz_view, MessageDraft};
use super::{require, ScreenCx, Screens};
use crate::ai::prompts::{
    lesson_plan_request, parse_lesson_plan, parse_quiz, quiz_request, submission_feedback_request,
    LessonPlan, Quiz,
};
use crate::ai::GenerationSlot;
use crate::fixtures::CURRENT_TERM;
use crate::gui::widgets;
use crate::navigation::{NavigationFrame, Props};
use crate::reports::{average_percent, class_summary, format_percent, report_card_summary};
use crate::store::{AttendanceStatus, StoreCommand};
use crate::views::{TeacherRegistry, TeacherView};

struct LessonForm {
    subject: String,
    topic: String,
    year_level: String,
    minutes: String,
    error: Option<String>,
}

impl Default for LessonForm {
    fn default() -> Self {
        Self {
            subject: "Mathematics".to_string(),
            topic: String::new(),
            year_level: "10".to_string(),
            minutes: "45".to_string(),
            error: None,
        }
    }
}

struct QuizForm {
    subject: String,
    topic: String,
    count: usize,
    error: Option<String>,
}

impl Default for QuizForm {
    fn default() -> Self {
        Self {
            subject: "Mathematics".to_string(),
            topic: String::new(),
            count: 5,
            error: None,
        }
    }
}

#[derive(Default)]
struct FeedbackForm {
    submission_id: String,
    text: String,
    score: String,
    error: Option<String>,
    notice: Option<String>,
    draft: GenerationSlot<String>,
}

#[derive(Default)]
struct AttendanceSheet {
    class_id: String,
    date: String,
    loaded_for: Option<NaiveDate>,
    marks: Vec<(String, String, AttendanceStatus)>,
    error: Option<String>,
    notice: Option<String>,
}

#[derive(Default)]
pub struct TeacherScreens {
    lesson: LessonForm,
    plan: GenerationSlot<LessonPlan>,
    quiz_form: QuizForm,
    quiz: GenerationSlot<Quiz>,
    feedback: FeedbackForm,
    attendance: AttendanceSheet,
    message: MessageDraft,
    report_notice: Option<String>,
}

impl Screens for TeacherScreens {
    type Registry = TeacherRegistry;

    fn render(
        &mut self,
        view: TeacherView,
        frame: &NavigationFrame,
        ui: &mut egui::Ui,
        cx: &mut ScreenCx<'_>,
    ) {
        match view {
            TeacherView::Conversation => conversation_view(ui, cx, frame, &mut self.message),
            _ => {
                ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| match view {
                        TeacherView::Overview => overview(ui, cx),
                        TeacherView::Classes => classes(ui, cx),
                        TeacherView::ClassDetail => class_detail(ui, cx, frame),
                        TeacherView::Attendance => self.attendance(ui, cx, frame),
                        TeacherView::Gradebook => gradebook(ui, cx, frame),
                        TeacherView::LessonPlanner => self.lesson_planner(ui, cx),
                        TeacherView::QuizGenerator => self.quiz_generator(ui, cx),
                        TeacherView::SubmissionFeedback => self.submission_feedback(ui, cx, frame),
                        TeacherView::Messages => conversation_list(ui, cx),
                        TeacherView::ReportCards => self.report_cards(ui, cx),
                        TeacherView::Conversation => {}
                    });
            }
        }
    }

    fn poll(&mut self) -> bool {
        self.plan.poll();
        self.quiz.poll();
        if self.feedback.draft.poll() {
            // Prefill the editable feedback box; the teacher still has to save it.
            if let Some(text) = self.feedback.draft.ready() {
                self.feedback.text = text.trim().to_string();
            }
        }
        self.plan.is_in_flight() || self.quiz.is_in_flight() || self.feedback.draft.is_in_flight()
    }
}

fn overview(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
    let store = cx.store.read();
    let teacher_id = cx.session.user_id.as_str();
    let classes = store.classes_for_teacher(teacher_id);
    let students: usize = classes
        .iter()
        .map(|c| store.students_in_class(&c.id).len())
        .sum();
    let to_mark = classes
        .iter()
        .flat_map(|c| store.assignments_for_class(&c.id))
        .flat_map(|a| store.submissions_for_assignment(&a.id))
        .filter(|s| s.feedback.is_none())
        .count();

    ui.label(format!("Welcome back, {}", cx.session.display_name));
    widgets::stat_tiles(
        ui,
        cx.theme,
        &[
            ("Classes", classes.len().to_string()),
            ("Students", students.to_string()),
            ("To mark", to_mark.to_string()),
        ],
    );

    widgets::section(ui, "Tools");
    ui.horizontal_wrapped(|ui| {
        if ui.button("Quiz generator").clicked() {
            cx.nav
                .navigate_to("quizGenerator", "Quiz Generator", Props::new());
        }
        if ui.button("Report cards").clicked() {
            cx.nav.navigate_to("reportCards", "Report Cards", Props::new());
        }
    });

    widgets::section(ui, "Today");
    for class in &classes {
        let subtitle = format!("{} · Room {} · {}", class.subject, class.room, class.schedule.join(", "));
        if widgets::nav_row(ui, &class.name, &subtitle) {
            cx.nav.navigate_to(
                "classDetail",
                class.name.clone(),
                Props::new().with("classId", class.id.as_str()),
            );
        }
    }
}

fn classes(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
    let store = cx.store.read();
    let classes = store.classes_for_teacher(&cx.session.user_id);
    if classes.is_empty() {
        widgets::empty_state(ui, "No classes assigned.");
    }
    for class in classes {
        let subtitle = format!(
            "{} · {} students",
            class.subject,
            store.students_in_class(&class.id).len()
        );
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

    ui.label(format!("{} · Room {}", class.subject, class.room));
    widgets::percent_bar(ui, "Class average", summary.average);
    widgets::percent_bar(ui, "Attendance", summary.attendance);
    ui.horizontal(|ui| {
        let props = Props::new().with("classId", class.id.as_str());
        if ui.button("Take attendance").clicked() {
            cx.nav
                .navigate_to("attendance", format!("Attendance · {}", class.name), props.clone());
        }
        if ui.button("Gradebook").clicked() {
            cx.nav
                .navigate_to("gradebook", format!("Gradebook · {}", class.name), props);
        }
    });

    widgets::section(ui, "Homework");
    let assignments = store.assignments_for_class(class_id);
    if assignments.is_empty() {
        widgets::empty_state(ui, "No homework set.");
    }
    for assignment in assignments {
        ui.label(
            RichText::new(format!("{} (due {})", assignment.title, assignment.due.format("%d %b")))
                .strong(),
        );
        let submissions = store.submissions_for_assignment(&assignment.id);
        if submissions.is_empty() {
            ui.weak("No submissions yet.");
        }
        for submission in submissions {
            let status = match (&submission.feedback, submission.score) {
                (Some(_), Some(score)) => format!("marked · {score:.0}"),
                (Some(_), None) => "feedback given".to_string(),
                _ => "needs feedback".to_string(),
            };
            let name = store.person_name(&submission.student_id);
            if widgets::nav_row(ui, &name, &status) {
                cx.nav.navigate_to(
                    "submissionFeedback",
                    format!("Feedback · {name}"),
                    Props::new().with("submissionId", submission.id.as_str()),
                );
            }
        }
    }
}

fn gradebook(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>, frame: &NavigationFrame) {
    let class_id = frame.props.get_str("classId").unwrap_or_default();
    let store = cx.store.read();
    let Some(class) = store.class(class_id) else {
        widgets::empty_state(ui, "Class not found.");
        return;
    };
    let students = store.students_in_class(class_id);
    let mut assessments: Vec<&str> = store
        .grades
        .iter()
        .filter(|g| g.subject == class.subject && students.iter().any(|s| s.id == g.student_id))
        .map(|g| g.assessment.as_str())
        .collect();
    assessments.sort_unstable();
    assessments.dedup();

    if students.is_empty() {
        widgets::empty_state(ui, "No students in this class.");
        return;
    }
    ui.label(format!("{} · {}", class.subject, CURRENT_TERM));
    ScrollArea::horizontal().show(ui, |ui| {
        egui::Grid::new("gradebook")
            .striped(true)
            .num_columns(assessments.len() + 2)
            .show(ui, |ui| {
                ui.strong("Student");
                for name in &assessments {
                    ui.strong(*name);
                }
                ui.strong("Average");
                ui.end_row();

                for student in &students {
                    ui.label(&student.name);
                    let grades: Vec<_> = store
                        .grades_for(&student.id)
                        .into_iter()
                        .filter(|g| g.subject == class.subject)
                        .collect();
                    for name in &assessments {
                        match grades.iter().find(|g| g.assessment == *name) {
                            Some(g) => ui.label(format!("{:.0}/{:.0}", g.score, g.max_score)),
                            None => ui.weak("-"),
                        };
                    }
                    ui.label(format_percent(average_percent(&grades)));
                    ui.end_row();
                }
            });
    });
}

impl TeacherScreens {
    fn attendance(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>, frame: &NavigationFrame) {
        let class_id = frame.props.get_str("classId").unwrap_or_default();
        let sheet = &mut self.attendance;
        if sheet.class_id != class_id {
            *sheet = AttendanceSheet {
                class_id: class_id.to_string(),
                date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
                ..AttendanceSheet::default()
            };
        }

        ui.horizontal(|ui| {
            ui.label("Date (YYYY-MM-DD)");
            ui.text_edit_singleline(&mut sheet.date);
        });
        let date = match NaiveDate::parse_from_str(sheet.date.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                widgets::field_error(ui, &Some("Enter the date as YYYY-MM-DD.".to_string()));
                return;
            }
        };

        if sheet.loaded_for != Some(date) {
            let store = cx.store.read();
            if store.class(class_id).is_none() {
                widgets::empty_state(ui, "Class not found.");
                return;
            }
            sheet.marks = store
                .students_in_class(class_id)
                .into_iter()
                .map(|s| {
                    let status = store
                        .attendance_on(class_id, &s.id, date)
                        .unwrap_or(AttendanceStatus::Present);
                    (s.id.clone(), s.name.clone(), status)
                })
                .collect();
            sheet.loaded_for = Some(date);
            sheet.notice = None;
        }

        if sheet.marks.is_empty() {
            widgets::empty_state(ui, "No students in this class.");
            return;
        }
        egui::Grid::new("attendance_sheet")
            .striped(true)
            .num_columns(2)
            .show(ui, |ui| {
                for (student_id, name, status) in sheet.marks.iter_mut() {
                    ui.label(name.as_str());
                    ComboBox::from_id_source(("attendance", student_id.as_str()))
                        .selected_text(status.label())
                        .show_ui(ui, |ui| {
                            for option in AttendanceStatus::ALL {
                                ui.selectable_value(status, option, option.label());
                            }
                        });
                    ui.end_row();
                }
            });

        if ui.button("Save attendance").clicked() {
            let mut saved = 0;
            sheet.error = None;
            for (student_id, _, status) in &sheet.marks {
                match cx.store.dispatch(StoreCommand::RecordAttendance {
                    class_id: class_id.to_string(),
                    student_id: student_id.clone(),
                    date,
                    status: *status,
                }) {
                    Ok(()) => saved += 1,
                    Err(e) => {
                        sheet.error = Some(e.to_string());
                        break;
                    }
                }
            }
            if sheet.error.is_none() {
                sheet.notice = Some(format!("Saved attendance for {saved} students."));
            }
        }
        widgets::field_error(ui, &sheet.error);
        widgets::info_line(ui, &sheet.notice);
    }

    fn lesson_planner(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
        let form = &mut self.lesson;
        egui::Grid::new("lesson_form").num_columns(2).show(ui, |ui| {
            ui.label("Subject");
            ui.text_edit_singleline(&mut form.subject);
            ui.end_row();
            ui.label("Topic");
            ui.add(TextEdit::singleline(&mut form.topic).hint_text("e.g. Angles in polygons"));
            ui.end_row();
            ui.label("Year level");
            ui.text_edit_singleline(&mut form.year_level);
            ui.end_row();
            ui.label("Minutes");
            ui.text_edit_singleline(&mut form.minutes);
            ui.end_row();
        });

        let generate = ui
            .add_enabled(!self.plan.is_in_flight(), egui::Button::new("Generate lesson plan"))
            .clicked();
        if generate {
            let minutes = form.minutes.trim().parse::<u32>().ok().filter(|m| (10..=240).contains(m));
            form.error = require(&[
                ("Subject", form.subject.as_str()),
                ("Topic", form.topic.as_str()),
                ("Year level", form.year_level.as_str()),
            ])
            .and_then(|()| minutes.ok_or_else(|| "Minutes must be between 10 and 240.".to_string()))
            .map(|minutes| {
                self.plan.start(
                    cx.ai,
                    "lesson_plan",
                    lesson_plan_request(
                        form.subject.trim(),
                        form.topic.trim(),
                        form.year_level.trim(),
                        minutes,
                    ),
                    parse_lesson_plan,
                );
            })
            .err();
        }
        widgets::field_error(ui, &form.error);
        widgets::generation_status(ui, &self.plan);

        if let Some(plan) = self.plan.ready() {
            widgets::card(ui, cx.theme, |ui| {
                ui.heading(&plan.title);
                ui.weak(format!("{} minutes", plan.total_minutes()));
                widgets::section(ui, "Objectives");
                for objective in &plan.objectives {
                    ui.label(format!("• {objective}"));
                }
                widgets::section(ui, "Activities");
                for activity in &plan.activities {
                    ui.label(RichText::new(format!("{} ({} min)", activity.name, activity.minutes)).strong());
                    ui.label(&activity.description);
                }
                widgets::section(ui, "Assessment");
                ui.label(&plan.assessment);
            });
        }
    }

    fn quiz_generator(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
        let form = &mut self.quiz_form;
        egui::Grid::new("quiz_form").num_columns(2).show(ui, |ui| {
            ui.label("Subject");
            ui.text_edit_singleline(&mut form.subject);
            ui.end_row();
            ui.label("Topic");
            ui.add(TextEdit::singleline(&mut form.topic).hint_text("e.g. Simultaneous equations"));
            ui.end_row();
            ui.label("Questions");
            ui.add(DragValue::new(&mut form.count).clamp_range(1..=10));
            ui.end_row();
        });

        if ui
            .add_enabled(!self.quiz.is_in_flight(), egui::Button::new("Generate quiz"))
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
                    "quiz",
                    quiz_request(form.subject.trim(), form.topic.trim(), form.count),
                    parse_quiz,
                );
            }
        }
        widgets::field_error(ui, &form.error);
        widgets::generation_status(ui, &self.quiz);
        if let Some(quiz) = self.quiz.ready() {
            widgets::card(ui, cx.theme, |ui| quiz_view(ui, quiz, None, true));
        }
    }

    fn submission_feedback(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>, frame: &NavigationFrame) {
        let submission_id = frame.props.get_str("submissionId").unwrap_or_default();
        let found = {
            let store = cx.store.read();
            store.submission(submission_id).and_then(|s| {
                let assignment = store.assignment(&s.assignment_id)?;
                Some((s.clone(), assignment.clone(), store.person_name(&s.student_id)))
            })
        };
        let Some((submission, assignment, student_name)) = found else {
            widgets::empty_state(ui, "Submission not found.");
            return;
        };

        let form = &mut self.feedback;
        if form.submission_id != submission.id {
            *form = FeedbackForm {
                submission_id: submission.id.clone(),
                text: submission.feedback.clone().unwrap_or_default(),
                score: submission.score.map(|s| format!("{s:.0}")).unwrap_or_default(),
                ..FeedbackForm::default()
            };
        }

        widgets::card(ui, cx.theme, |ui| {
            ui.label(RichText::new(&assignment.title).strong());
            ui.weak(format!("{student_name} · due {}", assignment.due.format("%d %b")));
            ui.add_space(4.0);
            ui.label(&submission.text);
        });

        widgets::section(ui, "Feedback");
        if ui
            .add_enabled(!form.draft.is_in_flight(), egui::Button::new("Draft with AI"))
            .clicked()
        {
            form.draft.start(
                cx.ai,
                "submission_feedback",
                submission_feedback_request(&assignment, &submission),
                |o| Ok(o.into_text()),
            );
        }
        widgets::generation_status(ui, &form.draft);
        ui.add(TextEdit::multiline(&mut form.text).desired_rows(4));
        ui.horizontal(|ui| {
            ui.label("Score (optional)");
            ui.text_edit_singleline(&mut form.score);
        });

        if ui.button("Save feedback").clicked() {
            let score = match form.score.trim() {
                "" => Ok(None),
                raw => raw
                    .parse::<f32>()
                    .map(Some)
                    .map_err(|_| "Score must be a number.".to_string()),
            };
            form.error = require(&[("Feedback", form.text.as_str())])
                .and(score)
                .and_then(|score| {
                    cx.store
                        .dispatch(StoreCommand::SetSubmissionFeedback {
                            submission_id: submission.id.clone(),
                            feedback: form.text.clone(),
                            score,
                        })
                        .map_err(|e| e.to_string())
                })
                .err();
            form.notice = form.error.is_none().then(|| "Feedback saved.".to_string());
        }
        widgets::field_error(ui, &form.error);
        widgets::info_line(ui, &form.notice);
    }

    fn report_cards(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
        let rows: Vec<(String, String, Option<f32>, bool)> = {
            let store = cx.store.read();
            let mut student_ids: Vec<&str> = store
                .classes_for_teacher(&cx.session.user_id)
                .into_iter()
                .flat_map(|c| store.students_in_class(&c.id))
                .map(|s| s.id.as_str())
                .collect();
            student_ids.sort_unstable();
            student_ids.dedup();
            student_ids
                .into_iter()
                .filter_map(|id| report_card_summary(&store, id, CURRENT_TERM))
                .map(|r| (r.student_id, r.student_name, r.overall, r.published))
                .collect()
        };

        ui.label(format!("{CURRENT_TERM} report cards for your classes"));
        if rows.is_empty() {
            widgets::empty_state(ui, "No students yet.");
        }
        egui::Grid::new("report_cards")
            .striped(true)
            .num_columns(3)
            .show(ui, |ui| {
                for (student_id, name, overall, published) in &rows {
                    ui.label(name);
                    ui.label(format_percent(*overall));
                    let label = if *published { "Published ✔" } else { "Publish" };
                    if ui.button(label).clicked() {
                        self.report_notice = Some(
                            match cx.store.dispatch(StoreCommand::SetReportCardPublished {
                                student_id: student_id.clone(),
                                term: CURRENT_TERM.to_string(),
                                published: !*published,
                            }) {
                                Ok(()) => format!("Updated {}.", preview(name, 30)),
                                Err(e) => e.to_string(),
                            },
                        );
                    }
                    ui.end_row();
                }
            });
        widgets::info_line(ui, &self.report_notice);
    }
}
