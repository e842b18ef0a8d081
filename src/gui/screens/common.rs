use eframe::egui::{self, Key, RichText, ScrollArea, TextEdit};

use super::{require, ScreenCx};
use crate::ai::prompts::Quiz;
use crate::gui::widgets;
use crate::navigation::{NavigationFrame, Props};
use crate::reports::{attendance_rate, format_percent, ReportCardSummary};
use crate::store::StoreCommand;
use crate::theme::ThemeConfig;

#[derive(Debug, Default)]
pub struct MessageDraft {
    conversation_id: String,
    pub body: String,
    pub error: Option<String>,
}

pub fn conversation_list(ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
    let store = cx.store.read();
    let conversations = store.conversations_for(&cx.session.user_id);
    if conversations.is_empty() {
        widgets::empty_state(ui, "No conversations yet.");
        return;
    }
    for conversation in conversations {
        let others: Vec<String> = conversation
            .participant_ids
            .iter()
            .filter(|id| **id != cx.session.user_id)
            .map(|id| store.person_name(id))
            .collect();
        let last = conversation
            .messages
            .last()
            .map(|m| preview(&m.body, 40))
            .unwrap_or_else(|| "No messages yet".to_string());
        if widgets::nav_row(
            ui,
            &conversation.subject,
            &format!("{} · {last}", others.join(", ")),
        ) {
            cx.nav.navigate_to(
                "conversation",
                conversation.subject.clone(),
                Props::new().with("conversationId", conversation.id.as_str()),
            );
        }
    }
}

pub fn conversation_view(
    ui: &mut egui::Ui,
    cx: &mut ScreenCx<'_>,
    frame: &NavigationFrame,
    draft: &mut MessageDraft,
) {
    let Some(conversation_id) = frame.props.get_str("conversationId") else {
        widgets::empty_state(ui, "Conversation not found.");
        return;
    };
    if draft.conversation_id != conversation_id {
        *draft = MessageDraft {
            conversation_id: conversation_id.to_string(),
            ..MessageDraft::default()
        };
    }

    // Cloned so the read guard is gone before a send dispatches.
    let conversation = cx
        .store
        .read()
        .conversation(conversation_id)
        .filter(|c| c.participant_ids.contains(&cx.session.user_id))
        .cloned();
    let Some(conversation) = conversation else {
        widgets::empty_state(ui, "Conversation not found.");
        return;
    };

    let log_height = (ui.available_height() - 70.0).max(120.0);
    ScrollArea::vertical()
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .max_height(log_height)
        .show(ui, |ui| {
            for message in &conversation.messages {
                let mine = message.sender_id == cx.session.user_id;
                let sender = format!(
                    "{} · {}",
                    message.sender_name,
                    message.sent_at.format("%d %b %H:%M")
                );
                widgets::chat_bubble(ui, cx.theme, &sender, &message.body, mine);
            }
        });

    ui.separator();
    let mut send = false;
    ui.horizontal(|ui| {
        let input = ui.add(TextEdit::singleline(&mut draft.body).hint_text("Write a message..."));
        if input.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
            send = true;
        }
        if ui.button("Send").clicked() {
            send = true;
        }
    });
    if send {
        draft.error = match require(&[("Message", draft.body.as_str())]) {
            Err(e) => Some(e),
            Ok(()) => cx
                .store
                .dispatch(StoreCommand::AppendMessage {
                    conversation_id: conversation.id.clone(),
                    sender_id: cx.session.user_id.clone(),
                    body: draft.body.clone(),
                })
                .err()
                .map(|e| e.to_string()),
        };
        if draft.error.is_none() {
            draft.body.clear();
        }
    }
    widgets::field_error(ui, &draft.error);
}

/// With `picks`, the quiz is answerable; otherwise the key is shown.
pub fn quiz_view(ui: &mut egui::Ui, quiz: &Quiz, picks: Option<&mut Vec<Option<usize>>>, reveal: bool) {
    match picks {
        Some(picks) => {
            picks.resize(quiz.questions.len(), None);
            for (i, (question, pick)) in quiz.questions.iter().zip(picks.iter_mut()).enumerate() {
                ui.label(RichText::new(format!("{}. {}", i + 1, question.question)).strong());
                for (j, option) in question.options.iter().enumerate() {
                    ui.radio_value(pick, Some(j), option);
                }
                if reveal {
                    let correct = *pick == Some(question.answer_index);
                    let verdict = if correct { "Correct" } else { "Not quite" };
                    ui.weak(match &question.explanation {
                        Some(why) => format!("{verdict}. {why}"),
                        None => verdict.to_string(),
                    });
                }
                ui.add_space(6.0);
            }
        }
        None => {
            for (i, question) in quiz.questions.iter().enumerate() {
                ui.label(RichText::new(format!("{}. {}", i + 1, question.question)).strong());
                for (j, option) in question.options.iter().enumerate() {
                    let marker = if j == question.answer_index { "✔" } else { "·" };
                    ui.label(format!("  {marker} {option}"));
                }
                if let Some(why) = &question.explanation {
                    ui.weak(why);
                }
                ui.add_space(6.0);
            }
        }
    }
}

pub fn report_card_view(ui: &mut egui::Ui, theme: &ThemeConfig, summary: &ReportCardSummary) {
    widgets::card(ui, theme, |ui| {
        ui.label(RichText::new(&summary.student_name).strong());
        ui.label(format!("{} · {}", summary.class_name, summary.term));
        ui.label(format!(
            "Overall: {} {}",
            format_percent(summary.overall),
            summary.overall_letter().unwrap_or("")
        ));
        ui.label(format!("Attendance: {}", format_percent(summary.attendance)));
    });
    widgets::section(ui, "Subjects");
    if summary.subjects.is_empty() {
        widgets::empty_state(ui, "No marks recorded yet.");
    }
    for line in &summary.subjects {
        widgets::percent_bar(ui, &format!("{} ({})", line.subject, line.letter), Some(line.percent));
    }
    if !summary.comment.is_empty() {
        widgets::section(ui, "Teacher comment");
        ui.label(&summary.comment);
    }
}

pub fn attendance_history(ui: &mut egui::Ui, cx: &ScreenCx<'_>, student_id: &str) {
    let store = cx.store.read();
    let records = store.attendance_for_student(student_id);
    widgets::percent_bar(ui, "Attendance", attendance_rate(&records));
    if records.is_empty() {
        widgets::empty_state(ui, "No attendance recorded yet.");
        return;
    }
    egui::Grid::new("attendance_history")
        .striped(true)
        .num_columns(3)
        .show(ui, |ui| {
            for record in records.iter().rev() {
                ui.label(record.date.format("%a %d %b").to_string());
                ui.label(
                    store
                        .class(&record.class_id)
                        .map(|c| c.name.as_str())
                        .unwrap_or(&record.class_id),
                );
                ui.label(record.status.label());
                ui.end_row();
            }
        });
}

pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_cuts_long_text_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("héllo wörld", 5), "héllo…");
    }
}
