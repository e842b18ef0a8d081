use eframe::egui::{self, Align2, Context, Key, RichText, ScrollArea, TextEdit};

use super::widgets;
use crate::ai::AiService;
use crate::chat::{AssistantChat, Speaker, ASSISTANT_NAME};
use crate::navigation::NavigationFrame;
use crate::search::SearchHit;
use crate::store::Notification;
use crate::theme::ThemeConfig;

pub enum SearchEvent {
    Idle,
    Close,
    Open(NavigationFrame),
}

pub fn search_window(ctx: &Context, query: &mut String, hits: &[SearchHit]) -> SearchEvent {
    let mut open = true;
    let mut event = SearchEvent::Idle;
    egui::Window::new("Search")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_TOP, egui::vec2(0.0, 60.0))
        .show(ctx, |ui| {
            let input = ui.add(
                TextEdit::singleline(query)
                    .hint_text("Search people, classes, homework...")
                    .desired_width(f32::INFINITY),
            );
            input.request_focus();
            if ui.input(|i| i.key_pressed(Key::Escape)) {
                event = SearchEvent::Close;
            }
            ui.separator();
            if query.trim().is_empty() {
                ui.weak("Start typing to search.");
                return;
            }
            if hits.is_empty() {
                widgets::empty_state(ui, "No matches.");
                return;
            }
            ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                for hit in hits {
                    if widgets::nav_row(ui, &hit.label, &hit.detail) {
                        event = SearchEvent::Open(hit.frame.clone());
                    }
                }
            });
        });
    if !open {
        event = SearchEvent::Close;
    }
    event
}

/// Returns false once the user closes the window.
pub fn chat_window(ctx: &Context, chat: &mut AssistantChat, ai: &AiService, theme: &ThemeConfig) -> bool {
    let mut open = true;
    egui::Window::new("Assistant")
        .open(&mut open)
        .collapsible(false)
        .default_size([360.0, 440.0])
        .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -80.0))
        .show(ctx, |ui| {
            let log_height = (ui.available_height() - 40.0).max(200.0);
            ScrollArea::vertical()
                .auto_shrink([false; 2])
                .stick_to_bottom(true)
                .max_height(log_height)
                .show(ui, |ui| {
                    if chat.lines().is_empty() {
                        ui.weak("Ask about timetables, homework or school life.");
                    }
                    for line in chat.lines() {
                        let (sender, mine) = match line.speaker {
                            Speaker::User => ("You", true),
                            Speaker::Assistant => (ASSISTANT_NAME, false),
                        };
                        widgets::chat_bubble(ui, theme, sender, &line.text, mine);
                    }
                });
            ui.separator();
            ui.horizontal(|ui| {
                let input = ui.add(
                    TextEdit::singleline(&mut chat.input).hint_text("Ask the assistant..."),
                );
                let enter = input.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
                let send = ui
                    .add_enabled(!chat.is_waiting(), egui::Button::new("Send"))
                    .clicked();
                if enter || send {
                    chat.send(ai);
                }
            });
        });
    open
}

pub enum NotificationEvent {
    Idle,
    Close,
    MarkAllRead,
}

pub fn notifications_window(ctx: &Context, notifications: &[Notification]) -> NotificationEvent {
    let mut open = true;
    let mut event = NotificationEvent::Idle;
    egui::Window::new("Notifications")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::RIGHT_TOP, egui::vec2(-16.0, 48.0))
        .show(ctx, |ui| {
            if notifications.is_empty() {
                widgets::empty_state(ui, "You're all caught up.");
                return;
            }
            for note in notifications.iter().rev() {
                let text = RichText::new(&note.text);
                if note.read {
                    ui.label(text.weak());
                } else {
                    ui.label(text.strong());
                }
            }
            ui.separator();
            if ui.button("Mark all read").clicked() {
                event = NotificationEvent::MarkAllRead;
            }
        });
    if !open {
        event = NotificationEvent::Close;
    }
    event
}
