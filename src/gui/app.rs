use std::time::Duration;

use eframe::{
    egui::{self, Align2, CentralPanel, ComboBox, Context, Id, RichText, TopBottomPanel},
    App, CreationContext,
};
use tracing::{info, warn};

use super::overlays::{self, NotificationEvent, SearchEvent};
use super::screens::{screens_for, RoleScreens, ScreenCx};
use super::widgets;
use crate::ai::AiService;
use crate::chat::AssistantChat;
use crate::role::Role;
use crate::search::search;
use crate::session::Session;
use crate::settings::Settings;
use crate::shell::{Navigator, Overlay};
use crate::store::{StoreCommand, StoreHandle};
use crate::theme::{apply_theme, parse_color, preset, preset_names, ThemeConfig};

/// Everything that exists only while someone is signed in. Dropped on logout.
struct SignedIn {
    session: Session,
    dashboard: Box<dyn RoleScreens>,
    navigator: Navigator,
    chat: AssistantChat,
    search_query: String,
    show_notifications: bool,
}

pub struct SchoolHubApp {
    settings: Settings,
    store: StoreHandle,
    ai: AiService,
    theme: ThemeConfig,
    login_role: Role,
    signed_in: Option<SignedIn>,
}

impl SchoolHubApp {
    pub fn new(
        cc: &CreationContext<'_>,
        settings: Settings,
        store: StoreHandle,
        ai: AiService,
        initial_role: Option<Role>,
    ) -> Self {
        let theme = preset(&settings.ui.theme);
        apply_theme(&theme, &cc.egui_ctx);
        let mut app = Self {
            settings,
            store,
            ai,
            theme,
            login_role: initial_role.unwrap_or(Role::Teacher),
            signed_in: None,
        };
        if let Some(role) = initial_role {
            app.sign_in(role);
        }
        app
    }

    fn sign_in(&mut self, role: Role) {
        let session = Session::login(&self.store.read(), role);
        // A fresh dashboard starts at the role's root frame.
        let dashboard = screens_for(role);
        self.theme = preset(&self.settings.ui.theme).branded(role.theme());
        self.signed_in = Some(SignedIn {
            session,
            dashboard,
            navigator: Navigator::new(),
            chat: AssistantChat::new(),
            search_query: String::new(),
            show_notifications: false,
        });
    }

    fn sign_out(&mut self) {
        if let Some(active) = self.signed_in.take() {
            info!(role = %active.session.role, "signed out");
        }
        self.theme = preset(&self.settings.ui.theme);
    }

    fn render_login(&mut self, ctx: &Context) {
        CentralPanel::default().show(ctx, |ui| {
            ui.add_space(40.0);
            ui.vertical_centered(|ui| {
                ui.heading(
                    RichText::new("SchoolHub")
                        .size(28.0)
                        .color(parse_color(&self.theme.accent)),
                );
                ui.label(self.store.read().school_name.clone());
                ui.add_space(20.0);
                ui.label("Sign in as");
                for role in Role::ALL {
                    ui.radio_value(&mut self.login_role, role, role.label());
                }
                ui.add_space(12.0);
                ComboBox::from_id_source("theme_preset")
                    .selected_text(self.settings.ui.theme.clone())
                    .show_ui(ui, |ui| {
                        for name in preset_names() {
                            let label = name.clone();
                            ui.selectable_value(&mut self.settings.ui.theme, name, label);
                        }
                    });
                ui.add_space(12.0);
                if ui.button("Sign in").clicked() {
                    self.sign_in(self.login_role);
                }
                ui.add_space(8.0);
                ui.weak("Demo accounts only. Nothing you do here is saved.");
            });
        });
        if self.signed_in.is_none() {
            self.theme = preset(&self.settings.ui.theme);
        }
    }

    fn render_dashboard(&mut self, ctx: &Context) {
        let Some(active) = self.signed_in.as_mut() else {
            return;
        };
        let role = active.session.role;

        let chat_changed = active.chat.poll();
        let busy = active.dashboard.poll() || active.chat.is_waiting();
        if busy {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else if chat_changed {
            ctx.request_repaint();
        }

        let unread = self.store.read().unread_notifications(role);
        let header = active.dashboard.header(unread);

        TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            let response = widgets::header(ui, &header, &self.theme);
            if response.back {
                active.navigator.handle_back();
            }
            if response.search {
                active.navigator.open_search();
            }
            if response.notifications {
                active.show_notifications = !active.show_notifications;
            }
            if response.logout {
                active.navigator.logout();
            }
            ui.add_space(4.0);
        });

        TopBottomPanel::bottom("bottom_nav").show(ctx, |ui| {
            ui.add_space(4.0);
            let tabs = active.dashboard.tabs();
            if let Some(tab) = widgets::bottom_nav(ui, tabs, active.dashboard.active_tab()) {
                active.dashboard.select_tab(tab);
            }
            ui.add_space(4.0);
        });

        CentralPanel::default().show(ctx, |ui| {
            let mut cx = ScreenCx {
                store: &self.store,
                ai: &self.ai,
                session: &active.session,
                theme: &self.theme,
                nav: &mut active.navigator,
            };
            active.dashboard.render(ui, &mut cx);
        });

        if active.dashboard.is_home_page() {
            egui::Area::new(Id::new("assistant_fab"))
                .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -72.0))
                .show(ctx, |ui| {
                    let button = egui::Button::new(RichText::new("💬 Ask").size(16.0).strong())
                        .fill(parse_color(&self.theme.accent_soft))
                        .rounding(egui::Rounding::same(20.0));
                    if ui.add(button).on_hover_text("Ask the assistant").clicked() {
                        active.navigator.open_chat();
                    }
                });
        }

        match active.dashboard.overlay() {
            Overlay::Search => {
                let hits = search(
                    &self.store.read(),
                    role,
                    &active.session.user_id,
                    &active.search_query,
                );
                match overlays::search_window(ctx, &mut active.search_query, &hits) {
                    SearchEvent::Idle => {}
                    SearchEvent::Close => {
                        active.navigator.close_overlay();
                        active.search_query.clear();
                    }
                    SearchEvent::Open(frame) => {
                        active.navigator.close_overlay();
                        active.search_query.clear();
                        active.navigator.open(frame);
                    }
                }
            }
            Overlay::Chat => {
                if !overlays::chat_window(ctx, &mut active.chat, &self.ai, &self.theme) {
                    active.navigator.close_overlay();
                }
            }
            Overlay::None => {}
        }

        if active.show_notifications {
            let notifications: Vec<_> = self
                .store
                .read()
                .notifications_for(role)
                .into_iter()
                .cloned()
                .collect();
            match overlays::notifications_window(ctx, &notifications) {
                NotificationEvent::Idle => {}
                NotificationEvent::Close => active.show_notifications = false,
                NotificationEvent::MarkAllRead => {
                    if let Err(e) = self
                        .store
                        .dispatch(StoreCommand::MarkNotificationsRead { audience: role })
                    {
                        warn!(error = %e, "could not mark notifications read");
                    }
                }
            }
        }

        let actions = active.navigator.drain();
        let queued = !actions.is_empty();
        let outcome = active.dashboard.apply(actions);
        // Queued changes land after this frame was drawn.
        if queued || outcome.refreshed {
            ctx.request_repaint();
        }
        if outcome.logout {
            self.sign_out();
        }
    }
}

impl App for SchoolHubApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        apply_theme(&self.theme, ctx);
        if self.signed_in.is_some() {
            self.render_dashboard(ctx);
        } else {
            self.render_login(ctx);
        }
    }
}

pub fn launch_gui(
    settings: Settings,
    store: StoreHandle,
    ai: AiService,
    initial_role: Option<Role>,
) -> eframe::Result<()> {
    let (width, height) = settings.ui.window_size;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("SchoolHub")
            .with_inner_size([width, height])
            .with_min_inner_size([380.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SchoolHub",
        native_options,
        Box::new(move |cc| Box::new(SchoolHubApp::new(cc, settings, store, ai, initial_role))),
    )
}
