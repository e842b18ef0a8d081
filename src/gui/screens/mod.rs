mod admin;
mod common;
mod parent;
mod student;
mod teacher;

use eframe::egui;

use crate::ai::AiService;
use crate::navigation::NavigationFrame;
use crate::role::{Role, TabSpec};
use crate::session::Session;
use crate::shell::{DashboardShell, HeaderModel, NavAction, Navigator, Overlay, ShellOutcome};
use crate::store::StoreHandle;
use crate::theme::ThemeConfig;
use crate::views::{placeholder_text, Resolved, RoleRegistry};

use super::widgets;

pub struct ScreenCx<'a> {
    pub store: &'a StoreHandle,
    pub ai: &'a AiService,
    pub session: &'a Session,
    pub theme: &'a ThemeConfig,
    pub nav: &'a mut Navigator,
}

/// The screens of one role. Only ever sees views its registry knows.
pub trait Screens: Default {
    type Registry: RoleRegistry;

    fn render(
        &mut self,
        view: <Self::Registry as RoleRegistry>::View,
        frame: &NavigationFrame,
        ui: &mut egui::Ui,
        cx: &mut ScreenCx<'_>,
    );

    /// Polls pending generations. Returns true while any is still running.
    fn poll(&mut self) -> bool;
}

/// Role-erased dashboard the app holds for the signed-in session.
pub trait RoleScreens {
    fn role(&self) -> Role;
    fn header(&self, unread: usize) -> HeaderModel;
    fn tabs(&self) -> &'static [TabSpec];
    fn active_tab(&self) -> &'static str;
    fn select_tab(&mut self, tab_id: &str) -> bool;
    fn handle_back(&mut self);
    fn apply(&mut self, actions: Vec<NavAction>) -> ShellOutcome;
    fn is_home_page(&self) -> bool;
    fn overlay(&self) -> Overlay;
    fn render(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>);
    fn poll(&mut self) -> bool;
}

pub struct RoleDashboard<S: Screens> {
    shell: DashboardShell<S::Registry>,
    screens: S,
}

impl<S: Screens> RoleDashboard<S> {
    pub fn new() -> Self {
        Self {
            shell: DashboardShell::new(),
            screens: S::default(),
        }
    }
}

impl<S: Screens> RoleScreens for RoleDashboard<S> {
    fn role(&self) -> Role {
        self.shell.role()
    }

    fn header(&self, unread: usize) -> HeaderModel {
        self.shell.header(unread)
    }

    fn tabs(&self) -> &'static [TabSpec] {
        self.shell.tabs()
    }

    fn active_tab(&self) -> &'static str {
        self.shell.active_tab()
    }

    fn select_tab(&mut self, tab_id: &str) -> bool {
        self.shell.select_tab(tab_id)
    }

    fn handle_back(&mut self) {
        self.shell.handle_back()
    }

    fn apply(&mut self, actions: Vec<NavAction>) -> ShellOutcome {
        self.shell.apply(actions)
    }

    fn is_home_page(&self) -> bool {
        self.shell.is_home_page()
    }

    fn overlay(&self) -> Overlay {
        self.shell.overlay()
    }

    fn render(&mut self, ui: &mut egui::Ui, cx: &mut ScreenCx<'_>) {
        let frame = self.shell.current().clone();
        match self.shell.resolve_current() {
            Resolved::Known(view) => self.screens.render(view, &frame, ui, cx),
            Resolved::Missing(id) => widgets::placeholder(ui, &placeholder_text(&id)),
        }
    }

    fn poll(&mut self) -> bool {
        self.screens.poll()
    }
}

pub fn screens_for(role: Role) -> Box<dyn RoleScreens> {
    match role {
        Role::Admin => Box::new(RoleDashboard::<admin::AdminScreens>::new()),
        Role::Teacher => Box::new(RoleDashboard::<teacher::TeacherScreens>::new()),
        Role::Parent => Box::new(RoleDashboard::<parent::ParentScreens>::new()),
        Role::Student => Box::new(RoleDashboard::<student::StudentScreens>::new()),
    }
}

/// Checks required form fields in order. The first blank one becomes the inline message.
pub fn require(fields: &[(&str, &str)]) -> Result<(), String> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((label, _)) => Err(format!("{label} is required.")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Props;

    #[test]
    fn require_reports_first_blank_field() {
        assert_eq!(require(&[("Title", "Trip"), ("Message", "Bring lunch")]), Ok(()));
        assert_eq!(
            require(&[("Title", "  "), ("Message", "")]),
            Err("Title is required.".to_string())
        );
    }

    #[test]
    fn each_role_starts_home_with_its_own_tabs() {
        for role in Role::ALL {
            let dashboard = screens_for(role);
            assert_eq!(dashboard.role(), role);
            assert!(dashboard.is_home_page());
            assert!(!dashboard.header(0).show_back);
            assert_eq!(dashboard.active_tab(), "overview");
        }
    }

    #[test]
    fn opening_a_frame_leaves_home() {
        let mut dashboard = screens_for(Role::Student);
        let mut nav = Navigator::new();
        nav.open(NavigationFrame::new(
            "assignmentDetail",
            "Homework",
            Props::new().with("assignmentId", "hw-1"),
        ));
        dashboard.apply(nav.drain());
        assert!(!dashboard.is_home_page());
        assert!(dashboard.header(2).show_back);
        dashboard.handle_back();
        assert!(dashboard.is_home_page());
    }

    #[test]
    fn chat_overlay_hides_home_state() {
        let mut dashboard = screens_for(Role::Parent);
        let mut nav = Navigator::new();
        nav.open_chat();
        assert_eq!(dashboard.overlay(), Overlay::None);
        dashboard.apply(nav.drain());
        assert_eq!(dashboard.overlay(), Overlay::Chat);
        assert!(!dashboard.is_home_page());
        nav.close_overlay();
        dashboard.apply(nav.drain());
        assert!(dashboard.is_home_page());
    }

    #[test]
    fn search_result_closes_overlay_then_opens_frame() {
        let mut dashboard = screens_for(Role::Admin);
        let mut nav = Navigator::new();
        nav.open_search();
        dashboard.apply(nav.drain());
        assert_eq!(dashboard.overlay(), Overlay::Search);

        nav.close_overlay();
        nav.open(NavigationFrame::new(
            "studentDetail",
            "Noah Patel",
            Props::new().with("studentId", "s-3"),
        ));
        dashboard.apply(nav.drain());
        assert_eq!(dashboard.overlay(), Overlay::None);
        assert!(dashboard.header(0).show_back);
        assert!(!dashboard.is_home_page());
    }
}
