use std::marker::PhantomData;

use tracing::{debug, info};

use crate::navigation::{NavigationFrame, NavigationStack, Props};
use crate::role::{Role, TabSpec};
use crate::views::{resolve, Resolved, RoleRegistry, ViewId};

/// Callbacks a view may issue while rendering. They are applied after the view returns.
#[derive(Debug, Clone, PartialEq)]
pub enum NavAction {
    NavigateTo(NavigationFrame),
    Back,
    Logout,
    Refresh,
    SetOverlay(Overlay),
}

#[derive(Debug, Default)]
pub struct Navigator {
    queued: Vec<NavAction>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigate_to(&mut self, view: &str, title: impl Into<String>, props: Props) {
        self.queued
            .push(NavAction::NavigateTo(NavigationFrame::new(view, title, props)));
    }

    pub fn open(&mut self, frame: NavigationFrame) {
        self.queued.push(NavAction::NavigateTo(frame));
    }

    pub fn handle_back(&mut self) {
        self.queued.push(NavAction::Back);
    }

    pub fn open_search(&mut self) {
        self.queued.push(NavAction::SetOverlay(Overlay::Search));
    }

    pub fn open_chat(&mut self) {
        self.queued.push(NavAction::SetOverlay(Overlay::Chat));
    }

    pub fn close_overlay(&mut self) {
        self.queued.push(NavAction::SetOverlay(Overlay::None));
    }

    pub fn logout(&mut self) {
        self.queued.push(NavAction::Logout);
    }

    pub fn refresh(&mut self) {
        self.queued.push(NavAction::Refresh);
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn drain(&mut self) -> Vec<NavAction> {
        std::mem::take(&mut self.queued)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Search,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Home,
    Detail,
    SearchOverlay,
    ChatOverlay,
}

impl UiMode {
    pub fn derive(current_view: &str, home_view: &str, overlay: Overlay) -> UiMode {
        match overlay {
            Overlay::Search => UiMode::SearchOverlay,
            Overlay::Chat => UiMode::ChatOverlay,
            Overlay::None if current_view == home_view => UiMode::Home,
            Overlay::None => UiMode::Detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderModel {
    pub title: String,
    pub show_back: bool,
    pub badge: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellOutcome {
    pub logout: bool,
    pub refreshed: bool,
}

pub struct DashboardShell<R: RoleRegistry> {
    stack: NavigationStack,
    active_tab: &'static str,
    overlay: Overlay,
    mode: UiMode,
    refresh_generation: u64,
    _registry: PhantomData<R>,
}

impl<R: RoleRegistry> Default for DashboardShell<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RoleRegistry> DashboardShell<R> {
    pub fn new() -> Self {
        Self {
            stack: NavigationStack::new(R::root_frame()),
            active_tab: R::HOME,
            overlay: Overlay::None,
            mode: UiMode::Home,
            refresh_generation: 0,
            _registry: PhantomData,
        }
    }

    pub fn role(&self) -> Role {
        R::ROLE
    }

    pub fn current(&self) -> &NavigationFrame {
        self.stack.current()
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn resolve_current(&self) -> Resolved<R::View> {
        resolve::<R::View>(&self.stack.current().view)
    }

    pub fn navigate_to(&mut self, view: &str, title: impl Into<String>, props: Props) {
        let title = title.into();
        debug!(role = %R::ROLE, view, title = %title, "navigate");
        self.stack.push(view, title, props);
        self.recompute_mode();
    }

    pub fn handle_back(&mut self) {
        if let Some(frame) = self.stack.pop() {
            debug!(role = %R::ROLE, from = %frame.view, "back");
        }
        self.recompute_mode();
    }

    /// Resets the stack to the tab's root frame. Unknown tab ids are ignored.
    pub fn select_tab(&mut self, tab_id: &str) -> bool {
        let Some(tab) = R::tab(tab_id) else {
            debug!(role = %R::ROLE, tab_id, "unknown tab");
            return false;
        };
        self.active_tab = tab.id;
        self.overlay = Overlay::None;
        self.stack.reset(tab.root_frame());
        self.recompute_mode();
        true
    }

    pub fn active_tab(&self) -> &'static str {
        self.active_tab
    }

    pub fn tabs(&self) -> &'static [TabSpec] {
        R::tabs()
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn open_search(&mut self) {
        self.overlay = Overlay::Search;
        self.recompute_mode();
    }

    pub fn open_chat(&mut self) {
        self.overlay = Overlay::Chat;
        self.recompute_mode();
    }

    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
        self.recompute_mode();
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    pub fn is_home_page(&self) -> bool {
        self.mode == UiMode::Home
    }

    pub fn refresh_generation(&self) -> u64 {
        self.refresh_generation
    }

    pub fn header(&self, unread_notifications: usize) -> HeaderModel {
        HeaderModel {
            title: self.stack.current().title.clone(),
            show_back: self.stack.depth() > 1,
            badge: unread_notifications,
        }
    }

    pub fn apply(&mut self, actions: Vec<NavAction>) -> ShellOutcome {
        let mut outcome = ShellOutcome::default();
        for action in actions {
            match action {
                NavAction::NavigateTo(frame) => {
                    self.navigate_to(&frame.view, frame.title, frame.props)
                }
                NavAction::Back => self.handle_back(),
                NavAction::SetOverlay(Overlay::Search) => self.open_search(),
                NavAction::SetOverlay(Overlay::Chat) => self.open_chat(),
                NavAction::SetOverlay(Overlay::None) => self.close_overlay(),
                NavAction::Refresh => {
                    self.refresh_generation += 1;
                    outcome.refreshed = true;
                }
                NavAction::Logout => {
                    info!(role = %R::ROLE, "logout requested");
                    outcome.logout = true;
                    // Anything queued after a logout targets a dashboard that is going away.
                    break;
                }
            }
        }
        outcome
    }

    fn recompute_mode(&mut self) {
        let mode = UiMode::derive(&self.stack.current().view, R::HOME, self.overlay);
        if mode != self.mode {
            debug!(role = %R::ROLE, ?mode, "ui mode changed");
        }
        self.mode = mode;
    }
}

/// Role-erased view of a shell, used by the CLI and the session layer.
pub trait Dashboard {
    fn role(&self) -> Role;
    fn current(&self) -> &NavigationFrame;
    fn depth(&self) -> usize;
    fn frames(&self) -> &[NavigationFrame];
    fn navigate_to(&mut self, view: &str, title: &str, props: Props);
    fn handle_back(&mut self);
    fn select_tab(&mut self, tab_id: &str) -> bool;
    fn tabs(&self) -> &'static [TabSpec];
    fn active_tab(&self) -> &'static str;
    fn mode(&self) -> UiMode;
    /// `Ok(view id)` if the current frame names a registered view, else the placeholder text.
    fn resolve_label(&self) -> Result<&'static str, String>;
}

impl<R: RoleRegistry> Dashboard for DashboardShell<R> {
    fn role(&self) -> Role {
        R::ROLE
    }

    fn current(&self) -> &NavigationFrame {
        self.stack.current()
    }

    fn depth(&self) -> usize {
        self.stack.depth()
    }

    fn frames(&self) -> &[NavigationFrame] {
        self.stack.frames()
    }

    fn navigate_to(&mut self, view: &str, title: &str, props: Props) {
        DashboardShell::navigate_to(self, view, title, props)
    }

    fn handle_back(&mut self) {
        DashboardShell::handle_back(self)
    }

    fn select_tab(&mut self, tab_id: &str) -> bool {
        DashboardShell::select_tab(self, tab_id)
    }

    fn tabs(&self) -> &'static [TabSpec] {
        R::tabs()
    }

    fn active_tab(&self) -> &'static str {
        self.active_tab
    }

    fn mode(&self) -> UiMode {
        self.mode
    }

    fn resolve_label(&self) -> Result<&'static str, String> {
        match self.resolve_current() {
            Resolved::Known(view) => Ok(view.id()),
            Resolved::Missing(id) => Err(crate::views::placeholder_text(&id)),
        }
    }
}

pub fn dashboard_for(role: Role) -> Box<dyn Dashboard> {
    use crate::views::{AdminRegistry, ParentRegistry, StudentRegistry, TeacherRegistry};
    match role {
        Role::Admin => Box::new(DashboardShell::<AdminRegistry>::new()),
        Role::Teacher => Box::new(DashboardShell::<TeacherRegistry>::new()),
        Role::Parent => Box::new(DashboardShell::<ParentRegistry>::new()),
        Role::Student => Box::new(DashboardShell::<StudentRegistry>::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{StudentRegistry, TeacherRegistry, TeacherView};

    #[test]
    fn teacher_class_detail_round_trip() {
        let mut shell = DashboardShell::<TeacherRegistry>::new();
        let root = shell.current().clone();
        assert_eq!(root, NavigationFrame::root("overview", "Teacher Dashboard"));

        let class_info = Props::new().with("classId", "10A").with("name", "Class 10A");
        shell.navigate_to("classDetail", "Class 10A", class_info.clone());

        assert_eq!(shell.depth(), 2);
        assert_eq!(
            shell.current(),
            &NavigationFrame::new("classDetail", "Class 10A", class_info)
        );
        assert_eq!(
            shell.resolve_current(),
            Resolved::Known(TeacherView::ClassDetail)
        );

        shell.handle_back();
        assert_eq!(shell.depth(), 1);
        assert_eq!(shell.current(), &root);
    }

    #[test]
    fn home_flag_requires_home_view_and_no_overlay() {
        let mut shell = DashboardShell::<TeacherRegistry>::new();
        assert!(shell.is_home_page());

        shell.open_search();
        assert!(!shell.is_home_page());
        assert_eq!(shell.mode(), UiMode::SearchOverlay);
        shell.close_overlay();

        shell.open_chat();
        assert!(!shell.is_home_page());
        assert_eq!(shell.mode(), UiMode::ChatOverlay);
        shell.close_overlay();
        assert!(shell.is_home_page());

        shell.navigate_to("classes", "My Classes", Props::new());
        assert!(!shell.is_home_page());
        assert_eq!(shell.mode(), UiMode::Detail);
        shell.open_chat();
        assert!(!shell.is_home_page());
        shell.close_overlay();
        assert!(!shell.is_home_page());
    }

    #[test]
    fn home_view_pushed_again_counts_as_home() {
        let mut shell = DashboardShell::<StudentRegistry>::new();
        shell.navigate_to("grades", "My Grades", Props::new());
        shell.navigate_to("overview", "Student Dashboard", Props::new());
        assert!(shell.is_home_page());
        assert_eq!(shell.depth(), 3);
    }

    #[test]
    fn header_shows_back_only_below_root() {
        let mut shell = DashboardShell::<TeacherRegistry>::new();
        let header = shell.header(3);
        assert!(!header.show_back);
        assert_eq!(header.badge, 3);
        assert_eq!(header.title, "Teacher Dashboard");

        shell.navigate_to("gradebook", "Gradebook", Props::new());
        let header = shell.header(0);
        assert!(header.show_back);
        assert_eq!(header.title, "Gradebook");
    }

    #[test]
    fn tab_selection_resets_and_is_idempotent() {
        let mut shell = DashboardShell::<TeacherRegistry>::new();
        shell.navigate_to("classes", "My Classes", Props::new());
        shell.navigate_to("classDetail", "Class 10A", Props::new());

        assert!(shell.select_tab("messages"));
        assert_eq!(shell.depth(), 1);
        assert_eq!(shell.current().view, "messages");
        assert_eq!(shell.active_tab(), "messages");

        assert!(shell.select_tab("messages"));
        assert_eq!(shell.depth(), 1);
        assert_eq!(shell.current().view, "messages");

        assert!(!shell.select_tab("nope"));
        assert_eq!(shell.current().view, "messages");
    }

    #[test]
    fn unknown_view_resolves_to_placeholder() {
        let mut shell = DashboardShell::<TeacherRegistry>::new();
        shell.navigate_to("nonexistent", "Broken", Props::new());
        assert_eq!(
            Dashboard::resolve_label(&shell),
            Err("View not found: nonexistent".to_string())
        );
        shell.handle_back();
        assert_eq!(Dashboard::resolve_label(&shell), Ok("overview"));
    }

    #[test]
    fn queued_actions_apply_in_order_and_stop_at_logout() {
        let mut shell = DashboardShell::<TeacherRegistry>::new();
        let mut nav = Navigator::new();
        nav.navigate_to("classes", "My Classes", Props::new());
        nav.navigate_to("classDetail", "Class 10A", Props::new());
        nav.handle_back();
        nav.refresh();
        nav.logout();
        nav.navigate_to("gradebook", "Gradebook", Props::new());

        let outcome = shell.apply(nav.drain());
        assert!(nav.is_empty());
        assert!(outcome.logout);
        assert!(outcome.refreshed);
        assert_eq!(shell.depth(), 2);
        assert_eq!(shell.current().view, "classes");
        assert_eq!(shell.refresh_generation(), 1);
    }

    #[test]
    fn boxed_dashboard_matches_role() {
        for role in Role::ALL {
            let dash = dashboard_for(role);
            assert_eq!(dash.role(), role);
            assert_eq!(dash.depth(), 1);
            assert_eq!(dash.mode(), UiMode::Home);
        }
    }
}
