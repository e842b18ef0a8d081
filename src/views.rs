use std::fmt;

use crate::navigation::NavigationFrame;
use crate::role::{Role, TabSpec};

pub trait ViewId: Copy + Eq + fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn id(self) -> &'static str;

    fn parse(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.id() == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<V> {
    Known(V),
    Missing(String),
}

pub fn resolve<V: ViewId>(id: &str) -> Resolved<V> {
    match V::parse(id) {
        Some(view) => Resolved::Known(view),
        None => Resolved::Missing(id.to_string()),
    }
}

pub fn placeholder_text(id: &str) -> String {
    format!("View not found: {id}")
}

/// Static description of one role's dashboard.
pub trait RoleRegistry: 'static {
    type View: ViewId;

    const ROLE: Role;
    const HOME: &'static str;
    const HOME_TITLE: &'static str;

    fn tabs() -> &'static [TabSpec];

    fn root_frame() -> NavigationFrame {
        NavigationFrame::root(Self::HOME, Self::HOME_TITLE)
    }

    fn tab(id: &str) -> Option<&'static TabSpec> {
        Self::tabs().iter().find(|t| t.id == id)
    }
}

// ---------------------------------------------------------------- admin

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    Overview,
    Students,
    StudentDetail,
    Classes,
    ClassDetail,
    Announcements,
    NewAnnouncement,
    Reports,
}

impl ViewId for AdminView {
    const ALL: &'static [Self] = &[
        AdminView::Overview,
        AdminView::Students,
        AdminView::StudentDetail,
        AdminView::Classes,
        AdminView::ClassDetail,
        AdminView::Announcements,
        AdminView::NewAnnouncement,
        AdminView::Reports,
    ];

    fn id(self) -> &'static str {
        match self {
            AdminView::Overview => "overview",
            AdminView::Students => "students",
            AdminView::StudentDetail => "studentDetail",
            AdminView::Classes => "classes",
            AdminView::ClassDetail => "classDetail",
            AdminView::Announcements => "announcements",
            AdminView::NewAnnouncement => "newAnnouncement",
            AdminView::Reports => "reports",
        }
    }
}

pub struct AdminRegistry;

impl RoleRegistry for AdminRegistry {
    type View = AdminView;
    const ROLE: Role = Role::Admin;
    const HOME: &'static str = "overview";
    const HOME_TITLE: &'static str = "Admin Dashboard";

    fn tabs() -> &'static [TabSpec] {
        &[
            TabSpec {
                id: "overview",
                label: "Home",
                icon: "🏠",
                title: "Admin Dashboard",
            },
            TabSpec {
                id: "students",
                label: "Students",
                icon: "👥",
                title: "Students",
            },
            TabSpec {
                id: "classes",
                label: "Classes",
                icon: "🏫",
                title: "Classes",
            },
            TabSpec {
                id: "announcements",
                label: "News",
                icon: "📢",
                title: "Announcements",
            },
        ]
    }
}

// ---------------------------------------------------------------- teacher

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeacherView {
    Overview,
    Classes,
    ClassDetail,
    Attendance,
    Gradebook,
    LessonPlanner,
    QuizGenerator,
    SubmissionFeedback,
    Messages,
    Conversation,
    ReportCards,
}

impl ViewId for TeacherView {
    const ALL: &'static [Self] = &[
        TeacherView::Overview,
        TeacherView::Classes,
        TeacherView::ClassDetail,
        TeacherView::Attendance,
        TeacherView::Gradebook,
        TeacherView::LessonPlanner,
        TeacherView::QuizGenerator,
        TeacherView::SubmissionFeedback,
        TeacherView::Messages,
        TeacherView::Conversation,
        TeacherView::ReportCards,
    ];

    fn id(self) -> &'static str {
        match self {
            TeacherView::Overview => "overview",
            TeacherView::Classes => "classes",
            TeacherView::ClassDetail => "classDetail",
            TeacherView::Attendance => "attendance",
            TeacherView::Gradebook => "gradebook",
            TeacherView::LessonPlanner => "lessonPlanner",
            TeacherView::QuizGenerator => "quizGenerator",
            TeacherView::SubmissionFeedback => "submissionFeedback",
            TeacherView::Messages => "messages",
            TeacherView::Conversation => "conversation",
            TeacherView::ReportCards => "reportCards",
        }
    }
}

pub struct TeacherRegistry;

impl RoleRegistry for TeacherRegistry {
    type View = TeacherView;
    const ROLE: Role = Role::Teacher;
    const HOME: &'static str = "overview";
    const HOME_TITLE: &'static str = "Teacher Dashboard";

    fn tabs() -> &'static [TabSpec] {
        &[
            TabSpec {
                id: "overview",
                label: "Home",
                icon: "🏠",
                title: "Teacher Dashboard",
            },
            TabSpec {
                id: "classes",
                label: "Classes",
                icon: "🏫",
                title: "My Classes",
            },
            TabSpec {
                id: "lessonPlanner",
                label: "Planner",
                icon: "📝",
                title: "Lesson Planner",
            },
            TabSpec {
                id: "messages",
                label: "Messages",
                icon: "💬",
                title: "Messages",
            },
        ]
    }
}

// ---------------------------------------------------------------- parent

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentView {
    Overview,
    Progress,
    Attendance,
    ReportCard,
    ProgressSummary,
    Messages,
    Conversation,
}

impl ViewId for ParentView {
    const ALL: &'static [Self] = &[
        ParentView::Overview,
        ParentView::Progress,
        ParentView::Attendance,
        ParentView::ReportCard,
        ParentView::ProgressSummary,
        ParentView::Messages,
        ParentView::Conversation,
    ];

    fn id(self) -> &'static str {
        match self {
            ParentView::Overview => "overview",
            ParentView::Progress => "progress",
            ParentView::Attendance => "attendance",
            ParentView::ReportCard => "reportCard",
            ParentView::ProgressSummary => "progressSummary",
            ParentView::Messages => "messages",
            ParentView::Conversation => "conversation",
        }
    }
}

pub struct ParentRegistry;

impl RoleRegistry for ParentRegistry {
    type View = ParentView;
    const ROLE: Role = Role::Parent;
    const HOME: &'static str = "overview";
    const HOME_TITLE: &'static str = "Parent Dashboard";

    fn tabs() -> &'static [TabSpec] {
        &[
            TabSpec {
                id: "overview",
                label: "Home",
                icon: "🏠",
                title: "Parent Dashboard",
            },
            TabSpec {
                id: "progress",
                label: "Progress",
                icon: "📈",
                title: "Progress",
            },
            TabSpec {
                id: "messages",
                label: "Messages",
                icon: "💬",
                title: "Messages",
            },
        ]
    }
}

// ---------------------------------------------------------------- student

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentView {
    Overview,
    Assignments,
    AssignmentDetail,
    Grades,
    StudyHelper,
    PracticeQuiz,
    Timetable,
}

impl ViewId for StudentView {
    const ALL: &'static [Self] = &[
        StudentView::Overview,
        StudentView::Assignments,
        StudentView::AssignmentDetail,
        StudentView::Grades,
        StudentView::StudyHelper,
        StudentView::PracticeQuiz,
        StudentView::Timetable,
    ];

    fn id(self) -> &'static str {
        match self {
            StudentView::Overview => "overview",
            StudentView::Assignments => "assignments",
            StudentView::AssignmentDetail => "assignmentDetail",
            StudentView::Grades => "grades",
            StudentView::StudyHelper => "studyHelper",
            StudentView::PracticeQuiz => "practiceQuiz",
            StudentView::Timetable => "timetable",
        }
    }
}

pub struct StudentRegistry;

impl RoleRegistry for StudentRegistry {
    type View = StudentView;
    const ROLE: Role = Role::Student;
    const HOME: &'static str = "overview";
    const HOME_TITLE: &'static str = "Student Dashboard";

    fn tabs() -> &'static [TabSpec] {
        &[
            TabSpec {
                id: "overview",
                label: "Home",
                icon: "🏠",
                title: "Student Dashboard",
            },
            TabSpec {
                id: "assignments",
                label: "Homework",
                icon: "📚",
                title: "Assignments",
            },
            TabSpec {
                id: "grades",
                label: "Grades",
                icon: "🎓",
                title: "My Grades",
            },
            TabSpec {
                id: "studyHelper",
                label: "Study",
                icon: "✨",
                title: "Study Helper",
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_registry_complete<R: RoleRegistry>() {
        for view in R::View::ALL {
            assert_eq!(
                resolve::<R::View>(view.id()),
                Resolved::Known(*view),
                "{:?} did not resolve in {} registry",
                view,
                R::ROLE
            );
        }
        assert_eq!(
            resolve::<R::View>("nonexistent"),
            Resolved::Missing("nonexistent".to_string())
        );
    }

    fn assert_tabs_resolve<R: RoleRegistry>() {
        assert!(R::View::parse(R::HOME).is_some());
        assert_eq!(R::tabs()[0].id, R::HOME);
        for tab in R::tabs() {
            assert!(
                R::View::parse(tab.id).is_some(),
                "tab {} has no view in {} registry",
                tab.id,
                R::ROLE
            );
        }
    }

    #[test]
    fn every_registered_key_resolves() {
        assert_registry_complete::<AdminRegistry>();
        assert_registry_complete::<TeacherRegistry>();
        assert_registry_complete::<ParentRegistry>();
        assert_registry_complete::<StudentRegistry>();
    }

    #[test]
    fn tab_roots_are_registered_views() {
        assert_tabs_resolve::<AdminRegistry>();
        assert_tabs_resolve::<TeacherRegistry>();
        assert_tabs_resolve::<ParentRegistry>();
        assert_tabs_resolve::<StudentRegistry>();
    }

    #[test]
    fn registries_are_disjoint_for_role_specific_views() {
        assert!(matches!(
            resolve::<AdminView>("lessonPlanner"),
            Resolved::Missing(_)
        ));
        assert!(matches!(
            resolve::<StudentView>("gradebook"),
            Resolved::Missing(_)
        ));
    }

    #[test]
    fn lookup_is_exact() {
        assert!(matches!(
            resolve::<TeacherView>("ClassDetail"),
            Resolved::Missing(_)
        ));
        assert_eq!(placeholder_text("nope"), "View not found: nope");
    }
}
