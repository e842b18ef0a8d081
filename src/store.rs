use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class_id: String,
    pub parent_id: Option<String>,
    pub year_level: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parent {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassInfo {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub teacher_id: String,
    pub room: String,
    #[serde(default)]
    pub schedule: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeEntry {
    pub student_id: String,
    pub subject: String,
    pub assessment: String,
    pub score: f32,
    pub max_score: f32,
}

impl GradeEntry {
    pub fn percent(&self) -> f32 {
        if self.max_score <= 0.0 {
            0.0
        } else {
            self.score / self.max_score * 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Excused,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Present,
        AttendanceStatus::Late,
        AttendanceStatus::Absent,
        AttendanceStatus::Excused,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Excused => "Excused",
        }
    }

    /// Late still counts as attended.
    pub fn counts_as_attended(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: String,
    pub class_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender_id: String,
    pub sender_name: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub subject: String,
    pub participant_ids: Vec<String>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub audience: Role,
    pub text: String,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCard {
    pub student_id: String,
    pub term: String,
    pub published: bool,
    pub teacher_comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub body: String,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub class_id: String,
    pub title: String,
    pub subject: String,
    pub due: NaiveDate,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub text: String,
    pub score: Option<f32>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SchoolStore {
    pub school_name: String,
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
    pub parents: Vec<Parent>,
    pub classes: Vec<ClassInfo>,
    pub grades: Vec<GradeEntry>,
    pub attendance: Vec<AttendanceRecord>,
    pub conversations: Vec<Conversation>,
    pub notifications: Vec<Notification>,
    pub report_cards: Vec<ReportCard>,
    pub announcements: Vec<Announcement>,
    pub assignments: Vec<Assignment>,
    pub submissions: Vec<Submission>,
}

impl SchoolStore {
    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    pub fn parent(&self, id: &str) -> Option<&Parent> {
        self.parents.iter().find(|p| p.id == id)
    }

    pub fn class(&self, id: &str) -> Option<&ClassInfo> {
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn assignment(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    pub fn submission(&self, id: &str) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.id == id)
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Display name for any person id, falling back to the raw id.
    pub fn person_name(&self, id: &str) -> String {
        self.student(id)
            .map(|s| s.name.clone())
            .or_else(|| self.teacher(id).map(|t| t.name.clone()))
            .or_else(|| self.parent(id).map(|p| p.name.clone()))
            .unwrap_or_else(|| id.to_string())
    }

    pub fn students_in_class(&self, class_id: &str) -> Vec<&Student> {
        self.students
            .iter()
            .filter(|s| s.class_id == class_id)
            .collect()
    }

    pub fn classes_for_teacher(&self, teacher_id: &str) -> Vec<&ClassInfo> {
        self.classes
            .iter()
            .filter(|c| c.teacher_id == teacher_id)
            .collect()
    }

    /// Homeroom class plus any subject sections split off it (`10A` and `10A-SCI`).
    pub fn classes_for_student(&self, student_id: &str) -> Vec<&ClassInfo> {
        let Some(student) = self.student(student_id) else {
            return Vec::new();
        };
        let prefix = format!("{}-", student.class_id);
        self.classes
            .iter()
            .filter(|c| c.id == student.class_id || c.id.starts_with(&prefix))
            .collect()
    }

    pub fn assignments_for_student(&self, student_id: &str) -> Vec<&Assignment> {
        let class_ids: Vec<&str> = self
            .classes_for_student(student_id)
            .into_iter()
            .map(|c| c.id.as_str())
            .collect();
        let mut out: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter(|a| class_ids.contains(&a.class_id.as_str()))
            .collect();
        out.sort_by_key(|a| a.due);
        out
    }

    pub fn children_of(&self, parent_id: &str) -> Vec<&Student> {
        self.students
            .iter()
            .filter(|s| s.parent_id.as_deref() == Some(parent_id))
            .collect()
    }

    pub fn grades_for(&self, student_id: &str) -> Vec<&GradeEntry> {
        self.grades
            .iter()
            .filter(|g| g.student_id == student_id)
            .collect()
    }

    pub fn attendance_for_student(&self, student_id: &str) -> Vec<&AttendanceRecord> {
        self.attendance
            .iter()
            .filter(|a| a.student_id == student_id)
            .collect()
    }

    pub fn attendance_for_class(&self, class_id: &str) -> Vec<&AttendanceRecord> {
        self.attendance
            .iter()
            .filter(|a| a.class_id == class_id)
            .collect()
    }

    pub fn attendance_on(
        &self,
        class_id: &str,
        student_id: &str,
        date: NaiveDate,
    ) -> Option<AttendanceStatus> {
        self.attendance
            .iter()
            .find(|a| a.class_id == class_id && a.student_id == student_id && a.date == date)
            .map(|a| a.status)
    }

    pub fn conversations_for(&self, person_id: &str) -> Vec<&Conversation> {
        self.conversations
            .iter()
            .filter(|c| c.participant_ids.iter().any(|p| p == person_id))
            .collect()
    }

    /// Newest first, the order `PostAnnouncement` maintains.
    pub fn latest_announcements(&self, limit: usize) -> impl Iterator<Item = &Announcement> {
        self.announcements.iter().take(limit)
    }

    pub fn unread_notifications(&self, audience: Role) -> usize {
        self.notifications
            .iter()
            .filter(|n| n.audience == audience && !n.read)
            .count()
    }

    pub fn notifications_for(&self, audience: Role) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| n.audience == audience)
            .collect()
    }

    pub fn report_card(&self, student_id: &str, term: &str) -> Option<&ReportCard> {
        self.report_cards
            .iter()
            .find(|r| r.student_id == student_id && r.term == term)
    }

    pub fn assignments_for_class(&self, class_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.class_id == class_id)
            .collect()
    }

    pub fn submissions_for_assignment(&self, assignment_id: &str) -> Vec<&Submission> {
        self.submissions
            .iter()
            .filter(|s| s.assignment_id == assignment_id)
            .collect()
    }

    pub fn submission_by(&self, assignment_id: &str, student_id: &str) -> Option<&Submission> {
        self.submissions
            .iter()
            .find(|s| s.assignment_id == assignment_id && s.student_id == student_id)
    }
}

/// Every mutation the UI can make to the shared data.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCommand {
    AppendMessage {
        conversation_id: String,
        sender_id: String,
        body: String,
    },
    SetReportCardPublished {
        student_id: String,
        term: String,
        published: bool,
    },
    MarkNotificationsRead {
        audience: Role,
    },
    PostAnnouncement {
        title: String,
        body: String,
    },
    RecordAttendance {
        class_id: String,
        student_id: String,
        date: NaiveDate,
        status: AttendanceStatus,
    },
    SetSubmissionFeedback {
        submission_id: String,
        feedback: String,
        score: Option<f32>,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("invalid input: {0}")]
    Invalid(String),
}

fn not_found(kind: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<RwLock<SchoolStore>>,
    revision: Arc<AtomicU64>,
}

impl StoreHandle {
    pub fn new(store: SchoolStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
            revision: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, SchoolStore> {
        self.inner.read()
    }

    /// Bumped once per successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn dispatch(&self, command: StoreCommand) -> Result<(), StoreError> {
        let mut store = self.inner.write();
        let result = apply_command(&mut store, &command);
        match &result {
            Ok(()) => {
                self.revision.fetch_add(1, Ordering::AcqRel);
                info!(target: "schoolhub::store", command = command_name(&command), "applied");
            }
            Err(e) => {
                warn!(target: "schoolhub::store", command = command_name(&command), error = %e, "rejected");
            }
        }
        result
    }
}

fn command_name(command: &StoreCommand) -> &'static str {
    match command {
        StoreCommand::AppendMessage { .. } => "append_message",
        StoreCommand::SetReportCardPublished { .. } => "set_report_card_published",
        StoreCommand::MarkNotificationsRead { .. } => "mark_notifications_read",
        StoreCommand::PostAnnouncement { .. } => "post_announcement",
        StoreCommand::RecordAttendance { .. } => "record_attendance",
        StoreCommand::SetSubmissionFeedback { .. } => "set_submission_feedback",
    }
}

fn apply_command(store: &mut SchoolStore, command: &StoreCommand) -> Result<(), StoreError> {
    match command {
        StoreCommand::AppendMessage {
            conversation_id,
            sender_id,
            body,
        } => {
            let body = body.trim();
            if body.is_empty() {
                return Err(StoreError::Invalid("message body is empty".to_string()));
            }
            let sender_name = store.person_name(sender_id);
            let conversation = store
                .conversations
                .iter_mut()
                .find(|c| &c.id == conversation_id)
                .ok_or_else(|| not_found("conversation", conversation_id))?;
            conversation.messages.push(ChatMessage {
                sender_id: sender_id.clone(),
                sender_name,
                body: body.to_string(),
                sent_at: Utc::now(),
            });
        }
        StoreCommand::SetReportCardPublished {
            student_id,
            term,
            published,
        } => {
            let card = store
                .report_cards
                .iter_mut()
                .find(|r| &r.student_id == student_id && &r.term == term)
                .ok_or_else(|| not_found("report card", student_id))?;
            card.published = *published;
        }
        StoreCommand::MarkNotificationsRead { audience } => {
            for n in store.notifications.iter_mut().filter(|n| n.audience == *audience) {
                n.read = true;
            }
        }
        StoreCommand::PostAnnouncement { title, body } => {
            if title.trim().is_empty() {
                return Err(StoreError::Invalid("title is required".to_string()));
            }
            if body.trim().is_empty() {
                return Err(StoreError::Invalid("body is required".to_string()));
            }
            let id = format!("ann-{}", store.announcements.len() + 1);
            // Newest first.
            store.announcements.insert(
                0,
                Announcement {
                    id,
                    title: title.trim().to_string(),
                    body: body.trim().to_string(),
                    posted_at: Utc::now(),
                },
            );
        }
        StoreCommand::RecordAttendance {
            class_id,
            student_id,
            date,
            status,
        } => {
            if store.class(class_id).is_none() {
                return Err(not_found("class", class_id));
            }
            if store.student(student_id).is_none() {
                return Err(not_found("student", student_id));
            }
            match store.attendance.iter_mut().find(|a| {
                &a.class_id == class_id && &a.student_id == student_id && a.date == *date
            }) {
                Some(existing) => existing.status = *status,
                None => store.attendance.push(AttendanceRecord {
                    student_id: student_id.clone(),
                    class_id: class_id.clone(),
                    date: *date,
                    status: *status,
                }),
            }
        }
        StoreCommand::SetSubmissionFeedback {
            submission_id,
            feedback,
            score,
        } => {
            let submission = store
                .submissions
                .iter_mut()
                .find(|s| &s.id == submission_id)
                .ok_or_else(|| not_found("submission", submission_id))?;
            submission.feedback = Some(feedback.trim().to_string());
            if score.is_some() {
                submission.score = *score;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn handle() -> StoreHandle {
        StoreHandle::new(fixtures::seed())
    }

    #[test]
    fn appended_message_is_visible_to_every_reader() {
        let store = handle();
        let other_reader = store.clone();
        let before = store.read().conversation("conv-1").map(|c| c.messages.len());

        store
            .dispatch(StoreCommand::AppendMessage {
                conversation_id: "conv-1".into(),
                sender_id: "t-1".into(),
                body: "  See you at the meeting.  ".into(),
            })
            .expect("append");

        let guard = other_reader.read();
        let conv = guard.conversation("conv-1").expect("conversation");
        assert_eq!(Some(conv.messages.len()), before.map(|n| n + 1));
        let last = conv.messages.last().expect("message");
        assert_eq!(last.body, "See you at the meeting.");
        assert_eq!(last.sender_name, "Ms. Amara Diallo");
        assert_eq!(other_reader.revision(), 1);
    }

    #[test]
    fn empty_message_is_rejected_without_mutation() {
        let store = handle();
        let err = store
            .dispatch(StoreCommand::AppendMessage {
                conversation_id: "conv-1".into(),
                sender_id: "t-1".into(),
                body: "   ".into(),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn unknown_ids_report_not_found() {
        let store = handle();
        let err = store
            .dispatch(StoreCommand::SetReportCardPublished {
                student_id: "ghost".into(),
                term: "Term 1".into(),
                published: true,
            })
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                kind: "report card",
                id: "ghost".into()
            }
        );
    }

    #[test]
    fn publishing_report_card_flips_flag() {
        let store = handle();
        store
            .dispatch(StoreCommand::SetReportCardPublished {
                student_id: "s-1".into(),
                term: "Term 1".into(),
                published: true,
            })
            .expect("publish");
        assert!(store
            .read()
            .report_card("s-1", "Term 1")
            .map(|r| r.published)
            .unwrap_or(false));
    }

    #[test]
    fn marking_notifications_read_is_scoped_to_audience() {
        let store = handle();
        let parent_unread = store.read().unread_notifications(Role::Parent);
        assert!(store.read().unread_notifications(Role::Teacher) > 0);

        store
            .dispatch(StoreCommand::MarkNotificationsRead {
                audience: Role::Teacher,
            })
            .expect("mark read");

        assert_eq!(store.read().unread_notifications(Role::Teacher), 0);
        assert_eq!(store.read().unread_notifications(Role::Parent), parent_unread);
    }

    #[test]
    fn recording_attendance_overwrites_same_day() {
        let store = handle();
        let date = NaiveDate::from_ymd_opt(2024, 10, 1).expect("date");
        for status in [AttendanceStatus::Absent, AttendanceStatus::Late] {
            store
                .dispatch(StoreCommand::RecordAttendance {
                    class_id: "10A".into(),
                    student_id: "s-1".into(),
                    date,
                    status,
                })
                .expect("record");
        }
        let guard = store.read();
        assert_eq!(
            guard.attendance_on("10A", "s-1", date),
            Some(AttendanceStatus::Late)
        );
        let same_day = guard
            .attendance
            .iter()
            .filter(|a| a.student_id == "s-1" && a.date == date)
            .count();
        assert_eq!(same_day, 1);
    }

    #[test]
    fn student_sees_homeroom_and_subject_sections() {
        let store = handle();
        let guard = store.read();
        let ids: Vec<&str> = guard
            .classes_for_student("s-1")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["10A", "10A-SCI"]);

        let due: Vec<&str> = guard
            .assignments_for_student("s-1")
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(due, vec!["hw-1", "hw-2"]);
        assert!(guard.assignments_for_student("ghost").is_empty());
    }

    #[test]
    fn announcement_requires_title_and_body() {
        let store = handle();
        let err = store
            .dispatch(StoreCommand::PostAnnouncement {
                title: "".into(),
                body: "Body".into(),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));

        store
            .dispatch(StoreCommand::PostAnnouncement {
                title: "Sports day".into(),
                body: "Friday on the main field.".into(),
            })
            .expect("post");
        assert_eq!(store.read().announcements[0].title, "Sports day");
    }

    #[test]
    fn latest_announcements_list_newest_first() {
        let store = handle();
        store
            .dispatch(StoreCommand::PostAnnouncement {
                title: "Brand new".into(),
                body: "Posted just now.".into(),
            })
            .expect("post");
        let guard = store.read();
        let titles: Vec<_> = guard
            .latest_announcements(3)
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Brand new", "Parent-teacher evening", "Welcome back"]);
        assert_eq!(guard.latest_announcements(1).count(), 1);
    }
}
