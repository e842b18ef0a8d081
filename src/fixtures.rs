use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::role::Role;
use crate::store::{
    Announcement, Assignment, AttendanceRecord, AttendanceStatus, ChatMessage, ClassInfo,
    Conversation, GradeEntry, Notification, Parent, ReportCard, SchoolStore, Student, Submission,
    Teacher,
};

pub const DEMO_ADMIN_ID: &str = "a-1";
pub const DEMO_TEACHER_ID: &str = "t-1";
pub const DEMO_PARENT_ID: &str = "p-1";
pub const DEMO_STUDENT_ID: &str = "s-1";
pub const CURRENT_TERM: &str = "Term 1";

fn day(month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, d).unwrap_or(NaiveDate::MIN)
}

fn at(month: u32, d: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, d, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn s(v: &str) -> String {
    v.to_string()
}

pub fn seed() -> SchoolStore {
    let students = vec![
        student("s-1", "Liam Chen", "10A", Some("p-1"), 10),
        student("s-2", "Maya Chen", "9B", Some("p-1"), 9),
        student("s-3", "Noah Patel", "10A", Some("p-2"), 10),
        student("s-4", "Zara Okafor", "10A", Some("p-3"), 10),
        student("s-5", "Ethan Brooks", "9B", None, 9),
        student("s-6", "Aisha Rahman", "9B", Some("p-4"), 9),
    ];

    let teachers = vec![
        Teacher {
            id: s("t-1"),
            name: s("Ms. Amara Diallo"),
            subject: s("Mathematics"),
        },
        Teacher {
            id: s("t-2"),
            name: s("Mr. Jonas Weber"),
            subject: s("Science"),
        },
    ];

    let parents = vec![
        Parent {
            id: s("p-1"),
            name: s("Grace Chen"),
        },
        Parent {
            id: s("p-2"),
            name: s("Ravi Patel"),
        },
        Parent {
            id: s("p-3"),
            name: s("Ngozi Okafor"),
        },
        Parent {
            id: s("p-4"),
            name: s("Samir Rahman"),
        },
    ];

    let classes = vec![
        ClassInfo {
            id: s("10A"),
            name: s("Class 10A"),
            subject: s("Mathematics"),
            teacher_id: s("t-1"),
            room: s("B12"),
            schedule: vec![s("Mon 09:00"), s("Wed 11:00"), s("Fri 09:00")],
        },
        ClassInfo {
            id: s("9B"),
            name: s("Class 9B"),
            subject: s("Mathematics"),
            teacher_id: s("t-1"),
            room: s("B14"),
            schedule: vec![s("Tue 10:00"), s("Thu 13:00")],
        },
        ClassInfo {
            id: s("10A-SCI"),
            name: s("Class 10A Science"),
            subject: s("Science"),
            teacher_id: s("t-2"),
            room: s("Lab 2"),
            schedule: vec![s("Tue 09:00"), s("Thu 09:00")],
        },
    ];

    let mut grades = Vec::new();
    let marks: [(&str, &str, &str, f32); 14] = [
        ("s-1", "Mathematics", "Algebra quiz", 18.0),
        ("s-1", "Mathematics", "Geometry test", 41.0),
        ("s-1", "Science", "Lab report", 15.0),
        ("s-2", "Mathematics", "Fractions quiz", 14.0),
        ("s-2", "Mathematics", "Mid-term", 33.0),
        ("s-3", "Mathematics", "Algebra quiz", 12.0),
        ("s-3", "Mathematics", "Geometry test", 29.0),
        ("s-3", "Science", "Lab report", 17.0),
        ("s-4", "Mathematics", "Algebra quiz", 20.0),
        ("s-4", "Mathematics", "Geometry test", 47.0),
        ("s-5", "Mathematics", "Fractions quiz", 9.0),
        ("s-5", "Mathematics", "Mid-term", 24.0),
        ("s-6", "Mathematics", "Fractions quiz", 19.0),
        ("s-6", "Mathematics", "Mid-term", 45.0),
    ];
    for (student_id, subject, assessment, score) in marks {
        let max_score = if assessment.contains("quiz") || assessment.contains("report") {
            20.0
        } else {
            50.0
        };
        grades.push(GradeEntry {
            student_id: s(student_id),
            subject: s(subject),
            assessment: s(assessment),
            score,
            max_score,
        });
    }

    let mut attendance = Vec::new();
    let pattern: [(&str, &str, [AttendanceStatus; 5]); 6] = {
        use AttendanceStatus::*;
        [
            ("s-1", "10A", [Present, Present, Late, Present, Present]),
            ("s-3", "10A", [Present, Absent, Absent, Present, Late]),
            ("s-4", "10A", [Present, Present, Present, Present, Present]),
            ("s-2", "9B", [Present, Excused, Present, Present, Present]),
            ("s-5", "9B", [Absent, Present, Absent, Late, Present]),
            ("s-6", "9B", [Present, Present, Present, Late, Present]),
        ]
    };
    for (student_id, class_id, statuses) in pattern {
        for (i, status) in statuses.into_iter().enumerate() {
            attendance.push(AttendanceRecord {
                student_id: s(student_id),
                class_id: s(class_id),
                date: day(9, 2 + i as u32),
                status,
            });
        }
    }

    let conversations = vec![
        Conversation {
            id: s("conv-1"),
            subject: s("Liam's geometry progress"),
            participant_ids: vec![s("t-1"), s("p-1")],
            messages: vec![
                ChatMessage {
                    sender_id: s("p-1"),
                    sender_name: s("Grace Chen"),
                    body: s("Hi, how is Liam doing with geometry?"),
                    sent_at: at(9, 10, 18, 5),
                },
                ChatMessage {
                    sender_id: s("t-1"),
                    sender_name: s("Ms. Amara Diallo"),
                    body: s("He's improving steadily. His last test was 82%."),
                    sent_at: at(9, 11, 8, 40),
                },
            ],
        },
        Conversation {
            id: s("conv-2"),
            subject: s("Missed classes"),
            participant_ids: vec![s("t-1"), s("p-2")],
            messages: vec![ChatMessage {
                sender_id: s("t-1"),
                sender_name: s("Ms. Amara Diallo"),
                body: s("Noah missed two lessons this week. Is everything alright?"),
                sent_at: at(9, 5, 15, 0),
            }],
        },
    ];

    let notifications = vec![
        notification("n-1", Role::Teacher, "3 new submissions for Geometry homework"),
        notification("n-2", Role::Teacher, "Staff meeting moved to Thursday"),
        notification("n-3", Role::Parent, "New message from Ms. Amara Diallo"),
        notification("n-4", Role::Student, "Geometry homework due Friday"),
        notification("n-5", Role::Admin, "Term 1 report cards are ready for review"),
    ];

    let report_cards = ["s-1", "s-2", "s-3", "s-4", "s-5", "s-6"]
        .into_iter()
        .map(|id| ReportCard {
            student_id: s(id),
            term: s(CURRENT_TERM),
            published: false,
            teacher_comment: String::new(),
        })
        .collect();

    let announcements = vec![
        Announcement {
            id: s("ann-2"),
            title: s("Parent-teacher evening"),
            body: s("Bookings open Monday for the 24 October evening."),
            posted_at: at(9, 12, 9, 0),
        },
        Announcement {
            id: s("ann-1"),
            title: s("Welcome back"),
            body: s("Term 1 starts on 2 September. Timetables are on the portal."),
            posted_at: at(8, 28, 9, 0),
        },
    ];

    let assignments = vec![
        Assignment {
            id: s("hw-1"),
            class_id: s("10A"),
            title: s("Geometry: angles in polygons"),
            subject: s("Mathematics"),
            due: day(9, 20),
            description: s("Complete exercises 4.1 to 4.3 and explain one proof in words."),
        },
        Assignment {
            id: s("hw-2"),
            class_id: s("10A-SCI"),
            title: s("Photosynthesis lab write-up"),
            subject: s("Science"),
            due: day(9, 24),
            description: s("Write up the leaf-disc experiment with a results table."),
        },
        Assignment {
            id: s("hw-3"),
            class_id: s("9B"),
            title: s("Fractions practice sheet"),
            subject: s("Mathematics"),
            due: day(9, 19),
            description: s("Simplify, add and compare fractions on the practice sheet."),
        },
    ];

    let submissions = vec![
        Submission {
            id: s("sub-1"),
            assignment_id: s("hw-1"),
            student_id: s("s-1"),
            text: s("Interior angles sum to (n-2)*180 because the polygon splits into n-2 triangles."),
            score: None,
            feedback: None,
        },
        Submission {
            id: s("sub-2"),
            assignment_id: s("hw-1"),
            student_id: s("s-3"),
            text: s("I think the answer is 540 for a pentagon."),
            score: None,
            feedback: None,
        },
        Submission {
            id: s("sub-3"),
            assignment_id: s("hw-3"),
            student_id: s("s-2"),
            text: s("3/4 + 1/8 = 7/8"),
            score: Some(9.0),
            feedback: Some(s("Correct. Show the common denominator step next time.")),
        },
    ];

    SchoolStore {
        school_name: s("Riverside Secondary School"),
        students,
        teachers,
        parents,
        classes,
        grades,
        attendance,
        conversations,
        notifications,
        report_cards,
        announcements,
        assignments,
        submissions,
    }
}

fn student(id: &str, name: &str, class_id: &str, parent_id: Option<&str>, year: u8) -> Student {
    Student {
        id: s(id),
        name: s(name),
        class_id: s(class_id),
        parent_id: parent_id.map(s),
        year_level: year,
    }
}

fn notification(id: &str, audience: Role, text: &str) -> Notification {
    Notification {
        id: s(id),
        audience,
        text: s(text),
        read: false,
    }
}
