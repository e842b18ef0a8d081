use std::collections::BTreeMap;

use crate::store::{AttendanceRecord, GradeEntry, SchoolStore};

fn mean(vals: &[f32]) -> Option<f32> {
    if vals.is_empty() {
        None
    } else {
        Some(vals.iter().copied().sum::<f32>() / vals.len() as f32)
    }
}

pub fn average_percent(grades: &[&GradeEntry]) -> Option<f32> {
    mean(&grades.iter().map(|g| g.percent()).collect::<Vec<_>>())
}

/// Per-subject averages, sorted by subject name.
pub fn subject_averages(grades: &[&GradeEntry]) -> Vec<(String, f32)> {
    let mut per_subject: BTreeMap<String, Vec<f32>> = BTreeMap::new();
    for g in grades {
        per_subject
            .entry(g.subject.clone())
            .or_default()
            .push(g.percent());
    }
    per_subject
        .into_iter()
        .filter_map(|(subject, vals)| mean(&vals).map(|avg| (subject, avg)))
        .collect()
}

/// Share of sessions attended (present or late), in percent.
pub fn attendance_rate(records: &[&AttendanceRecord]) -> Option<f32> {
    if records.is_empty() {
        return None;
    }
    let attended = records
        .iter()
        .filter(|r| r.status.counts_as_attended())
        .count();
    Some(attended as f32 / records.len() as f32 * 100.0)
}

pub fn letter_grade(percent: f32) -> &'static str {
    match percent {
        p if p >= 90.0 => "A",
        p if p >= 80.0 => "B",
        p if p >= 70.0 => "C",
        p if p >= 60.0 => "D",
        _ => "F",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectLine {
    pub subject: String,
    pub percent: f32,
    pub letter: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportCardSummary {
    pub student_id: String,
    pub student_name: String,
    pub class_name: String,
    pub term: String,
    pub subjects: Vec<SubjectLine>,
    pub overall: Option<f32>,
    pub attendance: Option<f32>,
    pub published: bool,
    pub comment: String,
}

impl ReportCardSummary {
    pub fn overall_letter(&self) -> Option<&'static str> {
        self.overall.map(letter_grade)
    }
}

pub fn report_card_summary(
    store: &SchoolStore,
    student_id: &str,
    term: &str,
) -> Option<ReportCardSummary> {
    let student = store.student(student_id)?;
    let grades = store.grades_for(student_id);
    let attendance = store.attendance_for_student(student_id);
    let card = store.report_card(student_id, term);

    let subjects = subject_averages(&grades)
        .into_iter()
        .map(|(subject, percent)| SubjectLine {
            subject,
            percent,
            letter: letter_grade(percent),
        })
        .collect();

    Some(ReportCardSummary {
        student_id: student.id.clone(),
        student_name: student.name.clone(),
        class_name: store
            .class(&student.class_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| student.class_id.clone()),
        term: term.to_string(),
        subjects,
        overall: average_percent(&grades),
        attendance: attendance_rate(&attendance),
        published: card.map(|c| c.published).unwrap_or(false),
        comment: card.map(|c| c.teacher_comment.clone()).unwrap_or_default(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassSummary {
    pub class_id: String,
    pub class_name: String,
    pub student_count: usize,
    pub average: Option<f32>,
    pub attendance: Option<f32>,
    /// Student name and average, best first.
    pub ranking: Vec<(String, f32)>,
}

pub fn class_summary(store: &SchoolStore, class_id: &str) -> Option<ClassSummary> {
    let class = store.class(class_id)?;
    let students = store.students_in_class(class_id);

    let mut ranking: Vec<(String, f32)> = students
        .iter()
        .filter_map(|s| {
            let grades: Vec<&GradeEntry> = store
                .grades_for(&s.id)
                .into_iter()
                .filter(|g| g.subject == class.subject)
                .collect();
            average_percent(&grades).map(|avg| (s.name.clone(), avg))
        })
        .collect();
    ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let averages: Vec<f32> = ranking.iter().map(|(_, avg)| *avg).collect();
    let attendance = store.attendance_for_class(class_id);

    Some(ClassSummary {
        class_id: class.id.clone(),
        class_name: class.name.clone(),
        student_count: students.len(),
        average: mean(&averages),
        attendance: attendance_rate(&attendance),
        ranking,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchoolOverview {
    pub students: usize,
    pub teachers: usize,
    pub classes: usize,
    pub average: Option<f32>,
    pub attendance: Option<f32>,
    pub published_reports: usize,
}

pub fn school_overview(store: &SchoolStore) -> SchoolOverview {
    let grades: Vec<&GradeEntry> = store.grades.iter().collect();
    let attendance: Vec<&AttendanceRecord> = store.attendance.iter().collect();
    SchoolOverview {
        students: store.students.len(),
        teachers: store.teachers.len(),
        classes: store.classes.len(),
        average: average_percent(&grades),
        attendance: attendance_rate(&attendance),
        published_reports: store.report_cards.iter().filter(|r| r.published).count(),
    }
}

pub fn format_percent(value: Option<f32>) -> String {
    value
        .map(|v| format!("{v:.0}%"))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::store::AttendanceStatus;
    use chrono::NaiveDate;

    fn grade(subject: &str, score: f32, max: f32) -> GradeEntry {
        GradeEntry {
            student_id: "s-x".into(),
            subject: subject.into(),
            assessment: "test".into(),
            score,
            max_score: max,
        }
    }

    #[test]
    fn subject_averages_group_and_sort() {
        let g = [
            grade("Science", 15.0, 20.0),
            grade("Mathematics", 40.0, 50.0),
            grade("Mathematics", 18.0, 20.0),
        ];
        let refs: Vec<&GradeEntry> = g.iter().collect();
        let avgs = subject_averages(&refs);
        assert_eq!(avgs.len(), 2);
        assert_eq!(avgs[0].0, "Mathematics");
        assert!((avgs[0].1 - 85.0).abs() < 0.01);
        assert!((avgs[1].1 - 75.0).abs() < 0.01);
    }

    #[test]
    fn empty_inputs_do_not_divide_by_zero() {
        assert_eq!(average_percent(&[]), None);
        assert_eq!(attendance_rate(&[]), None);
        assert_eq!(format_percent(None), "-");
        assert_eq!(grade("x", 5.0, 0.0).percent(), 0.0);
    }

    #[test]
    fn late_counts_as_attended() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).expect("date");
        let recs: Vec<AttendanceRecord> = [
            AttendanceStatus::Present,
            AttendanceStatus::Late,
            AttendanceStatus::Absent,
            AttendanceStatus::Excused,
        ]
        .into_iter()
        .map(|status| AttendanceRecord {
            student_id: "s".into(),
            class_id: "c".into(),
            date,
            status,
        })
        .collect();
        let refs: Vec<&AttendanceRecord> = recs.iter().collect();
        assert_eq!(attendance_rate(&refs), Some(50.0));
    }

    #[test]
    fn letter_boundaries() {
        assert_eq!(letter_grade(90.0), "A");
        assert_eq!(letter_grade(89.9), "B");
        assert_eq!(letter_grade(60.0), "D");
        assert_eq!(letter_grade(12.0), "F");
    }

    #[test]
    fn report_card_rolls_up_fixture_student() {
        let store = fixtures::seed();
        let card = report_card_summary(&store, "s-1", fixtures::CURRENT_TERM).expect("card");
        assert_eq!(card.student_name, "Liam Chen");
        assert_eq!(card.class_name, "Class 10A");
        assert_eq!(card.subjects.len(), 2);
        assert!(!card.published);
        // 4 of 5 present, 1 late.
        assert_eq!(card.attendance, Some(100.0));
        assert!(card.overall_letter().is_some());
        assert!(report_card_summary(&store, "ghost", fixtures::CURRENT_TERM).is_none());
    }

    #[test]
    fn class_ranking_is_best_first() {
        let store = fixtures::seed();
        let summary = class_summary(&store, "10A").expect("summary");
        assert_eq!(summary.student_count, 3);
        assert_eq!(summary.ranking[0].0, "Zara Okafor");
        assert!(summary
            .ranking
            .windows(2)
            .all(|w| w[0].1 >= w[1].1));
        assert!(class_summary(&store, "nope").is_none());
    }
}
