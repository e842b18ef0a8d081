use serde::{Deserialize, Serialize};

use super::client::{AiError, AiOutput, AiRequest};
use super::schema::Schema;
use crate::reports::{format_percent, ReportCardSummary, SchoolOverview};
use crate::store::{Assignment, Submission};

const ASSISTANT_CAPSULE: &str = "You are SchoolHub Assistant, built into a school management app.\n\
Audience: teachers, parents, students and school staff. Use school-appropriate language.\n\
Style: short, clear and practical. No role-play, no invented facts about specific students.\n";

const TUTOR_CAPSULE: &str = "You are a study helper for a secondary school student.\n\
Explain ideas step by step with a small example. Do not write graded work for the student; \
if asked for a full answer to homework, give hints and a worked example with different numbers.\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonActivity {
    pub name: String,
    pub minutes: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonPlan {
    pub title: String,
    pub objectives: Vec<String>,
    pub activities: Vec<LessonActivity>,
    pub assessment: String,
}

impl LessonPlan {
    pub fn total_minutes(&self) -> u32 {
        self.activities.iter().map(|a| a.minutes).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer_index: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Number of picked answers that match the key. `picks` is indexed like `questions`.
    pub fn score(&self, picks: &[Option<usize>]) -> usize {
        self.questions
            .iter()
            .zip(picks)
            .filter(|(q, pick)| **pick == Some(q.answer_index))
            .count()
    }
}

pub fn lesson_plan_schema() -> Schema {
    Schema::object()
        .property("title", Schema::string())
        .property(
            "objectives",
            Schema::array(Schema::string()).describe("3-5 measurable learning objectives"),
        )
        .property(
            "activities",
            Schema::array(
                Schema::object()
                    .property("name", Schema::string())
                    .property("minutes", Schema::integer())
                    .property("description", Schema::string())
                    .required(&["name", "minutes", "description"]),
            ),
        )
        .property("assessment", Schema::string())
        .required(&["title", "objectives", "activities", "assessment"])
}

pub fn quiz_schema() -> Schema {
    Schema::object()
        .property(
            "questions",
            Schema::array(
                Schema::object()
                    .property("question", Schema::string())
                    .property("options", Schema::array(Schema::string()))
                    .property(
                        "answerIndex",
                        Schema::integer().describe("zero-based index into options"),
                    )
                    .property("explanation", Schema::string())
                    .required(&["question", "options", "answerIndex"]),
            ),
        )
        .required(&["questions"])
}

pub fn lesson_plan_request(subject: &str, topic: &str, year_level: &str, minutes: u32) -> AiRequest {
    AiRequest::text(ASSISTANT_CAPSULE)
        .with_part(format!(
            "Create a lesson plan.\nSubject: {subject}\nTopic: {topic}\nYear level: {year_level}\n\
             Lesson length: {minutes} minutes. Activity minutes should add up to the lesson length."
        ))
        .with_schema(lesson_plan_schema())
}

pub fn quiz_request(subject: &str, topic: &str, count: usize) -> AiRequest {
    AiRequest::text(ASSISTANT_CAPSULE)
        .with_part(format!(
            "Write a {count}-question multiple choice quiz.\nSubject: {subject}\nTopic: {topic}\n\
             Each question has exactly 4 options and one correct answer."
        ))
        .with_schema(quiz_schema())
}

pub fn submission_feedback_request(assignment: &Assignment, submission: &Submission) -> AiRequest {
    AiRequest::text(ASSISTANT_CAPSULE).with_part(format!(
        "Write constructive feedback (3 sentences max) a teacher can give on this homework.\n\
         Assignment: {}\nInstructions: {}\nStudent answer:\n{}",
        assignment.title, assignment.description, submission.text
    ))
}

pub fn progress_summary_request(card: &ReportCardSummary) -> AiRequest {
    let subjects: Vec<String> = card
        .subjects
        .iter()
        .map(|s| format!("{}: {:.0}% ({})", s.subject, s.percent, s.letter))
        .collect();
    AiRequest::text(ASSISTANT_CAPSULE).with_part(format!(
        "Summarize this student's progress for a parent in one short paragraph, \
         then give two practical ways to help at home.\n\
         Student: {}\nTerm: {}\nSubjects: {}\nOverall: {}\nAttendance: {}",
        card.student_name,
        card.term,
        if subjects.is_empty() {
            "no marks yet".to_string()
        } else {
            subjects.join("; ")
        },
        format_percent(card.overall),
        format_percent(card.attendance),
    ))
}

pub fn study_help_request(subject: &str, question: &str) -> AiRequest {
    AiRequest::text(TUTOR_CAPSULE).with_part(format!("Subject: {subject}\nQuestion: {question}"))
}

pub fn practice_quiz_request(subject: &str, topic: &str) -> AiRequest {
    AiRequest::text(TUTOR_CAPSULE)
        .with_part(format!(
            "Make a 3-question practice quiz on {topic} ({subject}) with a one-line explanation per answer."
        ))
        .with_schema(quiz_schema())
}

pub fn school_report_request(school: &str, overview: &SchoolOverview) -> AiRequest {
    AiRequest::text(ASSISTANT_CAPSULE).with_part(format!(
        "Write a brief term report for the leadership team of {school}.\n\
         Students: {}\nTeachers: {}\nClasses: {}\nAverage grade: {}\nAttendance: {}\n\
         Report cards published: {}\nHighlight one strength and one risk.",
        overview.students,
        overview.teachers,
        overview.classes,
        format_percent(overview.average),
        format_percent(overview.attendance),
        overview.published_reports,
    ))
}

pub fn chat_request(question: &str) -> AiRequest {
    AiRequest::text(ASSISTANT_CAPSULE)
        .with_part(format!("User request: {question}\nRespond with one short, clear answer."))
}

pub fn parse_lesson_plan(output: AiOutput) -> Result<LessonPlan, AiError> {
    output.into_typed()
}

/// Rejects quizzes whose answer key points outside the options.
pub fn parse_quiz(output: AiOutput) -> Result<Quiz, AiError> {
    let quiz: Quiz = output.into_typed()?;
    if quiz.questions.is_empty() {
        return Err(AiError::SchemaMismatch("quiz has no questions".to_string()));
    }
    for (i, q) in quiz.questions.iter().enumerate() {
        if q.answer_index >= q.options.len() {
            return Err(AiError::SchemaMismatch(format!(
                "question {i}: answer index {} out of range",
                q.answer_index
            )));
        }
    }
    Ok(quiz)
}

/// Trims a reply to at most `max_lines` non-empty lines and `max_len` characters.
pub fn sanitize_short(text: &str, max_lines: usize, max_len: usize) -> String {
    let mut out = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(max_lines)
        .collect::<Vec<_>>()
        .join("\n");
    if out.chars().count() > max_len {
        out = out.chars().take(max_len).collect::<String>();
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lesson_plan_round_trips_through_schema() {
        let value = json!({
            "title": "Angles in polygons",
            "objectives": ["Derive the interior angle sum"],
            "activities": [
                {"name": "Starter", "minutes": 10, "description": "Triangle recap"},
                {"name": "Investigation", "minutes": 35, "description": "Split polygons"}
            ],
            "assessment": "Exit ticket"
        });
        assert_eq!(lesson_plan_schema().validate(&value), Ok(()));
        let plan = parse_lesson_plan(AiOutput::Json(value)).expect("plan");
        assert_eq!(plan.total_minutes(), 45);
    }

    #[test]
    fn quiz_with_bad_answer_index_is_rejected() {
        let value = json!({"questions": [{"question": "2+2", "options": ["4"], "answerIndex": 3}]});
        assert!(matches!(
            parse_quiz(AiOutput::Json(value)),
            Err(AiError::SchemaMismatch(_))
        ));
        assert!(parse_quiz(AiOutput::Json(json!({"questions": []}))).is_err());
    }

    #[test]
    fn quiz_with_null_explanation_is_accepted() {
        let value = json!({"questions": [
            {"question": "2+2", "options": ["3", "4"], "answerIndex": 1, "explanation": null}
        ]});
        assert_eq!(quiz_schema().validate(&value), Ok(()));
        let quiz = parse_quiz(AiOutput::Json(value)).expect("quiz");
        assert_eq!(quiz.questions[0].explanation, None);
    }

    #[test]
    fn quiz_scoring_counts_matches() {
        let quiz = parse_quiz(AiOutput::Json(json!({"questions": [
            {"question": "a", "options": ["x", "y"], "answerIndex": 0},
            {"question": "b", "options": ["x", "y"], "answerIndex": 1},
            {"question": "c", "options": ["x", "y"], "answerIndex": 1}
        ]})))
        .expect("quiz");
        assert_eq!(quiz.score(&[Some(0), Some(0), None]), 1);
        assert_eq!(quiz.score(&[Some(0), Some(1), Some(1)]), 3);
    }

    #[test]
    fn structured_requests_carry_schema() {
        assert!(lesson_plan_request("Maths", "Angles", "10", 45).schema.is_some());
        assert!(quiz_request("Maths", "Angles", 5).schema.is_some());
        assert!(chat_request("hi").schema.is_none());
        let req = study_help_request("Science", "Why is the sky blue?");
        assert!(req.parts[1].contains("Why is the sky blue?"));
    }

    #[test]
    fn sanitize_limits_lines_and_length() {
        let text = "one\n\n two \nthree\nfour\nfive";
        assert_eq!(sanitize_short(text, 3, 400), "one\ntwo\nthree");
        assert_eq!(sanitize_short("abcdef", 4, 3), "abc…");
    }
}
