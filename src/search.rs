use crate::navigation::{NavigationFrame, Props};
use crate::role::Role;
use crate::store::SchoolStore;

const MAX_HITS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub label: String,
    pub detail: String,
    /// Frame to push in the searching role's dashboard.
    pub frame: NavigationFrame,
}

fn matches(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Case-insensitive substring search, limited to what `user_id` may see in `role`.
pub fn search(store: &SchoolStore, role: Role, user_id: &str, query: &str) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    match role {
        Role::Admin => {
            for s in store.students.iter().filter(|s| matches(&s.name, &needle)) {
                hits.push(SearchHit {
                    label: s.name.clone(),
                    detail: format!("Student · {}", s.class_id),
                    frame: NavigationFrame::new(
                        "studentDetail",
                        s.name.clone(),
                        Props::new().with("studentId", s.id.as_str()),
                    ),
                });
            }
            for c in store
                .classes
                .iter()
                .filter(|c| matches(&c.name, &needle) || matches(&c.subject, &needle))
            {
                hits.push(class_hit(&c.id, &c.name, &c.subject));
            }
        }
        Role::Teacher => {
            let classes = store.classes_for_teacher(user_id);
            for c in &classes {
                if matches(&c.name, &needle) || matches(&c.subject, &needle) {
                    hits.push(class_hit(&c.id, &c.name, &c.subject));
                }
            }
            for c in &classes {
                for s in store
                    .students_in_class(&c.id)
                    .into_iter()
                    .filter(|s| matches(&s.name, &needle))
                {
                    hits.push(SearchHit {
                        label: s.name.clone(),
                        detail: format!("Student · {}", c.name),
                        frame: NavigationFrame::new(
                            "gradebook",
                            format!("Gradebook · {}", c.name),
                            Props::new().with("classId", c.id.as_str()),
                        ),
                    });
                }
            }
        }
        Role::Parent => {
            for s in store
                .children_of(user_id)
                .into_iter()
                .filter(|s| matches(&s.name, &needle))
            {
                hits.push(SearchHit {
                    label: s.name.clone(),
                    detail: "Your child".to_string(),
                    frame: NavigationFrame::new(
                        "progress",
                        format!("{}'s Progress", s.name),
                        Props::new().with("studentId", s.id.as_str()),
                    ),
                });
            }
        }
        Role::Student => {
            for a in store
                .assignments_for_student(user_id)
                .into_iter()
                .filter(|a| matches(&a.title, &needle) || matches(&a.subject, &needle))
            {
                hits.push(SearchHit {
                    label: a.title.clone(),
                    detail: format!("{} · due {}", a.subject, a.due.format("%d %b")),
                    frame: NavigationFrame::new(
                        "assignmentDetail",
                        a.title.clone(),
                        Props::new().with("assignmentId", a.id.as_str()),
                    ),
                });
            }
        }
    }
    hits.truncate(MAX_HITS);
    hits
}

fn class_hit(id: &str, name: &str, subject: &str) -> SearchHit {
    SearchHit {
        label: name.to_string(),
        detail: format!("Class · {subject}"),
        frame: NavigationFrame::new("classDetail", name, Props::new().with("classId", id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, DEMO_PARENT_ID, DEMO_STUDENT_ID, DEMO_TEACHER_ID};
    use crate::views::{resolve, AdminView, ParentView, Resolved, StudentView, TeacherView};

    #[test]
    fn blank_query_finds_nothing() {
        let store = fixtures::seed();
        assert!(search(&store, Role::Admin, "a-1", "   ").is_empty());
    }

    #[test]
    fn admin_search_is_case_insensitive_and_resolvable() {
        let store = fixtures::seed();
        let hits = search(&store, Role::Admin, "a-1", "CHEN");
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert_eq!(
                resolve::<AdminView>(&hit.frame.view),
                Resolved::Known(AdminView::StudentDetail)
            );
        }
    }

    #[test]
    fn teacher_only_sees_own_classes() {
        let store = fixtures::seed();
        let hits = search(&store, Role::Teacher, DEMO_TEACHER_ID, "science");
        assert!(hits.is_empty(), "science class belongs to another teacher");

        let hits = search(&store, Role::Teacher, DEMO_TEACHER_ID, "noah");
        assert_eq!(hits.len(), 1);
        assert!(matches!(
            resolve::<TeacherView>(&hits[0].frame.view),
            Resolved::Known(TeacherView::Gradebook)
        ));
        assert_eq!(hits[0].frame.props.get_str("classId"), Some("10A"));
    }

    #[test]
    fn parent_only_sees_children() {
        let store = fixtures::seed();
        let hits = search(&store, Role::Parent, DEMO_PARENT_ID, "a");
        let names: Vec<&str> = hits.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(names, vec!["Liam Chen", "Maya Chen"]);
        assert!(matches!(
            resolve::<ParentView>(&hits[0].frame.view),
            Resolved::Known(ParentView::Progress)
        ));
    }

    #[test]
    fn student_searches_own_assignments() {
        let store = fixtures::seed();
        let hits = search(&store, Role::Student, DEMO_STUDENT_ID, "fractions");
        assert!(hits.is_empty(), "fractions homework is for 9B");

        let hits = search(&store, Role::Student, DEMO_STUDENT_ID, "science");
        assert_eq!(hits.len(), 1);
        assert!(matches!(
            resolve::<StudentView>(&hits[0].frame.view),
            Resolved::Known(StudentView::AssignmentDetail)
        ));
    }
}
