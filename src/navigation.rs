use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property bag handed to a view alongside its frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(Map<String, Value>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Parses `key=value` pairs as typed on the CLI. Pairs without `=` are skipped.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Self {
        let mut props = Props::new();
        for pair in pairs {
            if let Some((k, v)) = pair.split_once('=') {
                let k = k.trim();
                if !k.is_empty() {
                    props.insert(k, v.trim());
                }
            }
        }
        props
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationFrame {
    pub view: String,
    pub title: String,
    pub props: Props,
}

impl NavigationFrame {
    pub fn new(view: impl Into<String>, title: impl Into<String>, props: Props) -> Self {
        Self {
            view: view.into(),
            title: title.into(),
            props,
        }
    }

    pub fn root(view: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(view, title, Props::new())
    }
}

/// Screen history for one dashboard. Never empty: the root frame cannot be popped.
#[derive(Debug, Clone)]
pub struct NavigationStack {
    frames: Vec<NavigationFrame>,
}

impl NavigationStack {
    pub fn new(root: NavigationFrame) -> Self {
        Self { frames: vec![root] }
    }

    pub fn reset(&mut self, root: NavigationFrame) {
        self.frames.clear();
        self.frames.push(root);
    }

    pub fn push(&mut self, view: impl Into<String>, title: impl Into<String>, props: Props) {
        self.frames.push(NavigationFrame::new(view, title, props));
    }

    /// Removes the top frame. At depth 1 this is a no-op and returns `None`.
    pub fn pop(&mut self) -> Option<NavigationFrame> {
        if self.frames.len() <= 1 {
            return None;
        }
        self.frames.pop()
    }

    pub fn current(&self) -> &NavigationFrame {
        // `frames` holds at least the root frame at all times.
        &self.frames[self.frames.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn root(&self) -> &NavigationFrame {
        &self.frames[0]
    }

    pub fn frames(&self) -> &[NavigationFrame] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> NavigationFrame {
        NavigationFrame::root("overview", "Teacher Dashboard")
    }

    #[test]
    fn pop_at_root_is_noop() {
        let mut stack = NavigationStack::new(root());
        assert!(stack.pop().is_none());
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current(), &root());
    }

    #[test]
    fn depth_never_drops_below_one() {
        let mut stack = NavigationStack::new(root());
        // Deterministic mixed sequence: 0 = push, 1 = pop, 2 = reset.
        let ops = [0, 1, 1, 1, 0, 0, 2, 1, 0, 1, 1, 0, 0, 0, 1, 2, 2, 1, 1, 0];
        for (i, op) in ops.iter().enumerate() {
            match op {
                0 => stack.push(format!("view{i}"), format!("Title {i}"), Props::new()),
                1 => {
                    stack.pop();
                }
                _ => stack.reset(root()),
            }
            assert!(stack.depth() >= 1, "depth dropped to zero after op {i}");
        }
    }

    #[test]
    fn push_then_pop_restores_previous_frame() {
        let mut stack = NavigationStack::new(root());
        stack.push("classes", "My Classes", Props::new().with("filter", "all"));
        let before = stack.current().clone();

        stack.push("classDetail", "Class 10A", Props::new().with("classId", "10A"));
        let popped = stack.pop().expect("popped frame");

        assert_eq!(popped.view, "classDetail");
        assert_eq!(stack.current(), &before);
        assert_eq!(stack.current().props.get_str("filter"), Some("all"));
    }

    #[test]
    fn reset_twice_does_not_accumulate() {
        let mut stack = NavigationStack::new(root());
        stack.push("classes", "My Classes", Props::new());
        stack.push("classDetail", "Class 10A", Props::new());

        let tab_root = NavigationFrame::root("messages", "Messages");
        stack.reset(tab_root.clone());
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current(), &tab_root);

        stack.reset(tab_root.clone());
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current(), &tab_root);
    }

    #[test]
    fn pushing_same_view_twice_creates_two_entries() {
        let mut stack = NavigationStack::new(root());
        stack.push("classDetail", "Class 10A", Props::new());
        stack.push("classDetail", "Class 10A", Props::new());
        assert_eq!(stack.depth(), 3);
    }

    #[test]
    fn props_from_cli_pairs() {
        let props = Props::from_pairs(["classId=10A", "junk", " studentId = s-1 "]);
        assert_eq!(props.len(), 2);
        assert_eq!(props.get_str("classId"), Some("10A"));
        assert_eq!(props.get_str("studentId"), Some("s-1"));
    }
}
