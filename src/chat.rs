use crate::ai::prompts::{chat_request, sanitize_short};
use crate::ai::{AiService, GenerationSlot, FALLBACK_MESSAGE};

pub const PENDING_REPLY: &str = "...";
pub const ASSISTANT_NAME: &str = "Assistant";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Default)]
pub struct AssistantChat {
    lines: Vec<ChatLine>,
    pub input: String,
    reply: GenerationSlot<String>,
}

impl AssistantChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }

    pub fn is_waiting(&self) -> bool {
        self.reply.is_in_flight()
    }

    /// Sends the current input. A placeholder line stands in for the reply until it settles.
    pub fn send(&mut self, ai: &AiService) -> bool {
        let question = self.input.trim().to_string();
        if question.is_empty() || self.is_waiting() {
            return false;
        }
        self.lines.push(ChatLine {
            speaker: Speaker::User,
            text: question.clone(),
        });
        self.lines.push(ChatLine {
            speaker: Speaker::Assistant,
            text: PENDING_REPLY.to_string(),
        });
        self.reply
            .start(ai, "chat", chat_request(&question), |o| Ok(o.into_text()));
        self.input.clear();
        true
    }

    /// Replaces the placeholder once the reply arrives. Returns true when a line changed.
    pub fn poll(&mut self) -> bool {
        if !self.reply.poll() {
            return false;
        }
        let text = match self.reply.ready() {
            Some(answer) => sanitize_short(answer, 4, 400),
            None => FALLBACK_MESSAGE.to_string(),
        };
        self.reply.clear();
        if let Some(last) = self
            .lines
            .iter_mut()
            .rev()
            .find(|l| l.speaker == Speaker::Assistant && l.text == PENDING_REPLY)
        {
            last.text = text;
        }
        true
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.input.clear();
        self.reply.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::task::tests::service;
    use std::time::{Duration, Instant};

    fn settle(chat: &mut AssistantChat) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while chat.is_waiting() && Instant::now() < deadline {
            chat.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!chat.is_waiting(), "reply did not settle");
    }

    #[test]
    fn blank_input_is_ignored() {
        let ai = service(Some("hi"));
        let mut chat = AssistantChat::new();
        chat.input = "   ".into();
        assert!(!chat.send(&ai));
        assert!(chat.lines().is_empty());
    }

    #[test]
    fn placeholder_is_replaced_by_trimmed_reply() {
        let ai = service(Some("  First line\n\nsecond\nthird\nfourth\nfifth  "));
        let mut chat = AssistantChat::new();
        chat.input = " When is parents' evening? ".into();
        assert!(chat.send(&ai));
        assert!(chat.input.is_empty());
        assert_eq!(chat.lines()[0].text, "When is parents' evening?");
        assert_eq!(chat.lines()[1].text, PENDING_REPLY);

        settle(&mut chat);
        assert_eq!(chat.lines().len(), 2);
        assert_eq!(chat.lines()[1].text, "First line\nsecond\nthird\nfourth");
    }

    #[test]
    fn failed_reply_shows_fallback() {
        let ai = service(None);
        let mut chat = AssistantChat::new();
        chat.input = "hello".into();
        chat.send(&ai);
        settle(&mut chat);
        assert_eq!(chat.lines()[1].speaker, Speaker::Assistant);
        assert_eq!(chat.lines()[1].text, FALLBACK_MESSAGE);
    }

    #[test]
    fn second_send_waits_for_first_reply() {
        let ai = service(Some("ok"));
        let mut chat = AssistantChat::new();
        chat.input = "one".into();
        chat.send(&ai);
        chat.input = "two".into();
        if chat.is_waiting() {
            assert!(!chat.send(&ai));
            assert_eq!(chat.input, "two");
        }
        settle(&mut chat);
        assert!(chat.lines().iter().all(|l| l.text != PENDING_REPLY));
    }
}
