use std::io;
use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{info, warn};

use super::client::{AiClient, AiError, AiOutput, AiRequest};

/// What a screen shows after a failed generation. The cause goes to the log only.
pub const FALLBACK_MESSAGE: &str = "Sorry, we couldn't generate that right now. Please try again.";

#[derive(Clone)]
pub struct AiService {
    client: Arc<dyn AiClient>,
    runtime: Arc<Runtime>,
}

impl AiService {
    pub fn new(client: Arc<dyn AiClient>) -> io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("schoolhub-ai")
            .enable_all()
            .build()?;
        Ok(Self {
            client,
            runtime: Arc::new(runtime),
        })
    }

    /// Fires one request. No retry: the receiver gets exactly one result.
    pub fn spawn<T, F>(
        &self,
        label: &'static str,
        request: AiRequest,
        map: F,
    ) -> oneshot::Receiver<Result<T, AiError>>
    where
        T: Send + 'static,
        F: FnOnce(AiOutput) -> Result<T, AiError> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let client = Arc::clone(&self.client);
        info!(target: "schoolhub::ai", label, "generation started");
        self.runtime.spawn(async move {
            let result = client.generate(&request).await.and_then(map);
            if let Err(e) = &result {
                warn!(target: "schoolhub::ai", label, error = %e, "generation failed");
            } else {
                info!(target: "schoolhub::ai", label, "generation finished");
            }
            // The screen may have been dropped (logout); nothing to deliver then.
            let _ = tx.send(result);
        });
        rx
    }

    /// Blocks the calling thread until the request settles. CLI only.
    pub fn generate_blocking(&self, request: AiRequest) -> Result<AiOutput, AiError> {
        let client = Arc::clone(&self.client);
        self.runtime
            .block_on(async move { client.generate(&request).await })
    }
}

pub enum Generation<T> {
    Idle,
    InFlight(oneshot::Receiver<Result<T, AiError>>),
    Ready(T),
    Failed,
}

/// One AI-backed control on a screen: at most one request in flight, last start wins.
pub struct GenerationSlot<T> {
    state: Generation<T>,
    failures: u32,
}

impl<T> Default for GenerationSlot<T> {
    fn default() -> Self {
        Self {
            state: Generation::Idle,
            failures: 0,
        }
    }
}

impl<T: Send + 'static> GenerationSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<F>(&mut self, service: &AiService, label: &'static str, request: AiRequest, map: F)
    where
        F: FnOnce(AiOutput) -> Result<T, AiError> + Send + 'static,
    {
        self.state = Generation::InFlight(service.spawn(label, request, map));
    }

    /// Moves a settled request into `Ready` or `Failed`. Returns true on that transition.
    pub fn poll(&mut self) -> bool {
        let Generation::InFlight(rx) = &mut self.state else {
            return false;
        };
        let next = match rx.try_recv() {
            Err(TryRecvError::Empty) => return false,
            Ok(Ok(value)) => Generation::Ready(value),
            Ok(Err(_)) | Err(TryRecvError::Closed) => {
                self.failures += 1;
                Generation::Failed
            }
        };
        self.state = next;
        true
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, Generation::InFlight(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match &self.state {
            Generation::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> Option<&'static str> {
        match self.state {
            Generation::Failed => Some(FALLBACK_MESSAGE),
            _ => None,
        }
    }

    /// Number of attempts that ended in the fallback message.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn clear(&mut self) {
        self.state = Generation::Idle;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::navigation::Props;
    use crate::shell::DashboardShell;
    use crate::views::TeacherRegistry;
    use async_trait::async_trait;
    use std::time::{Duration, Instant};

    /// Test double: replies with fixed text, or fails every call.
    pub(crate) struct FakeClient {
        pub reply: Option<String>,
    }

    #[async_trait]
    impl AiClient for FakeClient {
        async fn generate(&self, _request: &AiRequest) -> Result<AiOutput, AiError> {
            match &self.reply {
                Some(text) => Ok(AiOutput::Text(text.clone())),
                None => Err(AiError::Status {
                    status: 503,
                    body: "unavailable".into(),
                }),
            }
        }
    }

    pub(crate) fn service(reply: Option<&str>) -> AiService {
        AiService::new(Arc::new(FakeClient {
            reply: reply.map(str::to_string),
        }))
        .expect("runtime")
    }

    pub(crate) fn settle<T: Send + 'static>(slot: &mut GenerationSlot<T>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while slot.is_in_flight() && Instant::now() < deadline {
            slot.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!slot.is_in_flight(), "generation did not settle");
    }

    #[test]
    fn successful_generation_becomes_ready() {
        let ai = service(Some("Lesson: fractions"));
        let mut slot: GenerationSlot<String> = GenerationSlot::new();
        slot.start(&ai, "test", AiRequest::text("plan"), |o| Ok(o.into_text()));
        assert!(slot.is_in_flight());
        settle(&mut slot);
        assert_eq!(slot.ready().map(String::as_str), Some("Lesson: fractions"));
        assert_eq!(slot.failure_message(), None);
        assert_eq!(slot.failures(), 0);
    }

    #[test]
    fn fallback_shown_once_per_failed_attempt() {
        let ai = service(None);
        let mut slot: GenerationSlot<String> = GenerationSlot::new();

        slot.start(&ai, "test", AiRequest::text("plan"), |o| Ok(o.into_text()));
        settle(&mut slot);
        // Extra polls after settling must not count again.
        assert!(!slot.poll());
        assert!(!slot.poll());
        assert_eq!(slot.failure_message(), Some(FALLBACK_MESSAGE));
        assert_eq!(slot.failures(), 1);

        slot.start(&ai, "test", AiRequest::text("plan"), |o| Ok(o.into_text()));
        assert_eq!(slot.failure_message(), None);
        settle(&mut slot);
        assert_eq!(slot.failures(), 2);
    }

    #[test]
    fn mapping_error_counts_as_failure() {
        let ai = service(Some("not json at all"));
        let mut slot: GenerationSlot<serde_json::Value> = GenerationSlot::new();
        slot.start(&ai, "test", AiRequest::text("quiz"), |o| o.into_typed());
        settle(&mut slot);
        assert_eq!(slot.failure_message(), Some(FALLBACK_MESSAGE));
    }

    #[test]
    fn failed_request_leaves_other_state_untouched() {
        let failing = service(None);
        let working = service(Some("ok"));

        let mut shell = DashboardShell::<TeacherRegistry>::new();
        shell.navigate_to("quizGenerator", "Quiz Generator", Props::new());
        let depth = shell.depth();
        let frame = shell.current().clone();

        let mut quiz: GenerationSlot<String> = GenerationSlot::new();
        let mut lesson: GenerationSlot<String> = GenerationSlot::new();
        lesson.start(&working, "lesson", AiRequest::text("plan"), |o| Ok(o.into_text()));
        settle(&mut lesson);

        quiz.start(&failing, "quiz", AiRequest::text("quiz"), |o| Ok(o.into_text()));
        settle(&mut quiz);

        assert_eq!(quiz.failures(), 1);
        assert_eq!(quiz.failure_message(), Some(FALLBACK_MESSAGE));
        assert_eq!(lesson.ready().map(String::as_str), Some("ok"));
        assert_eq!(lesson.failures(), 0);
        assert_eq!(shell.depth(), depth);
        assert_eq!(shell.current(), &frame);
    }

    #[test]
    fn blocking_generation_for_cli() {
        let ai = service(Some("answer"));
        let out = ai.generate_blocking(AiRequest::text("q")).expect("generate");
        assert_eq!(out.into_text(), "answer");
    }
}
