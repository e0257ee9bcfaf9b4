use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::console::Console;
use super::signal::{completion_signal, Completion, CompletionSignal};
use crate::agent::{
    AgentClient, AgentSession, EventHandler, MessageOptions, SessionConfig, SessionEvent,
    SessionEventKind,
};
use crate::constants::{COMPLETION_BANNER, PROMPT_PREFIX};
use crate::utils::{Result, SanitiserError};

/// Result of one sanitisation run
#[derive(Debug)]
pub struct SanitiseOutcome {
    /// The issue that was analysed
    pub issue_url: String,
    /// Every streamed fragment, concatenated in arrival order
    pub response: String,
    /// Error payload if the agent failed in-band
    pub error: Option<String>,
    /// Model used
    pub model: String,
    /// Wall-clock time from send to completion
    pub duration_ms: u128,
}

impl SanitiseOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn exit_code(&self) -> i32 {
        match self.failure() {
            Some(e) => e.exit_code(),
            None => 0,
        }
    }

    /// The in-band agent failure, if there was one
    pub fn failure(&self) -> Option<SanitiserError> {
        self.error.clone().map(SanitiserError::Agent)
    }
}

/// Build the single prompt sent for an issue
pub fn issue_prompt(issue_url: &str) -> String {
    format!("{}{}", PROMPT_PREFIX, issue_url)
}

/// Drives one issue through the agent: start, open a session, send the
/// prompt, stream the answer, release everything.
pub struct IssueSanitiser {
    client: Box<dyn AgentClient>,
    session_config: SessionConfig,
    console: Arc<Console>,
}

impl IssueSanitiser {
    pub fn new(
        client: Box<dyn AgentClient>,
        session_config: SessionConfig,
        console: Arc<Console>,
    ) -> Self {
        Self {
            client,
            session_config,
            console,
        }
    }

    /// Run the whole exchange. Start, session and send failures are logged
    /// and come back as errors; an in-band agent error is reported and lands
    /// in the outcome.
    pub async fn run(mut self, issue_url: &str) -> Result<SanitiseOutcome> {
        let result = self.run_started(issue_url).await;
        if let Err(e) = &result {
            error!("{}", e);
        }
        result
    }

    async fn run_started(&mut self, issue_url: &str) -> Result<SanitiseOutcome> {
        self.client.start().await.map_err(|e| match e {
            SanitiserError::ClientStart(_) => e,
            other => SanitiserError::ClientStart(other.to_string()),
        })?;

        let result = self.run_session(issue_url).await;
        self.client.stop().await;
        result
    }

    async fn run_session(&self, issue_url: &str) -> Result<SanitiseOutcome> {
        let mut session = self
            .client
            .create_session(self.session_config.clone())
            .await
            .map_err(|e| match e {
                SanitiserError::SessionCreate(_) => e,
                other => SanitiserError::SessionCreate(other.to_string()),
            })?;
        debug!("Session {} open", session.id());

        let result = self.converse(session.as_mut(), issue_url).await;
        session.destroy().await;
        result
    }

    async fn converse(
        &self,
        session: &mut dyn AgentSession,
        issue_url: &str,
    ) -> Result<SanitiseOutcome> {
        let response = Arc::new(Mutex::new(String::new()));
        let (signal, waiter) = completion_signal();

        session.on(event_handler(
            Arc::clone(&self.console),
            Arc::clone(&response),
            signal,
        ));

        self.console
            .println(&format!("Analyzing issue: {}\n", issue_url));

        let started = Instant::now();
        let message_id = session
            .send(MessageOptions {
                prompt: issue_prompt(issue_url),
            })
            .await
            .map_err(|e| match e {
                SanitiserError::Send(_) => e,
                other => SanitiserError::Send(other.to_string()),
            })?;
        debug!("Sent message {}", message_id);

        let completion = waiter.wait().await;
        let duration_ms = started.elapsed().as_millis();

        let error = match completion {
            Completion::Idle => {
                self.console.println(&format!("\n\n{}", COMPLETION_BANNER));
                info!("Issue sanitised in {}ms", duration_ms);
                None
            }
            Completion::Failed(payload) => {
                warn!("Agent failed: {}", payload);
                Some(payload)
            }
        };

        let response = response.lock().clone();
        Ok(SanitiseOutcome {
            issue_url: issue_url.to_string(),
            response,
            error,
            model: self.session_config.model.clone(),
            duration_ms,
        })
    }
}

/// Handler that streams fragments to the console, accumulates them, and
/// fires completion on idle or error
pub fn event_handler(
    console: Arc<Console>,
    response: Arc<Mutex<String>>,
    signal: Arc<CompletionSignal>,
) -> EventHandler {
    Arc::new(move |event: SessionEvent| match event.kind {
        SessionEventKind::AssistantMessage => {
            if let Some(content) = event.data.content.as_deref().filter(|c| !c.is_empty()) {
                console.print(content);
                response.lock().push_str(content);
            }
        }
        SessionEventKind::SessionIdle => {
            if !signal.fire(Completion::Idle) {
                debug!("Ignoring repeated idle event");
            }
        }
        SessionEventKind::Error => {
            let payload = event
                .data
                .error
                .unwrap_or_else(|| "unknown agent error".to_string());
            console.eprintln(&format!("\nError: {}", payload));
            signal.fire(Completion::Failed(payload));
        }
        SessionEventKind::Other(kind) => debug!("Ignoring {} event", kind),
    })
}
