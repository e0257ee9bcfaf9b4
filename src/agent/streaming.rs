use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info, warn};

use super::sse::{decode_chunk, SseBuffer, SseFrame, StreamPayload};
use super::traits::{AgentClient, AgentSession};
use super::types::{
    ClientOptions, EventHandler, MessageOptions, SessionConfig, SessionEvent, SessionEventKind,
};
use crate::constants::{EVENT_CHANNEL_CAPACITY, HEALTH_CHECK_TIMEOUT_SECS};
use crate::utils::{Result, SanitiserError};

/// Agent client backed by an OpenAI-compatible chat completions endpoint
/// (a LiteLLM proxy, or any server speaking the same wire format)
pub struct StreamingAgentClient {
    options: ClientOptions,
    verbosity: LevelFilter,
    http: Option<Client>,
    next_session: AtomicU64,
}

impl StreamingAgentClient {
    pub fn new(options: ClientOptions) -> Self {
        let verbosity = parse_verbosity(&options.log_level);
        Self {
            options,
            verbosity,
            http: None,
            next_session: AtomicU64::new(1),
        }
    }

    /// Ceiling for the client's own lifecycle logs
    pub fn verbosity(&self) -> LevelFilter {
        self.verbosity
    }

    fn chatty(&self) -> bool {
        self.verbosity >= LevelFilter::INFO
    }

    pub fn is_running(&self) -> bool {
        self.http.is_some()
    }

    /// Check the endpoint is reachable, trying `/health` first and `/v1/models` second
    async fn check_health(&self, http: &Client) -> Result<()> {
        let base = self.options.base_url.trim_end_matches('/');

        for path in ["/health", "/v1/models"] {
            let url = format!("{}{}", base, path);
            let request = authorized(
                http.get(&url)
                    .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS)),
                self.options.api_key.as_deref(),
            );

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Agent endpoint healthy at {}", url);
                    return Ok(());
                }
                Ok(response) => debug!("{} answered {}", url, response.status()),
                Err(e) => debug!("{} unreachable: {}", url, e),
            }
        }

        Err(SanitiserError::ClientStart(format!(
            "agent endpoint at {} is not reachable",
            self.options.base_url
        )))
    }
}

#[async_trait]
impl AgentClient for StreamingAgentClient {
    async fn start(&mut self) -> Result<()> {
        if self.http.is_some() {
            return Err(SanitiserError::ClientStart("client already started".into()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(self.options.request_timeout_secs))
            .build()
            .map_err(|e| SanitiserError::ClientStart(e.to_string()))?;

        if self.options.health_check {
            self.check_health(&http).await?;
        }

        if self.chatty() {
            info!("Agent client started against {}", self.options.base_url);
        }
        self.http = Some(http);
        Ok(())
    }

    async fn create_session(&self, config: SessionConfig) -> Result<Box<dyn AgentSession>> {
        let http = self
            .http
            .clone()
            .ok_or_else(|| SanitiserError::SessionCreate("client is not running".into()))?;

        let id = format!("session-{}", self.next_session.fetch_add(1, Ordering::Relaxed));
        if self.chatty() {
            info!("Created session {} (model {})", id, config.model);
        }

        Ok(Box::new(StreamingSession::new(
            id,
            http,
            self.options.base_url.trim_end_matches('/').to_string(),
            self.options.api_key.clone(),
            config,
        )))
    }

    async fn stop(&mut self) {
        if self.http.take().is_some() && self.chatty() {
            info!("Agent client stopped");
        }
    }
}

/// Session over the streaming client. Events from every in-flight response
/// funnel through one channel into a single dispatcher task, so the handler
/// sees them one at a time and in arrival order.
pub struct StreamingSession {
    id: String,
    http: Client,
    base_url: String,
    api_key: Option<String>,
    config: SessionConfig,
    handler: Arc<RwLock<Option<EventHandler>>>,
    events: mpsc::Sender<SessionEvent>,
    dispatcher: Option<JoinHandle<()>>,
    streams: Mutex<Vec<JoinHandle<()>>>,
    next_message: AtomicU64,
}

impl StreamingSession {
    fn new(
        id: String,
        http: Client,
        base_url: String,
        api_key: Option<String>,
        config: SessionConfig,
    ) -> Self {
        let (events, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let handler: Arc<RwLock<Option<EventHandler>>> = Arc::new(RwLock::new(None));
        let dispatcher = tokio::spawn(dispatch(rx, Arc::clone(&handler)));

        Self {
            id,
            http,
            base_url,
            api_key,
            config,
            handler,
            events,
            dispatcher: Some(dispatcher),
            streams: Mutex::new(Vec::new()),
            next_message: AtomicU64::new(1),
        }
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(system) = &self.config.system_message {
            messages.push(json!({ "role": "system", "content": system.content }));
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        json!({
            "model": self.config.model,
            "messages": messages,
            "stream": self.config.streaming,
        })
    }

    fn abort_all(&mut self) {
        for handle in self.streams.lock().drain(..) {
            handle.abort();
        }
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.abort();
        }
    }
}

#[async_trait]
impl AgentSession for StreamingSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn on(&mut self, handler: EventHandler) {
        if self.handler.write().replace(handler).is_some() {
            warn!("Session {} replaced an existing event handler", self.id);
        }
    }

    async fn send(&self, options: MessageOptions) -> Result<String> {
        if self.dispatcher.is_none() {
            return Err(SanitiserError::Send(format!("session {} was destroyed", self.id)));
        }
        if self.handler.read().is_none() {
            return Err(SanitiserError::Send("no event handler registered".into()));
        }

        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = authorized(
            self.http.post(&url).json(&self.request_body(&options.prompt)),
            self.api_key.as_deref(),
        );

        let response = request.send().await.map_err(|e| {
            SanitiserError::Send(format!("failed to reach agent at {}: {}", self.base_url, e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SanitiserError::Send(format!("agent returned {}: {}", status, body)));
        }

        let message_id = format!(
            "{}-msg-{}",
            self.id,
            self.next_message.fetch_add(1, Ordering::Relaxed)
        );
        debug!("Message {} accepted", message_id);

        let events = self.events.clone();
        let handle = if self.config.streaming {
            tokio::spawn(pump_stream(response, events))
        } else {
            tokio::spawn(pump_whole(response, events))
        };
        self.streams.lock().push(handle);

        Ok(message_id)
    }

    async fn destroy(&mut self) {
        self.abort_all();
        debug!("Session {} destroyed", self.id);
    }
}

impl Drop for StreamingSession {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// Unknown level names fall back to errors only
fn parse_verbosity(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::ERROR)
}

fn authorized(request: RequestBuilder, api_key: Option<&str>) -> RequestBuilder {
    match api_key {
        Some(key) => request.bearer_auth(key),
        None => request,
    }
}

async fn dispatch(mut rx: mpsc::Receiver<SessionEvent>, handler: Arc<RwLock<Option<EventHandler>>>) {
    while let Some(event) = rx.recv().await {
        // Clone out so the lock is not held while user code runs.
        let current = handler.read().clone();
        match current {
            Some(handler) => handler(event),
            None => debug!("Dropping {} event: no handler registered", event.kind),
        }
    }
}

/// Turn an SSE body into assistant/idle/error events
async fn pump_stream(response: Response, events: mpsc::Sender<SessionEvent>) {
    let mut body = response.bytes_stream();
    let mut buffer = SseBuffer::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                let _ = events.send(SessionEvent::error(format!("stream interrupted: {}", e))).await;
                return;
            }
        };

        for frame in buffer.push(&chunk) {
            if !forward_frame(frame, &events).await {
                return;
            }
        }
    }

    if let Some(frame) = buffer.finish() {
        if !forward_frame(frame, &events).await {
            return;
        }
    }

    let _ = events.send(SessionEvent::idle()).await;
}

/// Returns false once the stream is finished, failed, or nobody is listening
async fn forward_frame(frame: SseFrame, events: &mpsc::Sender<SessionEvent>) -> bool {
    let event = match frame {
        SseFrame::Done => {
            let _ = events.send(SessionEvent::idle()).await;
            return false;
        }
        SseFrame::Data(data) => match decode_chunk(&data) {
            StreamPayload::Delta(content) => SessionEvent::assistant_message(content),
            StreamPayload::Empty => return true,
            StreamPayload::Error(e) => {
                let _ = events.send(SessionEvent::error(e)).await;
                return false;
            }
        },
    };
    events.send(event).await.is_ok()
}

/// Deliver a non-streamed completion as one message followed by idle
async fn pump_whole(response: Response, events: mpsc::Sender<SessionEvent>) {
    let event = match response.json::<ChatCompletionResponse>().await {
        Ok(completion) => match completion.choices.into_iter().next() {
            Some(choice) => SessionEvent::assistant_message(choice.message.content),
            None => SessionEvent::error("completion contained no choices"),
        },
        Err(e) => SessionEvent::error(format!("malformed completion: {}", e)),
    };

    let failed = event.kind == SessionEventKind::Error;
    if events.send(event).await.is_ok() && !failed {
        let _ = events.send(SessionEvent::idle()).await;
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}
