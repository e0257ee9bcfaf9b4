use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Why the agent stopped talking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The session went idle after answering
    Idle,
    /// The agent reported an error in-band
    Failed(String),
}

/// Fire-once gate. The first `fire` wins; later calls are no-ops.
#[derive(Debug)]
pub struct CompletionSignal {
    tx: Mutex<Option<oneshot::Sender<Completion>>>,
}

impl CompletionSignal {
    /// Returns true only for the call that actually fired
    pub fn fire(&self, completion: Completion) -> bool {
        match self.tx.lock().take() {
            Some(tx) => {
                // The waiter may already be gone; firing still counts.
                let _ = tx.send(completion);
                true
            }
            None => false,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.tx.lock().is_none()
    }
}

/// Receiving half, awaited exactly once
#[derive(Debug)]
pub struct CompletionWaiter {
    rx: oneshot::Receiver<Completion>,
}

impl CompletionWaiter {
    pub async fn wait(self) -> Completion {
        self.rx.await.unwrap_or_else(|_| {
            Completion::Failed("agent closed the session without finishing".to_string())
        })
    }
}

/// Create a linked signal/waiter pair
pub fn completion_signal() -> (Arc<CompletionSignal>, CompletionWaiter) {
    let (tx, rx) = oneshot::channel();
    (
        Arc::new(CompletionSignal {
            tx: Mutex::new(Some(tx)),
        }),
        CompletionWaiter { rx },
    )
}
