/// Runtime module - Gateway

mod console;
mod sanitiser;
mod signal;

pub use console::Console;
pub use sanitiser::{event_handler, issue_prompt, IssueSanitiser, SanitiseOutcome};
pub use signal::{completion_signal, Completion, CompletionSignal, CompletionWaiter};
