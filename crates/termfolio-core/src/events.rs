use serde::Serialize;

use crate::dispatch::Command;

/// Notable things the console did, drained by the host for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsoleEvent {
    CommandSubmitted { input: String, command: Command },
    CommandUnknown { input: String },
    SubModeInstalled { mode: &'static str },
    SubModeResolved { mode: &'static str, key: char },
    SubModeCancelled { mode: &'static str },
    TaskScheduled { id: u64, target: String, delay_ms: u64 },
    ExternalOpenRequested { target: String },
    ExternalOpenFailed { target: String, error: String },
    ScreenCleared,
}
