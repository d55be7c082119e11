//! Error-reporting sink.
//!
//! Failures that end a webhook with a 500 are captured here in addition to
//! the ordinary request logs, so they can be routed somewhere an operator
//! will see them.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

/// Receives errors worth an operator's attention.
pub trait ErrorReporter: Send + Sync {
    /// Records `error`, optionally with the data that was being sent or
    /// received when it happened.
    fn capture(&self, error: &str, context: Option<&Value>);
}

/// Emits captured errors as error-level events on the `prlint::errors` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn capture(&self, error: &str, context: Option<&Value>) {
        match context {
            Some(context) => error!(target: "prlint::errors", error, context = %context, "Captured error"),
            None => error!(target: "prlint::errors", error, "Captured error"),
        }
    }
}

/// Stand-in used when error reporting is disabled. Captures still show up in
/// the logs at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubReporter;

impl ErrorReporter for StubReporter {
    fn capture(&self, error: &str, _context: Option<&Value>) {
        info!(error, "Error reporting disabled, not capturing");
    }
}

/// Picks the reporter for the `DISABLE_RAVEN_LOG` setting.
pub fn reporter_for(disabled: bool) -> Arc<dyn ErrorReporter> {
    if disabled {
        Arc::new(StubReporter)
    } else {
        Arc::new(TracingReporter)
    }
}
