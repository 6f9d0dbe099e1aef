//! Correction event model.
//!
//! A corrector never prints to stdout on its own. To observe what a call
//! replaced (or skipped, or degraded), register an [`EventSink`] on the
//! corrector. The core emits records; sinks format.
//!
//! Production favours availability: degradation is allowed but never
//! silent. Evaluation favours detectability: rejected near-misses surface
//! as [`CorrectionEvent::Warning`].

use parking_lot::Mutex;
use std::sync::Arc;

/// Pipeline stage an error event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Candidate generation (sliding-window scan).
    CandidateGen,
    /// Final scoring.
    Scoring,
    /// Phonetic key computation for a token.
    Normalize,
}

/// A single observability record emitted during `correct()`.
///
/// Every variant carries the call's `trace_id`; the id lives on the stack
/// of the call, never on the corrector.
#[derive(Debug, Clone)]
pub enum CorrectionEvent {
    /// An accepted rewrite. Offsets are byte indices into the corrected
    /// call's input; events are emitted in left-to-right span order.
    Replacement {
        /// Per-call trace id.
        trace_id: String,
        /// Start byte offset of the replaced span.
        start: usize,
        /// End byte offset (exclusive) of the replaced span.
        end: usize,
        /// The surface text that was replaced.
        original: String,
        /// The canonical surface written in its place.
        replacement: String,
        /// Canonical term that won the span.
        canonical: String,
        /// The alias/variant surface that matched.
        alias: String,
        /// Final score of the winning candidate (lower is better).
        score: f64,
        /// Whether a context keyword contributed to the score.
        has_context: bool,
    },
    /// A transient phonetic conversion failure, recovered locally.
    FuzzyError {
        /// Per-call trace id.
        trace_id: String,
        /// Stage the failure occurred in.
        stage: Stage,
        /// Failure description.
        detail: String,
    },
    /// The call (or part of it) fell back to a weaker strategy.
    Degraded {
        /// Per-call trace id.
        trace_id: String,
        /// Stage that degraded.
        stage: Stage,
        /// Why the degradation happened.
        reason: String,
    },
    /// Evaluation-mode diagnostic: a candidate passed phonetic similarity
    /// but was rejected by a keyword or exclusion gate.
    Warning {
        /// Per-call trace id.
        trace_id: String,
        /// Start byte offset of the rejected span.
        start: usize,
        /// End byte offset (exclusive) of the rejected span.
        end: usize,
        /// Surface text of the rejected span.
        original: String,
        /// Canonical the span would have been rewritten to.
        canonical: String,
        /// Rejection reason.
        reason: String,
    },
}

impl CorrectionEvent {
    /// The trace id shared by all events of one `correct()` call.
    pub fn trace_id(&self) -> &str {
        match self {
            CorrectionEvent::Replacement { trace_id, .. }
            | CorrectionEvent::FuzzyError { trace_id, .. }
            | CorrectionEvent::Degraded { trace_id, .. }
            | CorrectionEvent::Warning { trace_id, .. } => trace_id,
        }
    }
}

/// Non-suspending observer interface. Sinks must not block the matcher.
pub trait EventSink: Send + Sync {
    /// Receive one event. Called synchronously from inside `correct()`.
    fn on_event(&self, event: &CorrectionEvent);
}

impl<F> EventSink for F
where
    F: Fn(&CorrectionEvent) + Send + Sync,
{
    fn on_event(&self, event: &CorrectionEvent) {
        self(event)
    }
}

/// In-memory sink for tests and diagnostics.
///
/// ```rust
/// use phonofix::events::{EventBuffer, EventSink};
/// use std::sync::Arc;
///
/// let buffer = Arc::new(EventBuffer::new());
/// assert!(buffer.snapshot().is_empty());
/// ```
#[derive(Default)]
pub struct EventBuffer {
    events: Mutex<Vec<CorrectionEvent>>,
}

impl EventBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clones the recorded events.
    pub fn snapshot(&self) -> Vec<CorrectionEvent> {
        self.events.lock().clone()
    }

    /// Drains and returns the recorded events.
    pub fn take(&self) -> Vec<CorrectionEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for EventBuffer {
    fn on_event(&self, event: &CorrectionEvent) {
        self.events.lock().push(event.clone());
    }
}

impl EventSink for Arc<EventBuffer> {
    fn on_event(&self, event: &CorrectionEvent) {
        self.as_ref().on_event(event)
    }
}
