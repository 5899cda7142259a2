//! Bounded debug panel buffer.
//!
//! [`DebugLog`] keeps the most recent diagnostic lines (20 by default) with
//! their local time of day. [`DebugLogLayer`] feeds it from `tracing`, so
//! every service only logs through `tracing` and the panel shows the same
//! lines.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Default number of retained entries.
pub const DEFAULT_CAPACITY: usize = 20;

/// One panel line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DebugLogEntry {
    /// When the line was recorded.
    timestamp: DateTime<Local>,
    /// Diagnostic text.
    message: String,
}

impl fmt::Display for DebugLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// FIFO ring buffer of diagnostic lines, shared between clones.
#[derive(Debug, Clone)]
pub struct DebugLog {
    entries: Arc<Mutex<VecDeque<DebugLogEntry>>>,
    capacity: usize,
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DebugLog {
    /// Creates an empty buffer holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<DebugLogEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Appends a line stamped with the current local time, evicting the
    /// oldest line when full.
    pub fn push(&self, message: impl Into<String>) {
        let entry = DebugLogEntry {
            timestamp: Local::now(),
            message: message.into(),
        };
        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Messages only, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.message.clone()).collect()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry; the panel is hidden afterwards.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Panel text, one line per entry, or `None` when the panel is hidden.
    pub fn render_panel(&self) -> Option<String> {
        let entries = self.lock();
        if entries.is_empty() {
            return None;
        }
        let lines: Vec<String> = entries.iter().map(ToString::to_string).collect();
        Some(lines.join("\n"))
    }
}

/// `tracing` layer copying events from SD Bridge crates into a [`DebugLog`].
#[derive(Debug, Clone)]
pub struct DebugLogLayer {
    log: DebugLog,
    max_level: Level,
}

impl DebugLogLayer {
    /// Capture events at `DEBUG` and less verbose levels.
    pub fn new(log: DebugLog) -> Self {
        Self::with_max_level(log, Level::DEBUG)
    }

    /// Capture events at `max_level` and less verbose levels.
    pub fn with_max_level(log: DebugLog, max_level: Level) -> Self {
        Self { log, max_level }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(", ")
        } else {
            format!("{} ({})", self.message, self.fields.join(", "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{} = {}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{} = {:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for DebugLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > self.max_level || !meta.target().starts_with("sdbridge") {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.log.push(visitor.finish());
    }
}
