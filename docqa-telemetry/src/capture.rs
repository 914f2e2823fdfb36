use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::subscriber::DefaultGuard;
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// One captured log event.
#[derive(Debug, Clone, Serialize)]
pub struct CapturedEvent {
    pub level: String,
    pub target: String,
    /// The event's `message` field, if it had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub fields: HashMap<String, serde_json::Value>,
}

/// Shared storage for captured events.
#[derive(Debug, Clone, Default)]
pub struct CapturedEvents {
    events: Arc<RwLock<Vec<CapturedEvent>>>,
}

impl CapturedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// A layer that appends every event it sees to this storage.
    pub fn layer(&self) -> CaptureLayer {
        CaptureLayer { events: self.clone() }
    }

    pub fn all(&self) -> Vec<CapturedEvent> {
        self.events.read().map(|events| events.clone()).unwrap_or_default()
    }

    /// Events recorded at exactly `level`.
    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        let level = level.to_string();
        self.all().into_iter().filter(|e| e.level == level).collect()
    }

    /// Whether any event message contains `needle`.
    pub fn contains_message(&self, needle: &str) -> bool {
        self.all().iter().any(|e| e.message.as_deref().is_some_and(|m| m.contains(needle)))
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }

    fn push(&self, event: CapturedEvent) {
        if let Ok(mut events) = self.events.write() {
            events.push(event);
        }
    }
}

/// A tracing layer that captures events in memory.
pub struct CaptureLayer {
    events: CapturedEvents,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);
        let mut fields = visitor.0;
        let message = match fields.remove("message") {
            Some(serde_json::Value::String(message)) => Some(message),
            Some(other) => Some(other.to_string()),
            None => None,
        };

        let metadata = event.metadata();
        self.events.push(CapturedEvent {
            level: metadata.level().to_string(),
            target: metadata.target().to_string(),
            message,
            fields,
        });
    }
}

/// Capture every event on the current thread until the guard is dropped.
///
/// Works with `#[tokio::test]`, whose runtime polls on the test thread.
pub fn capture_events() -> (CapturedEvents, DefaultGuard) {
    let events = CapturedEvents::new();
    let subscriber = tracing_subscriber::registry().with(events.layer());
    let guard = tracing::subscriber::set_default(subscriber);
    (events, guard)
}

#[derive(Default)]
struct JsonVisitor(HashMap<String, serde_json::Value>);

impl tracing::field::Visit for JsonVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::Value::Bool(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_message_and_fields() {
        let (events, _guard) = capture_events();
        tracing::info!(chunk_count = 3usize, ready = true, "ingested document");
        tracing::warn!("context is empty");

        let all = events.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].level, "INFO");
        assert_eq!(all[0].message.as_deref(), Some("ingested document"));
        assert_eq!(all[0].fields["chunk_count"], serde_json::json!(3));
        assert_eq!(all[0].fields["ready"], serde_json::json!(true));
        assert_eq!(events.at_level(Level::WARN).len(), 1);
        assert!(events.contains_message("context is empty"));
    }

    #[test]
    fn clear_empties_storage() {
        let (events, _guard) = capture_events();
        tracing::error!(error = %"boom", "retrieval failed");
        assert!(events.contains_message("retrieval failed"));
        assert_eq!(events.all()[0].fields["error"], serde_json::json!("boom"));
        events.clear();
        assert!(events.all().is_empty());
    }
}
