//! In-memory event capture for log assertions in tests

use kvrecon_core_types::schema::field;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event with its fields rendered as text
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(field::OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(field::EVENT)
    }

    pub fn component(&self) -> Option<&str> {
        self.field(field::COMPONENT)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.field(field::REQUEST_ID)
    }

    fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }
}

struct Recorder<'a>(&'a mut BTreeMap<String, String>);

impl Visit for Recorder<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    // Integers and bools reach here too; their Debug form is the plain value.
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

/// Shared event sink; the layer appends and tests read
#[derive(Clone, Default)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    /// Layer feeding this capture
    pub fn layer(&self) -> CaptureLayer {
        CaptureLayer { sink: self.clone() }
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events for `op` with the given boundary event, in emission order
    pub fn events_for(&self, op: &str, event: &str) -> Vec<CapturedEvent> {
        self.events().into_iter().filter(|e| e.is(op, event)).collect()
    }

    /// Every event tagged with `request_id`, in emission order
    pub fn for_request(&self, request_id: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.request_id() == Some(request_id))
            .collect()
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// # Panics
    ///
    /// Panics when no event for `op` carries `event`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "Expected event op={} event={} among {} captured events",
            op,
            event,
            events.len()
        );
    }

    fn push(&self, event: CapturedEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Subscriber layer that records every event into a [`TestCapture`]
pub struct CaptureLayer {
    sink: TestCapture,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut Recorder(&mut fields));

        let metadata = event.metadata();
        self.sink.push(CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            fields,
        });
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture as the global subscriber and return its handle
///
/// The first call wins; tests running in parallel share one capture, so they
/// should filter by a unique op name or request id.
///
/// ```
/// use kvrecon_core::logging_facility::test_capture::init_test_capture;
/// use kvrecon_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op");
/// capture.assert_event_exists("doc_capture_op", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let capture = TestCapture::default();
            let _ = tracing_subscriber::registry()
                .with(capture.layer())
                .try_init();
            capture
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::subscriber::with_default;

    #[test]
    fn test_layer_records_typed_fields() {
        let capture = TestCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.layer());

        with_default(subscriber, || {
            tracing::info!(op = "push", event = "end", applied_count = 2u64, dry = false);
        });

        let events = capture.events_for("push", "end");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::INFO);
        assert_eq!(events[0].field("applied_count"), Some("2"));
        assert_eq!(events[0].field("dry"), Some("false"));
        assert_eq!(events[0].request_id(), None);
    }

    #[test]
    fn test_for_request_filters_by_id() {
        let capture = TestCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.layer());

        with_default(subscriber, || {
            tracing::info!(op = "changes", request_id = "r1");
            tracing::info!(op = "changes", request_id = "r2");
            tracing::info!(op = "push", request_id = "r1");
        });

        let ops: Vec<_> = capture
            .for_request("r1")
            .iter()
            .filter_map(|e| e.op().map(str::to_string))
            .collect();
        assert_eq!(ops, vec!["changes", "push"]);
    }
}
