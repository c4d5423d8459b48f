use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("attache.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("attache.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("attache.client.request_duration_seconds");

pub(crate) static ATTACHMENTS_INGESTED: Counter = Counter::new("attache.attachments.ingested");
pub(crate) static ATTACHMENTS_FAILED: Counter = Counter::new("attache.attachments.failed");
pub(crate) static ATTACHMENT_BYTES: Counter = Counter::new("attache.attachments.bytes");

pub(crate) static TURNS_COMPLETED: Counter = Counter::new("attache.turns.completed");
pub(crate) static TURNS_FAILED: Counter = Counter::new("attache.turns.failed");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&ATTACHMENTS_INGESTED);
    collector.register_counter(&ATTACHMENTS_FAILED);
    collector.register_counter(&ATTACHMENT_BYTES);

    collector.register_counter(&TURNS_COMPLETED);
    collector.register_counter(&TURNS_FAILED);
}
