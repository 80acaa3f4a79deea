//! Event ingestion and sequence assignment.

use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ApiError;
use crate::telemetry::events::{ProgressEnvelope, ProgressEvent};
use crate::telemetry::sinks::EventSink;

pub struct EventIngestor {
    sink: Box<dyn EventSink>,
    receiver: Receiver<ProgressEnvelope>,
    next_seq: HashMap<String, u64>,
}

impl EventIngestor {
    pub fn new(sink: Box<dyn EventSink>, receiver: Receiver<ProgressEnvelope>) -> Self {
        Self {
            sink,
            receiver,
            next_seq: HashMap::new(),
        }
    }

    pub fn ingest_pending(&mut self) -> Result<usize, ApiError> {
        let mut count = 0usize;
        while let Ok(envelope) = self.receiver.try_recv() {
            self.ingest_one(envelope)?;
            count += 1;
        }
        if count > 0 {
            self.sink.flush()?;
        }
        Ok(count)
    }

    fn ingest_one(&mut self, envelope: ProgressEnvelope) -> Result<(), ApiError> {
        let next = self.next_seq.entry(envelope.session.clone()).or_insert(1);
        let event = ProgressEvent::from_envelope(envelope, *next);
        *next += 1;
        self.sink.append(&event)
    }
}

#[derive(Clone)]
pub struct SharedIngestor(Arc<Mutex<EventIngestor>>);

impl SharedIngestor {
    pub fn new(inner: EventIngestor) -> Self {
        Self(Arc::new(Mutex::new(inner)))
    }

    pub fn drain(&self) -> Result<usize, ApiError> {
        self.0.lock().ingest_pending()
    }
}
