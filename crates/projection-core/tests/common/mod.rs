#![allow(dead_code)]

use projection_core::{ProjectionBufferManager, ProjectionEvent};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Route engine logs to the test output (`RUST_LOG=projection_core=trace cargo test`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Record every event the manager emits.
pub fn record_events(manager: &mut ProjectionBufferManager) -> Arc<Mutex<Vec<ProjectionEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    manager.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

/// Drain recorded events.
pub fn take(events: &Arc<Mutex<Vec<ProjectionEvent>>>) -> Vec<ProjectionEvent> {
    std::mem::take(&mut *events.lock().unwrap())
}
