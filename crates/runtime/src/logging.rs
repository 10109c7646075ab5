use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::events::{RuntimeEvent, RuntimeEventKind};

/// Installs the global subscriber, writing to stderr so stdout stays free
/// for the status line. `RUST_LOG` overrides the default filter. Calling it
/// again is a no-op.
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{service_name}=info,info")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

pub trait EventSink: Send + 'static {
    fn write(&mut self, event: &RuntimeEvent);
}

/// Logs each decision through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn write(&mut self, event: &RuntimeEvent) {
        let symbol = event.symbol.as_str();
        match &event.kind {
            RuntimeEventKind::Entry {
                strategy,
                confidence,
                quantity,
                price,
            } => info!(
                cycle = event.cycle,
                symbol,
                strategy,
                confidence,
                quantity,
                price,
                "position opened"
            ),
            RuntimeEventKind::ForcedExit {
                reason,
                quantity,
                price,
                realized_pnl,
            } => info!(
                cycle = event.cycle,
                symbol,
                reason,
                quantity,
                price,
                realized_pnl,
                "position force-closed"
            ),
            RuntimeEventKind::SignalExit {
                strategy,
                quantity,
                price,
                realized_pnl,
            } => info!(
                cycle = event.cycle,
                symbol,
                strategy,
                quantity,
                price,
                realized_pnl,
                "position closed on signal"
            ),
            RuntimeEventKind::RiskReject {
                strategy,
                reason,
                requested_qty,
            } => info!(
                cycle = event.cycle,
                symbol,
                strategy,
                reason = reason.as_str(),
                requested_qty,
                "entry rejected"
            ),
        }
    }
}

/// Collects events for inspection; clones share one buffer.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventSink {
    events: Arc<Mutex<Vec<RuntimeEvent>>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RuntimeEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for InMemoryEventSink {
    fn write(&mut self, event: &RuntimeEvent) {
        self.events.lock().push(event.clone());
    }
}
