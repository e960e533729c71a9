use crate::error::Result;
use crate::schema::DbusSignal;
use crate::table::SignalTable;
use crate::transport::SignalTransport;
use async_trait::async_trait;
use gitevent_core::{Event, EventSink};
use tracing::info;

/// Publishes accepted events on the bus, for the kinds its table routes.
pub struct SignalEmitter<T> {
    transport: T,
    table: SignalTable,
}

impl<T: SignalTransport> SignalEmitter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            table: SignalTable::emitter(),
        }
    }

    pub fn signal_emitters(&self) -> &SignalTable {
        &self.table
    }

    /// Returns whether the event was published. Kinds without a route are
    /// skipped; that is not an error.
    pub async fn emit(&self, event: &Event) -> Result<bool> {
        let kind = event.kind();
        let Some(route) = self.table.route(kind) else {
            info!("{} is not published on the bus, skipping it", kind.qualified_name());
            return Ok(false);
        };

        let signal = DbusSignal::encode(event)?;
        self.transport.publish(route, &signal).await?;
        info!("Emitted {} on the {:?} bus", kind, route.scope);
        Ok(true)
    }
}

#[async_trait]
impl<T: SignalTransport> EventSink for SignalEmitter<T> {
    async fn accept(&self, event: Event) -> gitevent_core::Result<()> {
        self.emit(&event).await?;
        Ok(())
    }
}
