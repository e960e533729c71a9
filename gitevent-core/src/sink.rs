use crate::error::Result;
use crate::events::Event;
use async_trait::async_trait;
use std::sync::Arc;

/// The application side that receives constructed events.
///
/// Handlers and the bus listener never keep a sink around; it is handed to
/// them on every call.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn accept(&self, event: Event) -> Result<()>;
}

#[async_trait]
impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    async fn accept(&self, event: Event) -> Result<()> {
        (**self).accept(event).await
    }
}
