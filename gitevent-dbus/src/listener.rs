use crate::error::Result;
use crate::schema::INTERFACE_PREFIX;
use crate::table::SignalTable;
use crate::transport::SignalTransport;
use futures::StreamExt;
use gitevent_core::EventSink;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Receives bus signals and hands the decoded events to the application.
pub struct SignalListener<T> {
    transport: T,
    table: SignalTable,
}

impl<T: SignalTransport> SignalListener<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            table: SignalTable::listener(),
        }
    }

    pub fn signal_receivers(&self) -> &SignalTable {
        &self.table
    }

    /// Schema packages this listener can decode.
    pub fn schema_packages() -> &'static [&'static str] {
        &[INTERFACE_PREFIX]
    }

    /// Forwards signals until the bus stream ends or `shutdown` fires, then
    /// waits for the deliveries still in flight. Each delivery runs on its
    /// own task so a slow sink never stalls the bus reader.
    ///
    /// Returns the number of events handed to the sink.
    pub async fn listen(
        &self,
        sink: Arc<dyn EventSink>,
        shutdown: CancellationToken,
    ) -> Result<usize> {
        let mut signals = self.transport.subscribe(self.table.routes()).await?;
        let mut deliveries = JoinSet::new();
        let mut forwarded = 0;

        info!("Listening for {} signal kind(s)", self.table.routes().len());

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Signal listener shutting down");
                    break;
                }
                Some(joined) = deliveries.join_next(), if !deliveries.is_empty() => {
                    if let Err(e) = joined {
                        error!("Delivery task failed: {}", e);
                    }
                }
                next = signals.next() => match next {
                    Some(Ok(signal)) => match signal.into_event() {
                        Ok(event) => {
                            debug!("Received {}", event);
                            forwarded += 1;
                            let sink = Arc::clone(&sink);
                            deliveries.spawn(async move {
                                let kind = event.kind();
                                if let Err(e) = sink.accept(event).await {
                                    error!("Application rejected {}: {}", kind, e);
                                }
                            });
                        }
                        Err(e) => warn!("Dropping signal with an undecodable body: {}", e),
                    },
                    Some(Err(e)) => warn!("Dropping malformed signal: {}", e),
                    None => {
                        info!("Signal stream closed");
                        break;
                    }
                },
            }
        }

        while let Some(joined) = deliveries.join_next().await {
            if let Err(e) = joined {
                error!("Delivery task failed: {}", e);
            }
        }

        Ok(forwarded)
    }
}
