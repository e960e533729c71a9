//! # gitevent
//!
//! Git hook events relayed over D-Bus.
//!
//! Hooks run the `gitevent` binary with an event name; the matching handler
//! reads the repository, builds the event and hands it to a sink. The D-Bus
//! bridge publishes the events other applications care about and turns the
//! signals it receives back into events.
//!
//! ```no_run
//! use gitevent::core::{DockerImageRequest, Event, EventSink};
//! use gitevent::dbus::{SignalEmitter, ZbusTransport};
//!
//! # async fn run() -> gitevent::core::Result<()> {
//! let emitter = SignalEmitter::new(ZbusTransport::new());
//! emitter
//!     .accept(Event::DockerImageRequested(DockerImageRequest {
//!         image_name: "gitevent".to_string(),
//!         image_version: "latest".to_string(),
//!     }))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub use gitevent_core as core;
pub use gitevent_dbus as dbus;

pub use gitevent_core::{Event, EventKind, EventSink};
