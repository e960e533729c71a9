//! # gitevent-dbus
//!
//! Signal bridge for gitevent: publishes accepted events as D-Bus signals
//! and turns inbound signals back into events for the application.

pub mod emitter;
pub mod error;
pub mod listener;
pub mod schema;
pub mod table;
pub mod transport;

pub use emitter::SignalEmitter;
pub use error::{BridgeError, Result};
pub use listener::SignalListener;
pub use schema::{DbusSignal, SignalSchema};
pub use table::{BusScope, SignalRoute, SignalTable};
pub use transport::{SignalTransport, ZbusTransport};
