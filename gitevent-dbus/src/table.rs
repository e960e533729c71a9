use crate::schema::{
    DbusCommittedChangesPushed, DbusCommittedChangesTagged, DbusDockerImageAvailable,
    DbusDockerImagePushed, DbusDockerImageRequested, DbusStagedChangesCommitted, DbusTagPushed,
    SignalSchema, OBJECT_PATH,
};
use gitevent_core::EventKind;

/// The bus a route publishes on. Every route is system-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusScope {
    System,
}

/// Where the signal for one event kind is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalRoute {
    pub kind: EventKind,
    pub interface: &'static str,
    pub member: &'static str,
    pub path: &'static str,
    pub scope: BusScope,
}

impl SignalRoute {
    pub const fn of<S: SignalSchema>(scope: BusScope) -> Self {
        SignalRoute {
            kind: S::KIND,
            interface: S::INTERFACE,
            member: S::MEMBER,
            path: OBJECT_PATH,
            scope,
        }
    }
}

const EMITTED: &[SignalRoute] = &[
    SignalRoute::of::<DbusCommittedChangesPushed>(BusScope::System),
    SignalRoute::of::<DbusCommittedChangesTagged>(BusScope::System),
    SignalRoute::of::<DbusDockerImageAvailable>(BusScope::System),
    SignalRoute::of::<DbusDockerImagePushed>(BusScope::System),
    SignalRoute::of::<DbusDockerImageRequested>(BusScope::System),
    SignalRoute::of::<DbusStagedChangesCommitted>(BusScope::System),
    SignalRoute::of::<DbusTagPushed>(BusScope::System),
];

const RECEIVED: &[SignalRoute] = &[
    SignalRoute::of::<DbusCommittedChangesPushed>(BusScope::System),
    SignalRoute::of::<DbusCommittedChangesTagged>(BusScope::System),
    SignalRoute::of::<DbusStagedChangesCommitted>(BusScope::System),
    SignalRoute::of::<DbusTagPushed>(BusScope::System),
];

/// Read-only mapping from event kind to the route its signal takes.
#[derive(Debug, Clone, Copy)]
pub struct SignalTable {
    routes: &'static [SignalRoute],
}

impl SignalTable {
    /// Kinds published on the bus when the application accepts them.
    pub const fn emitter() -> Self {
        SignalTable { routes: EMITTED }
    }

    /// Kinds the listener subscribes to and forwards to the application.
    pub const fn listener() -> Self {
        SignalTable { routes: RECEIVED }
    }

    /// `None` means the kind does not cross the bus.
    pub fn route(&self, kind: EventKind) -> Option<&'static SignalRoute> {
        self.routes.iter().find(|route| route.kind == kind)
    }

    pub fn routes(&self) -> &'static [SignalRoute] {
        self.routes
    }

    pub fn kinds(&self) -> impl Iterator<Item = EventKind> {
        self.routes.iter().map(|route| route.kind)
    }
}
