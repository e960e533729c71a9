//! # gitevent-core
//!
//! Core library for gitevent - the events raised from git hooks.
//!
//! This crate provides the event catalog, the unified-diff model carried by
//! commit events, the repository reader the handlers query, and the sink
//! trait events are delivered to.

pub mod change;
pub mod error;
pub mod events;
pub mod repository;
pub mod sink;

pub use change::{Change, ChangeType, FilePatch, Hunk};
pub use error::{Error, Result};
pub use events::{
    CommitReference, CommittedChanges, DockerImage, DockerImageRequest, Event, EventKind,
    PushedTag,
};
pub use repository::{GitReader, HeadSnapshot, LatestCommit, RepositoryInfo, RepositoryReader};
pub use sink::EventSink;
