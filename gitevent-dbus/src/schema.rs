//! Bus-side shapes of the events: flat structures of strings, one per kind.
//!
//! Optional strings travel as `""` and a [`Change`] travels as its JSON
//! document, so every schema has a plain `(s...)` signature.

use crate::error::{BridgeError, Result};
use gitevent_core::{
    Change, CommitReference, CommittedChanges, DockerImage, DockerImageRequest, Event, EventKind,
    PushedTag,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zvariant::Type;

pub const OBJECT_PATH: &str = "/io/gitevent/artifact";
pub const INTERFACE_PREFIX: &str = "io.gitevent.artifact";

pub trait SignalSchema: Serialize + DeserializeOwned + Type + Send + Sync + 'static {
    const KIND: EventKind;
    const INTERFACE: &'static str;
    const MEMBER: &'static str;

    /// `Ok(None)` when the event is of another kind.
    fn from_event(event: &Event) -> Result<Option<Self>>;

    fn into_event(self) -> Result<Event>;
}

fn optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct DbusStagedChangesCommitted {
    pub message: String,
    pub change: String,
    pub commit: String,
}

impl SignalSchema for DbusStagedChangesCommitted {
    const KIND: EventKind = EventKind::StagedChangesCommitted;
    const INTERFACE: &'static str = "io.gitevent.artifact.StagedChangesCommitted";
    const MEMBER: &'static str = "StagedChangesCommitted";

    fn from_event(event: &Event) -> Result<Option<Self>> {
        Ok(match event {
            Event::StagedChangesCommitted(c) => Some(Self {
                message: c.message.clone(),
                change: serde_json::to_string(&c.change)?,
                commit: c.commit.clone(),
            }),
            _ => None,
        })
    }

    fn into_event(self) -> Result<Event> {
        let change: Change = serde_json::from_str(&self.change)?;
        Ok(Event::StagedChangesCommitted(CommittedChanges {
            message: self.message,
            change,
            commit: self.commit,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct DbusCommittedChangesPushed {
    pub tag: String,
    pub repository_url: String,
    pub revision: String,
    pub repository_folder: String,
}

impl SignalSchema for DbusCommittedChangesPushed {
    const KIND: EventKind = EventKind::CommittedChangesPushed;
    const INTERFACE: &'static str = "io.gitevent.artifact.CommittedChangesPushed";
    const MEMBER: &'static str = "CommittedChangesPushed";

    fn from_event(event: &Event) -> Result<Option<Self>> {
        Ok(match event {
            Event::CommittedChangesPushed(r) => Some(Self {
                tag: optional(&r.tag),
                repository_url: r.repository_url.clone(),
                revision: r.revision.clone(),
                repository_folder: r.repository_folder.clone(),
            }),
            _ => None,
        })
    }

    fn into_event(self) -> Result<Event> {
        Ok(Event::CommittedChangesPushed(CommitReference {
            tag: non_empty(self.tag),
            repository_url: self.repository_url,
            revision: self.revision,
            repository_folder: self.repository_folder,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct DbusCommittedChangesTagged {
    pub tag: String,
    pub repository_url: String,
    pub revision: String,
    pub repository_folder: String,
}

impl SignalSchema for DbusCommittedChangesTagged {
    const KIND: EventKind = EventKind::CommittedChangesTagged;
    const INTERFACE: &'static str = "io.gitevent.artifact.CommittedChangesTagged";
    const MEMBER: &'static str = "CommittedChangesTagged";

    fn from_event(event: &Event) -> Result<Option<Self>> {
        Ok(match event {
            Event::CommittedChangesTagged(r) => Some(Self {
                tag: optional(&r.tag),
                repository_url: r.repository_url.clone(),
                revision: r.revision.clone(),
                repository_folder: r.repository_folder.clone(),
            }),
            _ => None,
        })
    }

    fn into_event(self) -> Result<Event> {
        Ok(Event::CommittedChangesTagged(CommitReference {
            tag: non_empty(self.tag),
            repository_url: self.repository_url,
            revision: self.revision,
            repository_folder: self.repository_folder,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct DbusTagPushed {
    pub tag: String,
    pub commit: String,
    pub repository_url: String,
    pub revision: String,
    pub repository_folder: String,
}

impl SignalSchema for DbusTagPushed {
    const KIND: EventKind = EventKind::TagPushed;
    const INTERFACE: &'static str = "io.gitevent.artifact.TagPushed";
    const MEMBER: &'static str = "TagPushed";

    fn from_event(event: &Event) -> Result<Option<Self>> {
        Ok(match event {
            Event::TagPushed(t) => Some(Self {
                tag: t.tag.clone(),
                commit: t.commit.clone(),
                repository_url: t.repository_url.clone(),
                revision: t.revision.clone(),
                repository_folder: t.repository_folder.clone(),
            }),
            _ => None,
        })
    }

    fn into_event(self) -> Result<Event> {
        Ok(Event::TagPushed(PushedTag {
            tag: self.tag,
            commit: self.commit,
            repository_url: self.repository_url,
            revision: self.revision,
            repository_folder: self.repository_folder,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct DbusDockerImageRequested {
    pub image_name: String,
    pub image_version: String,
}

impl SignalSchema for DbusDockerImageRequested {
    const KIND: EventKind = EventKind::DockerImageRequested;
    const INTERFACE: &'static str = "io.gitevent.artifact.DockerImageRequested";
    const MEMBER: &'static str = "DockerImageRequested";

    fn from_event(event: &Event) -> Result<Option<Self>> {
        Ok(match event {
            Event::DockerImageRequested(i) => Some(Self {
                image_name: i.image_name.clone(),
                image_version: i.image_version.clone(),
            }),
            _ => None,
        })
    }

    fn into_event(self) -> Result<Event> {
        Ok(Event::DockerImageRequested(DockerImageRequest {
            image_name: self.image_name,
            image_version: self.image_version,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct DbusDockerImageAvailable {
    pub image_name: String,
    pub image_version: String,
    pub image_url: String,
}

impl SignalSchema for DbusDockerImageAvailable {
    const KIND: EventKind = EventKind::DockerImageAvailable;
    const INTERFACE: &'static str = "io.gitevent.artifact.DockerImageAvailable";
    const MEMBER: &'static str = "DockerImageAvailable";

    fn from_event(event: &Event) -> Result<Option<Self>> {
        Ok(match event {
            Event::DockerImageAvailable(i) => Some(Self {
                image_name: i.image_name.clone(),
                image_version: i.image_version.clone(),
                image_url: i.image_url.clone(),
            }),
            _ => None,
        })
    }

    fn into_event(self) -> Result<Event> {
        Ok(Event::DockerImageAvailable(DockerImage {
            image_name: self.image_name,
            image_version: self.image_version,
            image_url: self.image_url,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct DbusDockerImagePushed {
    pub image_name: String,
    pub image_version: String,
    pub image_url: String,
}

impl SignalSchema for DbusDockerImagePushed {
    const KIND: EventKind = EventKind::DockerImagePushed;
    const INTERFACE: &'static str = "io.gitevent.artifact.DockerImagePushed";
    const MEMBER: &'static str = "DockerImagePushed";

    fn from_event(event: &Event) -> Result<Option<Self>> {
        Ok(match event {
            Event::DockerImagePushed(i) => Some(Self {
                image_name: i.image_name.clone(),
                image_version: i.image_version.clone(),
                image_url: i.image_url.clone(),
            }),
            _ => None,
        })
    }

    fn into_event(self) -> Result<Event> {
        Ok(Event::DockerImagePushed(DockerImage {
            image_name: self.image_name,
            image_version: self.image_version,
            image_url: self.image_url,
        }))
    }
}

/// A decoded signal of any known schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbusSignal {
    StagedChangesCommitted(DbusStagedChangesCommitted),
    CommittedChangesPushed(DbusCommittedChangesPushed),
    CommittedChangesTagged(DbusCommittedChangesTagged),
    TagPushed(DbusTagPushed),
    DockerImageRequested(DbusDockerImageRequested),
    DockerImageAvailable(DbusDockerImageAvailable),
    DockerImagePushed(DbusDockerImagePushed),
}

impl DbusSignal {
    /// Encodes the event with the schema of its kind.
    pub fn encode(event: &Event) -> Result<Self> {
        let signal = match event.kind() {
            EventKind::StagedChangesCommitted => {
                DbusStagedChangesCommitted::from_event(event)?.map(Self::StagedChangesCommitted)
            }
            EventKind::CommittedChangesPushed => {
                DbusCommittedChangesPushed::from_event(event)?.map(Self::CommittedChangesPushed)
            }
            EventKind::CommittedChangesTagged => {
                DbusCommittedChangesTagged::from_event(event)?.map(Self::CommittedChangesTagged)
            }
            EventKind::TagPushed => DbusTagPushed::from_event(event)?.map(Self::TagPushed),
            EventKind::DockerImageRequested => {
                DbusDockerImageRequested::from_event(event)?.map(Self::DockerImageRequested)
            }
            EventKind::DockerImageAvailable => {
                DbusDockerImageAvailable::from_event(event)?.map(Self::DockerImageAvailable)
            }
            EventKind::DockerImagePushed => {
                DbusDockerImagePushed::from_event(event)?.map(Self::DockerImagePushed)
            }
            EventKind::ArtifactChangesCommitted
            | EventKind::ArtifactCommitPushed
            | EventKind::ArtifactCommitTagged => None,
        };

        signal.ok_or_else(|| BridgeError::UnknownSignal(event.kind().qualified_name()))
    }

    pub fn kind(&self) -> EventKind {
        match self {
            DbusSignal::StagedChangesCommitted(_) => DbusStagedChangesCommitted::KIND,
            DbusSignal::CommittedChangesPushed(_) => DbusCommittedChangesPushed::KIND,
            DbusSignal::CommittedChangesTagged(_) => DbusCommittedChangesTagged::KIND,
            DbusSignal::TagPushed(_) => DbusTagPushed::KIND,
            DbusSignal::DockerImageRequested(_) => DbusDockerImageRequested::KIND,
            DbusSignal::DockerImageAvailable(_) => DbusDockerImageAvailable::KIND,
            DbusSignal::DockerImagePushed(_) => DbusDockerImagePushed::KIND,
        }
    }

    pub fn into_event(self) -> Result<Event> {
        match self {
            DbusSignal::StagedChangesCommitted(s) => s.into_event(),
            DbusSignal::CommittedChangesPushed(s) => s.into_event(),
            DbusSignal::CommittedChangesTagged(s) => s.into_event(),
            DbusSignal::TagPushed(s) => s.into_event(),
            DbusSignal::DockerImageRequested(s) => s.into_event(),
            DbusSignal::DockerImageAvailable(s) => s.into_event(),
            DbusSignal::DockerImagePushed(s) => s.into_event(),
        }
    }
}
