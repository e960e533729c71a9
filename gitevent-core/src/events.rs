use crate::change::Change;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Changes that were committed, together with the commit that recorded them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedChanges {
    pub message: String,
    pub change: Change,
    pub commit: String,
}

/// A commit identified by the repository it lives in, optionally tagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReference {
    pub tag: Option<String>,
    pub repository_url: String,
    pub revision: String,
    pub repository_folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushedTag {
    pub tag: String,
    pub commit: String,
    pub repository_url: String,
    pub revision: String,
    pub repository_folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerImageRequest {
    pub image_name: String,
    pub image_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerImage {
    pub image_name: String,
    pub image_version: String,
    pub image_url: String,
}

/// Every event this crate knows how to build, relay or receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum Event {
    StagedChangesCommitted(CommittedChanges),
    CommittedChangesPushed(CommitReference),
    CommittedChangesTagged(CommitReference),
    TagPushed(PushedTag),
    ArtifactChangesCommitted(CommittedChanges),
    ArtifactCommitPushed(CommitReference),
    ArtifactCommitTagged(CommitReference),
    DockerImageRequested(DockerImageRequest),
    DockerImageAvailable(DockerImage),
    DockerImagePushed(DockerImage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    StagedChangesCommitted,
    CommittedChangesPushed,
    CommittedChangesTagged,
    TagPushed,
    ArtifactChangesCommitted,
    ArtifactCommitPushed,
    ArtifactCommitTagged,
    DockerImageRequested,
    DockerImageAvailable,
    DockerImagePushed,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::StagedChangesCommitted,
        EventKind::CommittedChangesPushed,
        EventKind::CommittedChangesTagged,
        EventKind::TagPushed,
        EventKind::ArtifactChangesCommitted,
        EventKind::ArtifactCommitPushed,
        EventKind::ArtifactCommitTagged,
        EventKind::DockerImageRequested,
        EventKind::DockerImageAvailable,
        EventKind::DockerImagePushed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::StagedChangesCommitted => "StagedChangesCommitted",
            EventKind::CommittedChangesPushed => "CommittedChangesPushed",
            EventKind::CommittedChangesTagged => "CommittedChangesTagged",
            EventKind::TagPushed => "TagPushed",
            EventKind::ArtifactChangesCommitted => "ArtifactChangesCommitted",
            EventKind::ArtifactCommitPushed => "ArtifactCommitPushed",
            EventKind::ArtifactCommitTagged => "ArtifactCommitTagged",
            EventKind::DockerImageRequested => "DockerImageRequested",
            EventKind::DockerImageAvailable => "DockerImageAvailable",
            EventKind::DockerImagePushed => "DockerImagePushed",
        }
    }

    /// The name prefixed with the catalog it belongs to: artifact events
    /// and artifact-changes events are published by different parties.
    pub fn qualified_name(&self) -> String {
        let catalog = match self {
            EventKind::ArtifactChangesCommitted
            | EventKind::ArtifactCommitPushed
            | EventKind::ArtifactCommitTagged => "gitevent.artifact_changes",
            _ => "gitevent.artifact",
        };
        format!("{}.{}", catalog, self.name())
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::StagedChangesCommitted(_) => EventKind::StagedChangesCommitted,
            Event::CommittedChangesPushed(_) => EventKind::CommittedChangesPushed,
            Event::CommittedChangesTagged(_) => EventKind::CommittedChangesTagged,
            Event::TagPushed(_) => EventKind::TagPushed,
            Event::ArtifactChangesCommitted(_) => EventKind::ArtifactChangesCommitted,
            Event::ArtifactCommitPushed(_) => EventKind::ArtifactCommitPushed,
            Event::ArtifactCommitTagged(_) => EventKind::ArtifactCommitTagged,
            Event::DockerImageRequested(_) => EventKind::DockerImageRequested,
            Event::DockerImageAvailable(_) => EventKind::DockerImageAvailable,
            Event::DockerImagePushed(_) => EventKind::DockerImagePushed,
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.kind())?;
        match self {
            Event::StagedChangesCommitted(c) | Event::ArtifactChangesCommitted(c) => {
                write!(f, "{} ({}): {}", c.commit, c.message.trim(), c.change)
            }
            Event::CommittedChangesPushed(r)
            | Event::CommittedChangesTagged(r)
            | Event::ArtifactCommitPushed(r)
            | Event::ArtifactCommitTagged(r) => {
                write!(f, "{}@{}", r.repository_url, r.revision)?;
                if let Some(tag) = &r.tag {
                    write!(f, " tag {}", tag)?;
                }
                write!(f, " in {}", r.repository_folder)
            }
            Event::TagPushed(t) => write!(
                f,
                "tag {} on {} at {}@{} in {}",
                t.tag, t.commit, t.repository_url, t.revision, t.repository_folder
            ),
            Event::DockerImageRequested(i) => write!(f, "{}:{}", i.image_name, i.image_version),
            Event::DockerImageAvailable(i) | Event::DockerImagePushed(i) => {
                write!(f, "{}:{} at {}", i.image_name, i.image_version, i.image_url)
            }
        }
    }
}
