pub mod committed;
pub mod pushed;
pub mod tag_pushed;
pub mod tagged;

#[cfg(test)]
mod testing;

use clap::ValueEnum;
use gitevent_core::{
    Change, CommitReference, CommittedChanges, Event, EventSink, RepositoryReader,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const REPOSITORY_FOLDER_MANDATORY: &str = "-r|--repository-folder is mandatory";
pub const TAG_MANDATORY: &str = "-t|--tag is mandatory";

#[derive(Debug, Error)]
pub enum CommandError {
    /// A flag the handler needs was not given.
    #[error("{0}")]
    Usage(&'static str),

    #[error(transparent)]
    Collaborator(#[from] gitevent_core::Error),
}

impl CommandError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Usage(_) => 1,
            CommandError::Collaborator(_) => 2,
        }
    }
}

/// The events that can be sent from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventName {
    #[value(name = "StagedChangesCommitted")]
    StagedChangesCommitted,
    #[value(name = "CommittedChangesPushed")]
    CommittedChangesPushed,
    #[value(name = "CommittedChangesTagged")]
    CommittedChangesTagged,
    #[value(name = "TagPushed")]
    TagPushed,
    #[value(name = "ArtifactChangesCommitted")]
    ArtifactChangesCommitted,
    #[value(name = "ArtifactCommitPushed")]
    ArtifactCommitPushed,
    #[value(name = "ArtifactCommitTagged")]
    ArtifactCommitTagged,
}

impl EventName {
    /// The handler name: the event name in snake case.
    pub fn handler_id(&self) -> &'static str {
        match self {
            EventName::StagedChangesCommitted => "staged_changes_committed",
            EventName::CommittedChangesPushed => "committed_changes_pushed",
            EventName::CommittedChangesTagged => "committed_changes_tagged",
            EventName::TagPushed => "tag_pushed",
            EventName::ArtifactChangesCommitted => "artifact_changes_committed",
            EventName::ArtifactCommitPushed => "artifact_commit_pushed",
            EventName::ArtifactCommitTagged => "artifact_commit_tagged",
        }
    }
}

/// The flags every handler reads. Both are optional at parse time; each
/// handler decides what it requires.
#[derive(Debug, Clone, Default)]
pub struct EventArgs {
    pub repository_folder: Option<PathBuf>,
    pub tag: Option<String>,
}

impl EventArgs {
    fn repository_folder(&self) -> Result<&Path, CommandError> {
        self.repository_folder
            .as_deref()
            .filter(|folder| !folder.as_os_str().is_empty())
            .ok_or(CommandError::Usage(REPOSITORY_FOLDER_MANDATORY))
    }

    fn tag(&self) -> Option<String> {
        self.tag.clone().filter(|tag| !tag.is_empty())
    }

    fn required_tag(&self) -> Result<String, CommandError> {
        self.tag().ok_or(CommandError::Usage(TAG_MANDATORY))
    }
}

/// Runs the handler of the given event. Without an event there is nothing to
/// do: hosts call this port whether or not they have something to send.
pub async fn dispatch(
    event: Option<EventName>,
    args: &EventArgs,
    reader: &dyn RepositoryReader,
    sink: &dyn EventSink,
) -> Result<(), CommandError> {
    let Some(event) = event else {
        debug!("No event requested");
        return Ok(());
    };

    debug!("Dispatching to the {} handler", event.handler_id());
    match event {
        EventName::StagedChangesCommitted => {
            committed::staged_changes_committed(sink, reader, args).await
        }
        EventName::CommittedChangesPushed => {
            pushed::committed_changes_pushed(sink, reader, args).await
        }
        EventName::CommittedChangesTagged => {
            tagged::committed_changes_tagged(sink, reader, args).await
        }
        EventName::TagPushed => tag_pushed::tag_pushed(sink, reader, args).await,
        EventName::ArtifactChangesCommitted => {
            committed::artifact_changes_committed(sink, reader, args).await
        }
        EventName::ArtifactCommitPushed => pushed::artifact_commit_pushed(sink, reader, args).await,
        EventName::ArtifactCommitTagged => tagged::artifact_commit_tagged(sink, reader, args).await,
    }
}

/// The last commit of the repository and the change it introduced, both
/// taken from the same commit.
async fn committed_changes(
    reader: &dyn RepositoryReader,
    args: &EventArgs,
) -> Result<CommittedChanges, CommandError> {
    let folder = args.repository_folder()?;
    let snapshot = reader.snapshot(folder).await?;
    let change = Change::from_unified_diff(
        &snapshot.commit.diff,
        snapshot.repository.url,
        snapshot.repository.revision,
        folder.display().to_string(),
    )?;

    Ok(CommittedChanges {
        message: snapshot.commit.message,
        change,
        commit: snapshot.commit.hash,
    })
}

async fn commit_reference(
    reader: &dyn RepositoryReader,
    args: &EventArgs,
) -> Result<CommitReference, CommandError> {
    let folder = args.repository_folder()?;
    let repository = reader.open(folder).await?;

    Ok(CommitReference {
        tag: args.tag(),
        repository_url: repository.url,
        revision: repository.revision,
        repository_folder: repository.folder,
    })
}

async fn send(sink: &dyn EventSink, event: Event) -> Result<(), CommandError> {
    debug!("{}", event);
    sink.accept(event).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::testing::{RecordingSink, StubReader};
    use super::*;
    use gitevent_core::EventKind;

    fn args(folder: &str) -> EventArgs {
        EventArgs {
            repository_folder: Some(PathBuf::from(folder)),
            tag: Some("v1.0.0".to_string()),
        }
    }

    #[tokio::test]
    async fn test_no_event_is_a_no_op() {
        let reader = StubReader::default();
        let sink = RecordingSink::default();

        dispatch(None, &args("/repo"), &reader, &sink).await.unwrap();

        assert!(sink.events().is_empty());
        assert_eq!(reader.calls(), 0);
    }

    #[tokio::test]
    async fn test_every_event_name_reaches_its_handler() {
        let expected = [
            (EventName::StagedChangesCommitted, EventKind::StagedChangesCommitted),
            (EventName::CommittedChangesPushed, EventKind::CommittedChangesPushed),
            (EventName::CommittedChangesTagged, EventKind::CommittedChangesTagged),
            (EventName::TagPushed, EventKind::TagPushed),
            (EventName::ArtifactChangesCommitted, EventKind::ArtifactChangesCommitted),
            (EventName::ArtifactCommitPushed, EventKind::ArtifactCommitPushed),
            (EventName::ArtifactCommitTagged, EventKind::ArtifactCommitTagged),
        ];

        for (name, kind) in expected {
            let sink = RecordingSink::default();

            dispatch(Some(name), &args("/repo"), &StubReader::default(), &sink)
                .await
                .unwrap();

            let events = sink.events();
            assert_eq!(events.len(), 1, "{:?}", name);
            assert_eq!(events[0].kind(), kind);
        }
    }

    #[tokio::test]
    async fn test_every_handler_requires_a_folder() {
        for name in EventName::value_variants() {
            let reader = StubReader::default();
            let sink = RecordingSink::default();
            let args = EventArgs {
                repository_folder: Some(PathBuf::new()),
                tag: Some("v1".to_string()),
            };

            let error = dispatch(Some(*name), &args, &reader, &sink)
                .await
                .unwrap_err();

            assert!(
                matches!(error, CommandError::Usage(REPOSITORY_FOLDER_MANDATORY)),
                "{:?}",
                name
            );
            assert_eq!(error.exit_code(), 1);
            assert!(sink.events().is_empty());
            assert_eq!(reader.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_collaborator_failure_sends_nothing() {
        let reader = StubReader::failing();
        let sink = RecordingSink::default();

        let error = dispatch(
            Some(EventName::StagedChangesCommitted),
            &args("/repo"),
            &reader,
            &sink,
        )
        .await
        .unwrap_err();

        assert!(matches!(error, CommandError::Collaborator(_)));
        assert_ne!(error.exit_code(), 0);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_handler_ids_are_snake_case_names() {
        for name in EventName::value_variants() {
            let value = name.to_possible_value().unwrap();
            let snake: String = value
                .get_name()
                .chars()
                .enumerate()
                .flat_map(|(i, c)| {
                    let lower = c.to_ascii_lowercase();
                    if c.is_ascii_uppercase() && i > 0 {
                        vec!['_', lower]
                    } else {
                        vec![lower]
                    }
                })
                .collect();

            assert_eq!(name.handler_id(), snake);
        }
    }
}
