use super::{commit_reference, send, CommandError, EventArgs};
use gitevent_core::{Event, EventSink, RepositoryReader};

pub async fn committed_changes_pushed(
    sink: &dyn EventSink,
    reader: &dyn RepositoryReader,
    args: &EventArgs,
) -> Result<(), CommandError> {
    let reference = commit_reference(reader, args).await?;
    send(sink, Event::CommittedChangesPushed(reference)).await
}

pub async fn artifact_commit_pushed(
    sink: &dyn EventSink,
    reader: &dyn RepositoryReader,
    args: &EventArgs,
) -> Result<(), CommandError> {
    let reference = commit_reference(reader, args).await?;
    send(sink, Event::ArtifactCommitPushed(reference)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{RecordingSink, StubReader};
    use gitevent_core::CommitReference;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_committed_changes_pushed_without_tag() {
        let sink = RecordingSink::default();
        let args = EventArgs {
            repository_folder: Some(PathBuf::from("/work/demo")),
            tag: None,
        };

        committed_changes_pushed(&sink, &StubReader::default(), &args)
            .await
            .unwrap();

        assert_eq!(
            sink.events(),
            vec![Event::CommittedChangesPushed(CommitReference {
                tag: None,
                repository_url: "https://example.com/demo.git".to_string(),
                revision: "main".to_string(),
                repository_folder: "/work/demo".to_string(),
            })]
        );
    }

    #[tokio::test]
    async fn test_empty_tag_counts_as_absent() {
        let sink = RecordingSink::default();
        let args = EventArgs {
            repository_folder: Some(PathBuf::from("/work/demo")),
            tag: Some(String::new()),
        };

        artifact_commit_pushed(&sink, &StubReader::default(), &args)
            .await
            .unwrap();

        let events = sink.events();
        assert!(matches!(&events[0], Event::ArtifactCommitPushed(r) if r.tag.is_none()));
    }

    #[tokio::test]
    async fn test_reader_failure_is_reported() {
        let sink = RecordingSink::default();
        let args = EventArgs {
            repository_folder: Some(PathBuf::from("/not/a/repo")),
            tag: None,
        };

        let error = committed_changes_pushed(&sink, &StubReader::failing(), &args)
            .await
            .unwrap_err();

        assert_eq!(error.exit_code(), 2);
        assert!(sink.events().is_empty());
    }
}
