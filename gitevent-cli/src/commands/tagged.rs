use super::{commit_reference, send, CommandError, EventArgs};
use gitevent_core::{Event, EventSink, RepositoryReader};

pub async fn committed_changes_tagged(
    sink: &dyn EventSink,
    reader: &dyn RepositoryReader,
    args: &EventArgs,
) -> Result<(), CommandError> {
    let reference = commit_reference(reader, args).await?;
    send(sink, Event::CommittedChangesTagged(reference)).await
}

pub async fn artifact_commit_tagged(
    sink: &dyn EventSink,
    reader: &dyn RepositoryReader,
    args: &EventArgs,
) -> Result<(), CommandError> {
    let reference = commit_reference(reader, args).await?;
    send(sink, Event::ArtifactCommitTagged(reference)).await
}
