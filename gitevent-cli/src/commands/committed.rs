use super::{committed_changes, send, CommandError, EventArgs};
use gitevent_core::{Event, EventSink, RepositoryReader};

pub async fn staged_changes_committed(
    sink: &dyn EventSink,
    reader: &dyn RepositoryReader,
    args: &EventArgs,
) -> Result<(), CommandError> {
    let committed = committed_changes(reader, args).await?;
    send(sink, Event::StagedChangesCommitted(committed)).await
}

pub async fn artifact_changes_committed(
    sink: &dyn EventSink,
    reader: &dyn RepositoryReader,
    args: &EventArgs,
) -> Result<(), CommandError> {
    let committed = committed_changes(reader, args).await?;
    send(sink, Event::ArtifactChangesCommitted(committed)).await
}
