use super::{send, CommandError, EventArgs};
use gitevent_core::{Event, EventSink, PushedTag, RepositoryReader};

/// Both the folder and the tag are mandatory. The folder is checked first.
pub async fn tag_pushed(
    sink: &dyn EventSink,
    reader: &dyn RepositoryReader,
    args: &EventArgs,
) -> Result<(), CommandError> {
    let folder = args.repository_folder()?;
    let tag = args.required_tag()?;

    let snapshot = reader.snapshot(folder).await?;

    let event = Event::TagPushed(PushedTag {
        tag,
        commit: snapshot.commit.hash,
        repository_url: snapshot.repository.url,
        revision: snapshot.repository.revision,
        repository_folder: folder.display().to_string(),
    });
    send(sink, event).await
}
