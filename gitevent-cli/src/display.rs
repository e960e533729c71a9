use async_trait::async_trait;
use colored::Colorize;
use gitevent_core::{Change, ChangeType, Event, EventSink};
use std::fmt::Write;

const MAX_FILES: usize = 10;

/// Prints events on stdout instead of sending them anywhere. Used for
/// `--dry-run` and for what `--listen` receives.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSink for ConsoleSink {
    async fn accept(&self, event: Event) -> gitevent_core::Result<()> {
        let json = event.to_json()?;
        print!("{}", render(&event));
        println!("  {}: {}", "JSON".bold(), json.dimmed());
        println!();
        Ok(())
    }
}

pub fn render(event: &Event) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", event.kind().qualified_name().bold().cyan());

    match event {
        Event::StagedChangesCommitted(c) | Event::ArtifactChangesCommitted(c) => {
            field(&mut out, "Commit", &c.commit);
            field(&mut out, "Message", c.message.trim());
            field(&mut out, "Repository", &c.change.repository_url);
            field(&mut out, "Revision", &c.change.revision);
            field(&mut out, "Folder", &c.change.repository_folder);
            files(&mut out, &c.change);
        }
        Event::CommittedChangesPushed(r)
        | Event::CommittedChangesTagged(r)
        | Event::ArtifactCommitPushed(r)
        | Event::ArtifactCommitTagged(r) => {
            if let Some(tag) = &r.tag {
                field(&mut out, "Tag", tag);
            }
            field(&mut out, "Repository", &r.repository_url);
            field(&mut out, "Revision", &r.revision);
            field(&mut out, "Folder", &r.repository_folder);
        }
        Event::TagPushed(t) => {
            field(&mut out, "Tag", &t.tag);
            field(&mut out, "Commit", &t.commit);
            field(&mut out, "Repository", &t.repository_url);
            field(&mut out, "Revision", &t.revision);
            field(&mut out, "Folder", &t.repository_folder);
        }
        Event::DockerImageRequested(r) => {
            field(&mut out, "Image", &format!("{}:{}", r.image_name, r.image_version));
        }
        Event::DockerImageAvailable(i) | Event::DockerImagePushed(i) => {
            field(&mut out, "Image", &format!("{}:{}", i.image_name, i.image_version));
            field(&mut out, "URL", &i.image_url);
        }
    }

    out
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {}: {}", label.bold(), value);
}

fn files(out: &mut String, change: &Change) {
    if change.is_empty() {
        let _ = writeln!(out, "  {}", "No file changes".green());
        return;
    }

    let _ = writeln!(
        out,
        "  {} {} {}",
        "Files:".bold(),
        format!("+{}", change.additions()).green(),
        format!("-{}", change.deletions()).red()
    );
    for file in change.files.iter().take(MAX_FILES) {
        let icon = match file.change_type() {
            ChangeType::Create => "+".green(),
            ChangeType::Modify => "~".yellow(),
            ChangeType::Delete => "-".red(),
            ChangeType::Rename => "→".blue(),
        };
        let _ = writeln!(out, "    {} {}", icon, file.path());
    }
    if change.files.len() > MAX_FILES {
        let _ = writeln!(
            out,
            "    {} and {} more...",
            "...".dimmed(),
            (change.files.len() - MAX_FILES).to_string().yellow()
        );
    }
}
