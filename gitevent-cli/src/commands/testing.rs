use async_trait::async_trait;
use gitevent_core::{
    Error, Event, EventSink, HeadSnapshot, LatestCommit, RepositoryInfo, RepositoryReader,
    Result,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const DIFF: &str = "\
diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -1 +1,2 @@
 # demo
+more
";

/// Answers every query with fixed values and counts the calls. With
/// `advancing` set, every call sees a new commit, as if one landed between
/// two queries.
pub struct StubReader {
    pub url: String,
    pub revision: String,
    pub hash: String,
    pub diff: String,
    pub fail: bool,
    pub advancing: bool,
    pub calls: AtomicUsize,
}

impl Default for StubReader {
    fn default() -> Self {
        Self {
            url: "https://example.com/demo.git".to_string(),
            revision: "main".to_string(),
            hash: "9fceb02d0ae598e95dc970b74767f19372d61af8".to_string(),
            diff: DIFF.to_string(),
            fail: false,
            advancing: false,
            calls: AtomicUsize::new(0),
        }
    }
}

impl StubReader {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Suffix identifying the commit a call observes.
    fn record(&self, folder: &Path) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(Error::NotARepository(folder.display().to_string()));
        }
        if self.advancing {
            Ok(format!("-{}", call))
        } else {
            Ok(String::new())
        }
    }

    fn repository(&self, folder: &Path, commit: &str) -> RepositoryInfo {
        RepositoryInfo {
            url: self.url.clone(),
            revision: format!("{}{}", self.revision, commit),
            folder: folder.display().to_string(),
        }
    }

    fn commit(&self, commit: &str) -> LatestCommit {
        LatestCommit {
            hash: format!("{}{}", self.hash, commit),
            diff: self.diff.clone(),
            message: format!("Add more{}", commit),
        }
    }
}

#[async_trait]
impl RepositoryReader for StubReader {
    async fn open(&self, folder: &Path) -> Result<RepositoryInfo> {
        let commit = self.record(folder)?;
        Ok(self.repository(folder, &commit))
    }

    async fn committed_diff(&self, folder: &Path) -> Result<String> {
        self.record(folder)?;
        Ok(self.diff.clone())
    }

    async fn latest_commit(&self, folder: &Path) -> Result<LatestCommit> {
        let commit = self.record(folder)?;
        Ok(self.commit(&commit))
    }

    async fn snapshot(&self, folder: &Path) -> Result<HeadSnapshot> {
        let commit = self.record(folder)?;
        Ok(HeadSnapshot {
            repository: self.repository(folder, &commit),
            commit: self.commit(&commit),
        })
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn accept(&self, event: Event) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
