use crate::error::{Error, Result};
use async_trait::async_trait;
use git2::{Commit, Diff, DiffFormat, ErrorCode, Repository};
use std::path::Path;
use tracing::debug;

/// Where a repository lives and which revision it is on. The revision is
/// the id of the commit `HEAD` resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub url: String,
    pub revision: String,
    pub folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestCommit {
    pub hash: String,
    pub diff: String,
    pub message: String,
}

/// Everything read from one resolution of `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadSnapshot {
    pub repository: RepositoryInfo,
    pub commit: LatestCommit,
}

/// Reads the repository facts the event handlers need.
#[async_trait]
pub trait RepositoryReader: Send + Sync {
    async fn open(&self, folder: &Path) -> Result<RepositoryInfo>;

    /// Unified diff introduced by the commit `HEAD` points to.
    async fn committed_diff(&self, folder: &Path) -> Result<String>;

    async fn latest_commit(&self, folder: &Path) -> Result<LatestCommit>;

    /// Repository and latest commit read from a single `HEAD` lookup, so a
    /// commit landing in between cannot mix facts from two commits.
    async fn snapshot(&self, folder: &Path) -> Result<HeadSnapshot>;
}

/// [`RepositoryReader`] backed by libgit2. Each query opens the repository
/// on the blocking pool, so nothing is cached between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitReader;

impl GitReader {
    pub fn new() -> Self {
        Self
    }

    async fn with_repository<T, F>(folder: &Path, query: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Repository, &str) -> Result<T> + Send + 'static,
    {
        let folder = folder.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let display = folder.display().to_string();
            let repo = Repository::open(&folder)
                .map_err(|_| Error::NotARepository(display.clone()))?;
            query(&repo, &display)
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))?
    }
}

#[async_trait]
impl RepositoryReader for GitReader {
    async fn open(&self, folder: &Path) -> Result<RepositoryInfo> {
        Self::with_repository(folder, |repo, folder| {
            let commit = head_commit(repo, folder)?;
            let info = repository_info(repo, folder, &commit)?;
            debug!("Read repository {:?}", info);
            Ok(info)
        })
        .await
    }

    async fn committed_diff(&self, folder: &Path) -> Result<String> {
        Self::with_repository(folder, |repo, folder| {
            let commit = head_commit(repo, folder)?;
            commit_patch(repo, &commit)
        })
        .await
    }

    async fn latest_commit(&self, folder: &Path) -> Result<LatestCommit> {
        Self::with_repository(folder, |repo, folder| {
            let commit = head_commit(repo, folder)?;
            latest_commit(repo, &commit)
        })
        .await
    }

    async fn snapshot(&self, folder: &Path) -> Result<HeadSnapshot> {
        Self::with_repository(folder, |repo, folder| {
            let commit = head_commit(repo, folder)?;
            let snapshot = HeadSnapshot {
                repository: repository_info(repo, folder, &commit)?,
                commit: latest_commit(repo, &commit)?,
            };
            debug!("Read {} at {}", snapshot.repository.url, snapshot.commit.hash);
            Ok(snapshot)
        })
        .await
    }
}

fn repository_info(
    repo: &Repository,
    folder: &str,
    commit: &Commit<'_>,
) -> Result<RepositoryInfo> {
    Ok(RepositoryInfo {
        url: remote_url(repo, folder)?,
        revision: commit.id().to_string(),
        folder: folder.to_string(),
    })
}

fn latest_commit(repo: &Repository, commit: &Commit<'_>) -> Result<LatestCommit> {
    Ok(LatestCommit {
        hash: commit.id().to_string(),
        diff: commit_patch(repo, commit)?,
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
    })
}

/// The `origin` URL, or the first configured remote's when there is no `origin`.
fn remote_url(repo: &Repository, folder: &str) -> Result<String> {
    let remote = match repo.find_remote("origin") {
        Ok(remote) => remote,
        Err(_) => {
            let names = repo.remotes()?;
            let name = names
                .iter()
                .flatten()
                .next()
                .ok_or_else(|| Error::MissingRemote(folder.to_string()))?;
            repo.find_remote(name)?
        }
    };

    remote
        .url()
        .map(String::from)
        .ok_or_else(|| Error::MissingRemote(folder.to_string()))
}

fn head_commit<'r>(repo: &'r Repository, folder: &str) -> Result<Commit<'r>> {
    let head = repo.head().map_err(|e| unborn(e, folder))?;
    Ok(head.peel_to_commit()?)
}

fn unborn(error: git2::Error, folder: &str) -> Error {
    if error.code() == ErrorCode::UnbornBranch {
        Error::UnbornHead(folder.to_string())
    } else {
        Error::Git(error)
    }
}

/// Diff between the commit and its first parent; root commits diff against
/// the empty tree.
fn commit_patch(repo: &Repository, commit: &Commit<'_>) -> Result<String> {
    let tree = commit.tree()?;
    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
    render_patch(&diff)
}

fn render_patch(diff: &Diff<'_>) -> Result<String> {
    let mut patch = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if matches!(line.origin(), '+' | '-' | ' ') {
            patch.push(line.origin());
        }
        patch.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{Change, ChangeType};
    use git2::{Oid, RepositoryInitOptions, Signature};
    use tempfile::TempDir;

    const ORIGIN: &str = "https://example.com/demo.git";

    fn init_repository(dir: &TempDir) -> Repository {
        let mut options = RepositoryInitOptions::new();
        options.initial_head("main");
        Repository::init_opts(dir.path(), &options).unwrap()
    }

    fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> Oid {
        let root = repo.workdir().unwrap().to_path_buf();
        std::fs::write(root.join(name), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let signature = Signature::now("Test", "test@example.com").unwrap();
        let parents: Vec<Commit<'_>> = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parents: Vec<&Commit<'_>> = parents.iter().collect();

        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap()
    }

    fn repository_with_history() -> (TempDir, Oid) {
        let dir = TempDir::new().unwrap();
        let repo = init_repository(&dir);
        repo.remote("origin", ORIGIN).unwrap();
        commit_file(&repo, "a.txt", "one\n", "First commit");
        let oid = commit_file(&repo, "b.txt", "two\n", "Add b\n\nWith a body.\n");
        (dir, oid)
    }

    #[tokio::test]
    async fn test_open_reads_url_and_head_commit() {
        let (dir, oid) = repository_with_history();

        let info = GitReader::new().open(dir.path()).await.unwrap();

        assert_eq!(info.url, ORIGIN);
        assert_eq!(info.revision, oid.to_string());
        assert_eq!(info.folder, dir.path().display().to_string());
    }

    #[tokio::test]
    async fn test_each_commit_is_its_own_revision() {
        let (dir, first) = repository_with_history();
        let reader = GitReader::new();
        let before = reader.open(dir.path()).await.unwrap();

        let repo = Repository::open(dir.path()).unwrap();
        let second = commit_file(&repo, "c.txt", "three\n", "Add c");
        let after = reader.open(dir.path()).await.unwrap();

        assert_eq!(before.revision, first.to_string());
        assert_eq!(after.revision, second.to_string());
        assert_ne!(before.revision, after.revision);
    }

    #[tokio::test]
    async fn test_open_falls_back_to_first_remote() {
        let dir = TempDir::new().unwrap();
        let repo = init_repository(&dir);
        repo.remote("upstream", "git@example.com:demo.git").unwrap();
        commit_file(&repo, "a.txt", "one\n", "First commit");

        let info = GitReader::new().open(dir.path()).await.unwrap();

        assert_eq!(info.url, "git@example.com:demo.git");
    }

    #[tokio::test]
    async fn test_detached_head_uses_the_checked_out_commit() {
        let (dir, oid) = repository_with_history();
        let repo = Repository::open(dir.path()).unwrap();
        let parent = repo.find_commit(oid).unwrap().parent_id(0).unwrap();
        repo.set_head_detached(parent).unwrap();

        let info = GitReader::new().open(dir.path()).await.unwrap();

        assert_eq!(info.revision, parent.to_string());
    }

    #[tokio::test]
    async fn test_committed_diff_covers_only_the_last_commit() {
        let (dir, _) = repository_with_history();

        let diff = GitReader::new().committed_diff(dir.path()).await.unwrap();
        let change = Change::from_unified_diff(&diff, ORIGIN, "main", "folder").unwrap();

        assert_eq!(change.paths(), vec!["b.txt"]);
        assert_eq!(change.files[0].change_type(), ChangeType::Create);
        assert_eq!(change.files[0].hunks[0].lines[0].content, "two");
    }

    #[tokio::test]
    async fn test_root_commit_diffs_against_empty_tree() {
        let dir = TempDir::new().unwrap();
        let repo = init_repository(&dir);
        commit_file(&repo, "a.txt", "one\ntwo\n", "First commit");

        let diff = GitReader::new().committed_diff(dir.path()).await.unwrap();
        let change = Change::from_unified_diff(&diff, ORIGIN, "main", "folder").unwrap();

        assert_eq!(change.paths(), vec!["a.txt"]);
        assert_eq!(change.additions(), 2);
    }

    #[tokio::test]
    async fn test_latest_commit() {
        let (dir, oid) = repository_with_history();

        let latest = GitReader::new().latest_commit(dir.path()).await.unwrap();

        assert_eq!(latest.hash, oid.to_string());
        assert_eq!(latest.message, "Add b\n\nWith a body.\n");
        assert!(latest.diff.contains("+two"));
    }

    #[tokio::test]
    async fn test_snapshot_reads_one_commit() {
        let (dir, oid) = repository_with_history();

        let snapshot = GitReader::new().snapshot(dir.path()).await.unwrap();

        assert_eq!(snapshot.repository.url, ORIGIN);
        assert_eq!(snapshot.repository.revision, oid.to_string());
        assert_eq!(snapshot.commit.hash, oid.to_string());
        assert_eq!(snapshot.commit.message, "Add b\n\nWith a body.\n");
        assert!(snapshot.commit.diff.contains("+two"));
    }

    #[tokio::test]
    async fn test_crlf_file_survives_parsing() {
        let (dir, _) = repository_with_history();
        let repo = Repository::open(dir.path()).unwrap();
        commit_file(&repo, "dos.txt", "line\r\n", "Add a CRLF file");

        let diff = GitReader::new().committed_diff(dir.path()).await.unwrap();
        let change = Change::from_unified_diff(&diff, ORIGIN, "r", "folder").unwrap();

        assert!(diff.contains("+line\r\n"));
        assert_eq!(change.files[0].hunks[0].lines[0].content, "line\r");
        assert!(change.to_unified_diff().contains("+line\r\n"));
    }

    #[tokio::test]
    async fn test_non_ascii_file_name() {
        let (dir, _) = repository_with_history();
        let repo = Repository::open(dir.path()).unwrap();
        commit_file(&repo, "héllo.txt", "salut\n", "Add a greeting");

        let snapshot = GitReader::new().snapshot(dir.path()).await.unwrap();
        let change =
            Change::from_unified_diff(&snapshot.commit.diff, ORIGIN, "r", "folder").unwrap();

        assert_eq!(change.paths(), vec!["héllo.txt"]);
        assert_eq!(change.files[0].change_type(), ChangeType::Create);
    }

    #[tokio::test]
    async fn test_not_a_repository() {
        let dir = TempDir::new().unwrap();

        let result = GitReader::new().open(dir.path()).await;

        assert!(matches!(result, Err(Error::NotARepository(_))));
    }

    #[tokio::test]
    async fn test_unborn_head() {
        let dir = TempDir::new().unwrap();
        let repo = init_repository(&dir);
        repo.remote("origin", ORIGIN).unwrap();

        let result = GitReader::new().latest_commit(dir.path()).await;

        assert!(matches!(result, Err(Error::UnbornHead(_))));
    }

    #[tokio::test]
    async fn test_missing_remote() {
        let dir = TempDir::new().unwrap();
        let repo = init_repository(&dir);
        commit_file(&repo, "a.txt", "one\n", "First commit");

        let result = GitReader::new().open(dir.path()).await;

        assert!(matches!(result, Err(Error::MissingRemote(_))));
    }
}
