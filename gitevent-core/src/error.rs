use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0} is not a git repository")]
    NotARepository(String),

    #[error("Repository {0} has no remote to read a URL from")]
    MissingRemote(String),

    #[error("Repository {0} has no commits yet")]
    UnbornHead(String),

    #[error("Invalid diff: {0}")]
    InvalidDiff(String),

    #[error("Repository task failed: {0}")]
    Task(String),

    #[error("Event sink failed: {0}")]
    Sink(String),
}
