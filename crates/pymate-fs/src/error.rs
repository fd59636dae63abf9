use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("path has no parent directory: {}", .0.display())]
    NoParent(PathBuf),
}

impl Error {
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Error::Read { source, .. } | Error::Write { source, .. } => Some(source.kind()),
            Error::NoParent(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
