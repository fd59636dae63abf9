use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("command not found: {cmd}")]
    CommandNotFound { cmd: String },

    #[error("command failed: {cmd}, source: {source}")]
    CommandFailed { cmd: String, source: std::io::Error },

    #[error("command exited with {}: {cmd}", code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}")))]
    NonZeroExit { cmd: String, code: Option<i32> },

    #[error("path entry contains the separator '{sep}': {entry}")]
    InvalidPathEntry { entry: String, sep: char },

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
