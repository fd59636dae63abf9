use crate::scope::Scope;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no Python interpreters were found")]
    DiscoveryEmpty,

    #[error("changing the {scope} PATH requires administrator rights")]
    PrivilegeRequired { scope: Scope },

    #[error("the {scope} PATH store is unavailable: {reason}")]
    RegistryUnavailable { scope: Scope, reason: String },

    #[error("I/O failure at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("state file {} is corrupt: {reason}", path.display())]
    CorruptState { path: PathBuf, reason: String },

    #[error("{command} exited with {}", code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}")))]
    ChildProcessFailure { command: String, code: Option<i32> },

    #[error("no interpreter matches '{0}'")]
    InterpreterNotFound(String),

    #[error("cannot write {text:?} into a cmd script: {reason}")]
    UnsafeScriptText { text: String, reason: &'static str },

    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    #[error(transparent)]
    Platform(pymate_platform::Error),

    #[error(transparent)]
    Fs(#[from] pymate_fs::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether retrying with elevated rights could succeed.
    pub fn needs_elevation(&self) -> bool {
        matches!(self, Error::PrivilegeRequired { .. })
    }
}

impl From<pymate_platform::Error> for Error {
    fn from(err: pymate_platform::Error) -> Self {
        match err {
            pymate_platform::Error::NonZeroExit { cmd, code } => {
                Error::ChildProcessFailure { command: cmd, code }
            }
            other => Error::Platform(other),
        }
    }
}
