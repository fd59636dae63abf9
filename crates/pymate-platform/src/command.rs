use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::process::{Command as StdCommand, Stdio};

/// Output of a child process that exited successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    /// stdout if it has content, otherwise stderr, trimmed.
    pub fn text(&self) -> &str {
        let out = self.stdout.trim();
        if out.is_empty() {
            self.stderr.trim()
        } else {
            out
        }
    }
}

#[derive(Debug)]
pub struct Command {
    inner: StdCommand,
    program: String,
}

impl Command {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        let program = program.as_ref();
        Self {
            inner: StdCommand::new(program),
            program: program.to_string_lossy().into_owned(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.inner.arg(arg);
        self
    }

    fn spawn_error(&self, e: std::io::Error) -> Error {
        if e.kind() == ErrorKind::NotFound {
            Error::CommandNotFound {
                cmd: self.program.clone(),
            }
        } else {
            Error::CommandFailed {
                cmd: self.program.clone(),
                source: e,
            }
        }
    }

    /// Run to completion with stdout/stderr captured. A non-zero exit is
    /// [`Error::NonZeroExit`].
    pub fn capture(mut self) -> Result<Captured> {
        let output = self
            .inner
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(Error::NonZeroExit {
                cmd: self.program,
                code: output.status.code(),
            });
        }

        Ok(Captured {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        let cmd = Command::new("echo").arg("hello").arg("a");
        let args: Vec<_> = cmd.inner.get_args().collect();
        assert_eq!(args, ["hello", "a"]);
        assert_eq!(cmd.program, "echo");
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let result = Command::new("pymate-definitely-missing-binary").capture();
        assert!(matches!(result, Err(Error::CommandNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_collects_output() {
        let captured = Command::new("sh")
            .arg("-c")
            .arg("echo out; echo err >&2")
            .capture()
            .unwrap();
        assert_eq!(captured.stdout.trim(), "out");
        assert_eq!(captured.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_reports_non_zero_exit() {
        let result = Command::new("sh").arg("-c").arg("exit 4").capture();
        assert!(matches!(result, Err(Error::NonZeroExit { code: Some(4), .. })));
    }

    #[test]
    fn test_captured_text_falls_back_to_stderr() {
        let captured = Captured {
            stdout: "  \n".into(),
            stderr: "Python 2.7.18\n".into(),
        };
        assert_eq!(captured.text(), "Python 2.7.18");
    }
}
