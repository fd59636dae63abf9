//! Whole-file replacement: content goes to a sibling temp file which is then
//! renamed over the target, so readers see either the old or the new file.

mod error;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

#[cfg(unix)]
const DEFAULT_PERMISSIONS: u32 = 0o644;

#[cfg(unix)]
const EXECUTABLE_PERMISSIONS: u32 = 0o755;

#[derive(Clone, Copy, Debug)]
pub struct AtomicWriteOptions {
    #[cfg(unix)]
    permissions: u32,
    create_parent: bool,
}

impl Default for AtomicWriteOptions {
    fn default() -> Self { Self::new() }
}

impl AtomicWriteOptions {
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            permissions: DEFAULT_PERMISSIONS,
            create_parent: true,
        }
    }

    /// Mark the written file executable (no-op off Unix).
    pub fn executable(self) -> Self {
        #[cfg(unix)]
        {
            self.permissions(EXECUTABLE_PERMISSIONS)
        }
        #[cfg(not(unix))]
        {
            self
        }
    }

    #[cfg(unix)]
    pub fn permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }

    #[cfg(not(unix))]
    pub fn permissions(self, _permissions: u32) -> Self { self }

    /// Create missing parent directories before writing (default `true`).
    pub fn create_parent(mut self, create_parent: bool) -> Self {
        self.create_parent = create_parent;
        self
    }

    #[cfg(unix)]
    fn into_permissions(self) -> Option<std::fs::Permissions> {
        use std::os::unix::fs::PermissionsExt;
        Some(std::fs::Permissions::from_mode(self.permissions))
    }

    #[cfg(not(unix))]
    fn into_permissions(self) -> Option<std::fs::Permissions> { None }
}

fn tmp_path_for(path: &Path, parent: &Path) -> PathBuf {
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    parent.join(format!(".{}.{}.tmp", file_name, std::process::id()))
}

pub fn atomic_write(
    path: impl AsRef<Path>,
    content: &[u8],
    options: AtomicWriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    if options.create_parent && !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let tmp_path = tmp_path_for(path, parent);
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    std::fs::write(&tmp_path, content).map_err(write_err)?;

    if let Some(perms) = options.into_permissions() {
        if let Err(e) = std::fs::set_permissions(&tmp_path, perms) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }
    }

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        write_err(e)
    })
}

pub fn atomic_read(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`atomic_read`] but a missing file is `Ok(None)`.
pub fn read_if_exists(path: impl AsRef<Path>) -> Result<Option<Vec<u8>>> {
    match atomic_read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.io_kind() == Some(std::io::ErrorKind::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}
