//! Access to the OS-level persistent PATH of each scope.
//!
//! The engine only sees [`PathRegistry`]. [`system_registry`] picks the
//! platform implementation once at startup: the Windows registry, or
//! [`UnsupportedRegistry`] where no persistent PATH store exists.

use crate::error::{Error, Result};
use crate::scope::Scope;
use pymate_platform::env::PATH_SEPARATOR;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub trait PathRegistry {
    /// Raw persistent PATH value for `scope`; empty when the value is unset.
    fn read(&self, scope: Scope) -> Result<String>;

    /// Replace the persistent PATH value for `scope`.
    fn write(&self, scope: Scope, value: &str) -> Result<()>;

    /// Tell running processes that the environment changed.
    fn broadcast(&self) -> Result<()> {
        Ok(())
    }

    fn separator(&self) -> char {
        PATH_SEPARATOR
    }
}

/// The registry for the current platform.
pub fn system_registry() -> Box<dyn PathRegistry> {
    #[cfg(windows)]
    {
        Box::new(windows_impl::WindowsRegistry)
    }
    #[cfg(not(windows))]
    {
        Box::new(UnsupportedRegistry)
    }
}

/// Stand-in for platforms without a persistent PATH store; every access is
/// [`Error::RegistryUnavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedRegistry;

impl UnsupportedRegistry {
    fn unavailable(scope: Scope) -> Error {
        Error::RegistryUnavailable {
            scope,
            reason: "persistent PATH changes are only supported on Windows; \
                     edit your shell profile instead"
                .into(),
        }
    }
}

impl PathRegistry for UnsupportedRegistry {
    fn read(&self, scope: Scope) -> Result<String> {
        Err(Self::unavailable(scope))
    }

    fn write(&self, scope: Scope, _value: &str) -> Result<()> {
        Err(Self::unavailable(scope))
    }
}

/// In-memory PATH store with fault injection.
#[derive(Debug)]
pub struct MemoryRegistry {
    sep: char,
    values: RefCell<HashMap<Scope, String>>,
    fail_writes: Cell<bool>,
    fail_broadcast: Cell<bool>,
    denied: RefCell<Vec<Scope>>,
    writes: Cell<usize>,
    broadcasts: Cell<usize>,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new(PATH_SEPARATOR)
    }
}

impl MemoryRegistry {
    pub fn new(sep: char) -> Self {
        Self {
            sep,
            values: RefCell::new(HashMap::new()),
            fail_writes: Cell::new(false),
            fail_broadcast: Cell::new(false),
            denied: RefCell::new(Vec::new()),
            writes: Cell::new(0),
            broadcasts: Cell::new(0),
        }
    }

    pub fn with_value(self, scope: Scope, value: impl Into<String>) -> Self {
        self.set_value(scope, value);
        self
    }

    /// Simulate a manual edit of the stored value.
    pub fn set_value(&self, scope: Scope, value: impl Into<String>) {
        self.values.borrow_mut().insert(scope, value.into());
    }

    pub fn value(&self, scope: Scope) -> Option<String> {
        self.values.borrow().get(&scope).cloned()
    }

    /// Make every write fail with an I/O error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn fail_broadcast(&self, fail: bool) {
        self.fail_broadcast.set(fail);
    }

    /// Make writes to `scope` fail with [`Error::PrivilegeRequired`].
    pub fn deny_scope(&self, scope: Scope) {
        self.denied.borrow_mut().push(scope);
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn broadcasts(&self) -> usize {
        self.broadcasts.get()
    }
}

impl PathRegistry for MemoryRegistry {
    fn read(&self, scope: Scope) -> Result<String> {
        Ok(self.value(scope).unwrap_or_default())
    }

    fn write(&self, scope: Scope, value: &str) -> Result<()> {
        if self.denied.borrow().contains(&scope) {
            return Err(Error::PrivilegeRequired { scope });
        }
        if self.fail_writes.get() {
            return Err(Error::io(
                format!("memory:{scope}"),
                std::io::Error::other("injected write failure"),
            ));
        }
        self.set_value(scope, value);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn broadcast(&self) -> Result<()> {
        self.broadcasts.set(self.broadcasts.get() + 1);
        if self.fail_broadcast.get() {
            return Err(Error::io(
                "memory:broadcast",
                std::io::Error::other("injected broadcast failure"),
            ));
        }
        Ok(())
    }

    fn separator(&self) -> char {
        self.sep
    }
}

#[cfg(windows)]
pub use windows_impl::WindowsRegistry;

#[cfg(windows)]
mod windows_impl {
    use super::PathRegistry;
    use crate::error::{Error, Result};
    use crate::scope::Scope;
    use windows::Win32::Foundation::{ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, WIN32_ERROR};
    use windows::Win32::System::Registry::{
        HKEY, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WRITE, REG_EXPAND_SZ,
        REG_SAM_FLAGS, REG_VALUE_TYPE, RegCloseKey, RegOpenKeyExW, RegQueryValueExW,
        RegSetValueExW,
    };
    use windows::core::{PCWSTR, w};

    const USER_KEY: PCWSTR = w!("Environment");
    const SYSTEM_KEY: PCWSTR =
        w!("SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Environment");
    const VALUE_NAME: PCWSTR = w!("Path");

    /// `HKCU\Environment` and the machine-wide Session Manager environment.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct WindowsRegistry;

    struct OpenKey(HKEY);

    impl Drop for OpenKey {
        fn drop(&mut self) {
            // SAFETY: the handle came from a successful RegOpenKeyExW.
            let _ = unsafe { RegCloseKey(self.0) };
        }
    }

    fn open(scope: Scope, access: REG_SAM_FLAGS) -> Result<OpenKey> {
        let (root, sub) = match scope {
            Scope::User => (HKEY_CURRENT_USER, USER_KEY),
            Scope::System => (HKEY_LOCAL_MACHINE, SYSTEM_KEY),
        };
        let mut key = HKEY::default();
        // SAFETY: `sub` is a static NUL-terminated string and `key` is a
        // valid out pointer.
        let status = unsafe { RegOpenKeyExW(root, sub, Some(0), access, &mut key) };
        check(scope, status)?;
        Ok(OpenKey(key))
    }

    fn check(scope: Scope, status: WIN32_ERROR) -> Result<()> {
        if status.is_ok() {
            Ok(())
        } else if status == ERROR_ACCESS_DENIED {
            Err(Error::PrivilegeRequired { scope })
        } else {
            Err(Error::RegistryUnavailable {
                scope,
                reason: windows::core::Error::from(status.to_hresult()).message(),
            })
        }
    }

    /// Value type and UTF-16 data of the PATH value, `None` when unset.
    fn query(scope: Scope, key: &OpenKey) -> Result<Option<(REG_VALUE_TYPE, Vec<u16>)>> {
        let mut kind = REG_VALUE_TYPE::default();
        let mut size = 0u32;
        // SAFETY: size query with no data buffer.
        let status = unsafe {
            RegQueryValueExW(
                key.0,
                VALUE_NAME,
                None,
                Some(&raw mut kind),
                None,
                Some(&raw mut size),
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        check(scope, status)?;

        let mut buf = vec![0u16; (size as usize).div_ceil(2)];
        // SAFETY: `buf` holds at least `size` bytes.
        let status = unsafe {
            RegQueryValueExW(
                key.0,
                VALUE_NAME,
                None,
                Some(&raw mut kind),
                Some(buf.as_mut_ptr().cast()),
                Some(&raw mut size),
            )
        };
        check(scope, status)?;

        buf.truncate(size as usize / 2);
        while buf.last() == Some(&0) {
            buf.pop();
        }
        Ok(Some((kind, buf)))
    }

    impl PathRegistry for WindowsRegistry {
        fn read(&self, scope: Scope) -> Result<String> {
            let key = open(scope, KEY_READ)?;
            Ok(query(scope, &key)?
                .map(|(_, data)| String::from_utf16_lossy(&data))
                .unwrap_or_default())
        }

        fn write(&self, scope: Scope, value: &str) -> Result<()> {
            let key = open(scope, KEY_READ | KEY_WRITE)?;
            // Keep REG_SZ if that is what the value already is.
            let kind = query(scope, &key)?
                .map(|(kind, _)| kind)
                .unwrap_or(REG_EXPAND_SZ);

            let bytes: Vec<u8> = value
                .encode_utf16()
                .chain(std::iter::once(0))
                .flat_map(u16::to_le_bytes)
                .collect();
            // SAFETY: `bytes` is a NUL-terminated UTF-16LE buffer.
            let status = unsafe { RegSetValueExW(key.0, VALUE_NAME, Some(0), kind, Some(&bytes)) };
            check(scope, status)
        }

        fn broadcast(&self) -> Result<()> {
            pymate_platform::notify::broadcast_environment_change()?;
            Ok(())
        }

        fn separator(&self) -> char {
            ';'
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_registry_roundtrip() {
        let registry = MemoryRegistry::new(':').with_value(Scope::User, "/usr/bin");
        assert_eq!(registry.read(Scope::User).unwrap(), "/usr/bin");
        assert_eq!(registry.read(Scope::System).unwrap(), "");

        registry.write(Scope::System, "/sbin").unwrap();
        assert_eq!(registry.value(Scope::System).as_deref(), Some("/sbin"));
        assert_eq!(registry.writes(), 1);
    }

    #[test]
    fn test_memory_registry_faults() {
        let registry = MemoryRegistry::new(':').with_value(Scope::User, "/usr/bin");
        registry.deny_scope(Scope::System);
        assert!(matches!(
            registry.write(Scope::System, "/x"),
            Err(Error::PrivilegeRequired {
                scope: Scope::System
            })
        ));

        registry.fail_writes(true);
        assert!(matches!(registry.write(Scope::User, "/x"), Err(Error::Io { .. })));
        assert_eq!(registry.value(Scope::User).as_deref(), Some("/usr/bin"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_system_registry_is_unsupported_off_windows() {
        let registry = system_registry();
        assert!(matches!(
            registry.read(Scope::User),
            Err(Error::RegistryUnavailable { .. })
        ));
    }
}
