//! Elevation checks and relaunching as administrator.

use crate::error::Result;

/// Exit code of a process that handed over to an elevated copy of itself.
pub const RELAUNCH_EXIT_CODE: i32 = 99;

/// Whether the current process may write machine-wide environment state.
#[cfg(windows)]
pub fn is_elevated() -> bool {
    use windows::Win32::UI::Shell::IsUserAnAdmin;

    // SAFETY: IsUserAnAdmin takes no arguments and only queries the token.
    unsafe { IsUserAnAdmin().as_bool() }
}

/// No machine-wide PATH store is written off Windows, so nothing needs
/// elevation there.
#[cfg(not(windows))]
pub fn is_elevated() -> bool {
    true
}

/// Start an elevated copy of the current executable with `args`.
///
/// The caller is expected to exit with [`RELAUNCH_EXIT_CODE`] afterwards.
#[cfg(windows)]
pub fn relaunch_elevated(args: &[String]) -> Result<()> {
    use std::os::windows::ffi::OsStrExt;
    use windows::Win32::UI::Shell::ShellExecuteW;
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;
    use windows::core::{PCWSTR, w};

    let exe = std::env::current_exe()?;
    let exe_wide: Vec<u16> = exe
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();
    let params_wide: Vec<u16> = quote_args(args)
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();

    // SAFETY: both buffers are NUL-terminated and outlive the call.
    let instance = unsafe {
        ShellExecuteW(
            None,
            w!("runas"),
            PCWSTR::from_raw(exe_wide.as_ptr()),
            PCWSTR::from_raw(params_wide.as_ptr()),
            PCWSTR::null(),
            SW_SHOWNORMAL,
        )
    };

    // ShellExecuteW reports success with a value greater than 32.
    if instance.0 as isize <= 32 {
        return Err(crate::Error::Io(std::io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(not(windows))]
pub fn relaunch_elevated(_args: &[String]) -> Result<()> {
    Err(crate::Error::Unsupported(
        "relaunching as administrator (use sudo instead)",
    ))
}

/// Join arguments into one command line, quoting the ones that need it.
pub fn quote_args(args: &[String]) -> String {
    args.iter()
        .map(|arg| {
            if !arg.is_empty() && !arg.contains([' ', '\t', '"']) {
                arg.clone()
            } else {
                format!("\"{}\"", arg.replace('"', "\\\""))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_args() {
        let args = vec![
            "default".to_string(),
            "C:\\Program Files\\Python311\\python.exe".to_string(),
            String::new(),
        ];
        assert_eq!(
            quote_args(&args),
            "default \"C:\\Program Files\\Python311\\python.exe\" \"\""
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn test_relaunch_unsupported_off_windows() {
        assert!(is_elevated());
        assert!(matches!(
            relaunch_elevated(&[]),
            Err(crate::Error::Unsupported(_))
        ));
    }
}
