//! Telling running processes that persistent environment variables changed.

use crate::error::Result;

/// Broadcast `WM_SETTINGCHANGE("Environment")` to top-level windows so
/// Explorer and new consoles pick up the new PATH.
#[cfg(windows)]
pub fn broadcast_environment_change() -> Result<()> {
    use windows::Win32::Foundation::{LPARAM, WPARAM};
    use windows::Win32::UI::WindowsAndMessaging::{
        HWND_BROADCAST, SMTO_ABORTIFHUNG, SendMessageTimeoutW, WM_SETTINGCHANGE,
    };
    use windows::core::w;

    let mut result = 0usize;
    // SAFETY: the lParam string is a static NUL-terminated literal.
    let sent = unsafe {
        SendMessageTimeoutW(
            HWND_BROADCAST,
            WM_SETTINGCHANGE,
            WPARAM(0),
            LPARAM(w!("Environment").as_ptr() as isize),
            SMTO_ABORTIFHUNG,
            5000,
            Some(&mut result),
        )
    };

    if sent.0 == 0 {
        return Err(crate::Error::Io(std::io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(not(windows))]
pub fn broadcast_environment_change() -> Result<()> {
    tracing::debug!("environment broadcast is a no-op on this platform");
    Ok(())
}
