// History viewer platform paths
// Selects the per-OS configuration directory at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Directory name used under the OS config root.
pub const APP_DIR_NAME: &str = "history-viewer";

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/history-viewer` or `~/.config/history-viewer`
/// - **macOS**: `~/Library/Application Support/history-viewer`
/// - **Windows**: `%APPDATA%\history-viewer`
/// - anything else: `./history-viewer`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        PathBuf::from(APP_DIR_NAME)
    }
}
