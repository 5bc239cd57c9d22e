//! Hands the rendered PNG to the host's image viewer.

use std::path::Path;
use std::process::Command;

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}

/// Opens `path` with the platform's default viewer. Failure only logs a
/// warning; the file has already been saved.
pub fn open_in_viewer(path: &Path) {
    match viewer_command(path).status() {
        Ok(status) if status.success() => {
            log::debug!("Opened {} in the system viewer", path.display());
        }
        Ok(status) => {
            log::warn!(
                "Image viewer exited with {status}; the map is saved at {}",
                path.display()
            );
        }
        Err(e) => {
            log::warn!(
                "Could not launch an image viewer ({e}); the map is saved at {}",
                path.display()
            );
        }
    }
}
