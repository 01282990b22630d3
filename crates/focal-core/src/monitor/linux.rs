use anyhow::Result;
use async_trait::async_trait;
use tokio::process::Command;

use super::{normalize_token, WindowSampler};

/// Linux sampler backed by `xdotool`.
///
/// Wayland compositors without an XWayland bridge will report nothing; the
/// engine treats that as a blank fail-open tick.
pub struct LinuxWindowSampler;

impl LinuxWindowSampler {
    /// Create a new Linux window sampler
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns `Result` for consistency with
    /// other platforms
    pub fn new() -> Result<Self> {
        Ok(Self)
    }
}

#[async_trait]
impl WindowSampler for LinuxWindowSampler {
    async fn current_app_token(&self) -> Result<Option<String>> {
        let output = Command::new("xdotool")
            .args(["getactivewindow", "getwindowname"])
            .output()
            .await?;

        if !output.status.success() {
            log::debug!("xdotool reported no active window");
            return Ok(None);
        }

        let title = String::from_utf8_lossy(&output.stdout);
        Ok(normalize_token(&title))
    }
}
