use anyhow::Result;
use async_trait::async_trait;
use tokio::process::Command;

use super::{normalize_token, WindowSampler};

pub struct MacOsWindowSampler;

impl MacOsWindowSampler {
    /// Create a new macOS window sampler
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
impl WindowSampler for MacOsWindowSampler {
    async fn current_app_token(&self) -> Result<Option<String>> {
        // Ask System Events for the frontmost process and its window title
        // in one round trip so they refer to the same app.
        let script = r#"
            tell application "System Events"
                set frontProc to first application process whose frontmost is true
                set appName to name of frontProc
                try
                    set winTitle to name of first window of frontProc
                on error
                    set winTitle to ""
                end try
                return appName & "|" & winTitle
            end tell
        "#;

        let output = Command::new("osascript")
            .arg("-e")
            .arg(script)
            .output()
            .await?;

        if !output.status.success() {
            log::debug!("osascript frontmost lookup failed");
            return Ok(None);
        }

        let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let mut parts = raw.splitn(2, '|');
        let app_name = parts.next().unwrap_or("");
        let window_title = parts.next().unwrap_or("");

        // Window titles carry more identity than app names; fall back to the
        // app name for windowless processes.
        if let Some(token) = normalize_token(window_title) {
            return Ok(Some(token));
        }
        Ok(normalize_token(app_name))
    }
}
