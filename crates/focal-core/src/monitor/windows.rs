use anyhow::Result;
use async_trait::async_trait;
use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW};

use super::{normalize_token, WindowSampler};

pub struct WindowsWindowSampler;

impl WindowsWindowSampler {
    /// Create a new Windows window sampler
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns `Result` for consistency with
    /// other platforms
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    fn foreground_window_title() -> Option<String> {
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.0 == 0 {
                return None;
            }

            let mut buffer = [0u16; 512];
            let len = GetWindowTextW(hwnd, &mut buffer);
            if len <= 0 {
                return None;
            }

            #[allow(clippy::cast_sign_loss)]
            let title = String::from_utf16_lossy(&buffer[..len as usize]);
            Some(title)
        }
    }
}

#[async_trait]
impl WindowSampler for WindowsWindowSampler {
    async fn current_app_token(&self) -> Result<Option<String>> {
        Ok(Self::foreground_window_title()
            .as_deref()
            .and_then(normalize_token))
    }
}
