use anyhow::Result;
use async_trait::async_trait;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

pub mod face;

/// Foreground-window identity source.
///
/// Implementations must not block the tick loop; slow lookups run on their
/// own execution context and the engine only consumes the produced token.
#[async_trait]
pub trait WindowSampler: Send + Sync {
    /// Lowercased identity token of the current foreground window, or
    /// `None` when no window is focused.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform lookup fails; the caller records
    /// a blank fail-open tick.
    async fn current_app_token(&self) -> Result<Option<String>>;
}

/// Face-presence source.
///
/// Detection itself is an external concern; the engine consumes the most
/// recently produced boolean (last value wins, stale samples are dropped).
#[async_trait]
pub trait FaceSampler: Send + Sync {
    /// Latest face-presence observation, `None` before the first sample.
    ///
    /// # Errors
    ///
    /// Returns an error when the feed is unavailable; the caller fails open.
    async fn face_present(&self) -> Result<Option<bool>>;
}

/// Create the platform-specific window sampler.
///
/// # Errors
///
/// Returns an error if the current platform is not supported or if sampler
/// initialization fails.
pub fn create_window_sampler() -> Result<Box<dyn WindowSampler>> {
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(macos::MacOsWindowSampler::new()?))
    }

    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(linux::LinuxWindowSampler::new()?))
    }

    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(windows::WindowsWindowSampler::new()?))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        anyhow::bail!("Unsupported platform")
    }
}

/// Normalize a raw window title into the token the engine classifies.
#[must_use]
pub fn normalize_token(raw: &str) -> Option<String> {
    let token = raw.trim().to_lowercase();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("  Inbox - Chrome  "), Some("inbox - chrome".to_string()));
        assert_eq!(normalize_token("   "), None);
        assert_eq!(normalize_token(""), None);
    }
}
