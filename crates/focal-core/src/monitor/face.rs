use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use super::FaceSampler;

/// Name of the socket an external face detector connects to.
pub const FACE_SOCKET_NAME: &str = "focal-face.sock";

/// Create the face sampler for this platform.
///
/// On Unix this binds the detector feed socket under `data_dir`; platforms
/// without Unix sockets get a sampler that never reports, which keeps the
/// face rule failed open.
///
/// # Errors
///
/// Returns an error if the feed socket cannot be bound.
pub async fn create_face_sampler(data_dir: &Path) -> Result<Box<dyn FaceSampler>> {
    #[cfg(unix)]
    {
        let feed = FaceFeed::bind(&data_dir.join(FACE_SOCKET_NAME)).await?;
        Ok(Box::new(feed))
    }

    #[cfg(not(unix))]
    {
        let _ = data_dir;
        log::warn!("no face feed available on this platform; face rule stays open");
        Ok(Box::new(NullFaceSampler))
    }
}

/// Sampler that never observes anything; the face rule fails open.
pub struct NullFaceSampler;

#[async_trait]
impl FaceSampler for NullFaceSampler {
    async fn face_present(&self) -> Result<Option<bool>> {
        Ok(None)
    }
}

/// Last-value-wins feed from an external face detector.
///
/// The detector connects to a Unix socket and streams one `0`/`1` per
/// observation, newline-delimited. Only the most recent value is kept;
/// there is no queue of stale samples. Detector death simply freezes the
/// last observation, and the engine's grace period covers the staleness.
#[cfg(unix)]
pub struct FaceFeed {
    latest: tokio::sync::watch::Receiver<Option<bool>>,
}

#[cfg(unix)]
impl FaceFeed {
    /// Bind the feed socket and start accepting detector connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket path cannot be bound.
    pub async fn bind(sock_path: &Path) -> Result<Self> {
        use tokio::net::UnixListener;

        if sock_path.exists() {
            std::fs::remove_file(sock_path)?;
        }
        if let Some(parent) = sock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let listener = UnixListener::bind(sock_path)?;
        let (tx, rx) = tokio::sync::watch::channel(None);

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        log::info!("face detector connected");
                        Self::drain_connection(stream, &tx).await;
                        log::info!("face detector disconnected");
                    }
                    Err(e) => {
                        log::error!("face feed accept error: {e}");
                    }
                }
            }
        });

        Ok(Self { latest: rx })
    }

    async fn drain_connection(
        stream: tokio::net::UnixStream,
        tx: &tokio::sync::watch::Sender<Option<bool>>,
    ) {
        use tokio::io::{AsyncBufReadExt, BufReader};

        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match line.trim() {
                    "1" | "true" => {
                        tx.send_replace(Some(true));
                    }
                    "0" | "false" => {
                        tx.send_replace(Some(false));
                    }
                    "" => {}
                    other => {
                        log::warn!("face feed sent unparseable sample: {other:?}");
                    }
                },
                Ok(None) => break,
                Err(e) => {
                    log::warn!("face feed read error: {e}");
                    break;
                }
            }
        }
    }
}

#[cfg(unix)]
#[async_trait]
impl FaceSampler for FaceFeed {
    async fn face_present(&self) -> Result<Option<bool>> {
        Ok(*self.latest.borrow())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::UnixStream;

    async fn wait_for(feed: &FaceFeed, expected: Option<bool>) {
        for _ in 0..50 {
            if feed.face_present().await.unwrap() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("face feed never reported {expected:?}");
    }

    #[tokio::test]
    async fn test_feed_keeps_latest_value() {
        let dir = tempfile::tempdir().unwrap();
        let sock = dir.path().join(FACE_SOCKET_NAME);
        let feed = FaceFeed::bind(&sock).await.unwrap();

        assert_eq!(feed.face_present().await.unwrap(), None);

        let mut detector = UnixStream::connect(&sock).await.unwrap();
        detector.write_all(b"1\n0\n").await.unwrap();
        detector.flush().await.unwrap();

        // Both samples arrive; only the newest survives.
        wait_for(&feed, Some(false)).await;

        detector.write_all(b"garbage\n1\n").await.unwrap();
        detector.flush().await.unwrap();
        wait_for(&feed, Some(true)).await;
    }

    #[tokio::test]
    async fn test_null_sampler_never_reports() {
        assert_eq!(NullFaceSampler.face_present().await.unwrap(), None);
    }
}
