//! Image fetch workers
//!
//! One worker performs exactly one fetch + decode attempt and turns every
//! failure mode (HTTP status, transport, decode, timeout, panic) into a
//! [`LoadOutcome::Failed`].

use super::queue::LoadRequest;
use crate::network::NetworkStack;
use crate::utils::{NetworkError, Result, VistaError};
use async_trait::async_trait;
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use url::Url;

/// Decoded RGBA8 image
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Unpremultiplied RGBA, row major
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Decode any format supported by the `image` crate
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| NetworkError::Decode(e.to_string()))?;
        let rgba = img.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }

    /// Solid-colour image, used for placeholders and tests
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Size of the pixel buffer in bytes
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Terminal result of one load attempt
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded(Arc<DecodedImage>),
    Failed(String),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Fetches and decodes a single image
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<DecodedImage>;
}

/// Fetcher for http(s) URLs
pub struct HttpFetcher {
    network: NetworkStack,
}

impl HttpFetcher {
    pub fn new(network: NetworkStack) -> Self {
        Self { network }
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<DecodedImage> {
        let body = self.network.fetch_image(url).await?;
        decode_off_thread(body).await
    }
}

/// Fetcher for `file://` URLs and plain paths
#[derive(Debug, Default)]
pub struct FileFetcher;

#[async_trait]
impl ImageFetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<DecodedImage> {
        let bytes = tokio::fs::read(local_path(url)).await?;
        decode_off_thread(bytes).await
    }
}

/// Routes http(s) URLs to [`HttpFetcher`] and everything else to [`FileFetcher`]
pub struct DefaultFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl DefaultFetcher {
    pub fn new(network: NetworkStack) -> Self {
        Self {
            http: HttpFetcher::new(network),
            file: FileFetcher,
        }
    }
}

#[async_trait]
impl ImageFetcher for DefaultFetcher {
    async fn fetch(&self, url: &str) -> Result<DecodedImage> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.http.fetch(url).await
        } else {
            self.file.fetch(url).await
        }
    }
}

/// Filesystem path for a `file://` URL or a plain path
fn local_path(url: &str) -> PathBuf {
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "file" => parsed
            .to_file_path()
            .unwrap_or_else(|_| PathBuf::from(parsed.path())),
        _ => PathBuf::from(url),
    }
}

async fn decode_off_thread(bytes: Vec<u8>) -> Result<DecodedImage> {
    tokio::task::spawn_blocking(move || DecodedImage::from_bytes(&bytes))
        .await
        .map_err(|e| VistaError::Other(format!("decode task failed: {e}")))?
}

/// Shared flag telling workers whether their owner still exists
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the owner gone. Returns `true` on the first call.
    pub fn revoke(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Single load attempt for one admitted request
pub struct FetchWorker {
    fetcher: Arc<dyn ImageFetcher>,
    request: LoadRequest,
    timeout: Duration,
    liveness: Liveness,
}

impl FetchWorker {
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        request: LoadRequest,
        timeout: Duration,
        liveness: Liveness,
    ) -> Self {
        Self {
            fetcher,
            request,
            timeout,
            liveness,
        }
    }

    /// Run the attempt. Yields `None` when the owner went away meanwhile.
    pub async fn run(self) -> Option<(LoadRequest, LoadOutcome)> {
        let outcome = attempt(self.fetcher.as_ref(), &self.request.url, self.timeout).await;
        if !self.liveness.is_alive() {
            log::debug!("dropping result for {} after shutdown", self.request.id);
            return None;
        }
        Some((self.request, outcome))
    }
}

/// Fetch with a deadline, folding every failure into [`LoadOutcome::Failed`]
pub async fn attempt(fetcher: &dyn ImageFetcher, url: &str, timeout: Duration) -> LoadOutcome {
    let fetch = AssertUnwindSafe(fetcher.fetch(url)).catch_unwind();
    match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(Ok(image))) => LoadOutcome::Loaded(Arc::new(image)),
        Ok(Ok(Err(err))) => LoadOutcome::Failed(err.to_string()),
        Ok(Err(_)) => LoadOutcome::Failed("fetcher panicked".to_string()),
        Err(_) => LoadOutcome::Failed(NetworkError::Timeout(timeout).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Priority;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn request(url: &str) -> LoadRequest {
        LoadRequest {
            id: "img".into(),
            url: url.into(),
            priority: Priority::HIGHEST,
        }
    }

    #[test]
    fn test_decode_png() {
        let decoded = DecodedImage::from_bytes(&png_bytes()).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(&decoded.pixels[..4], &[10, 20, 30, 255]);
        assert_eq!(decoded.byte_size(), 24);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = DecodedImage::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, VistaError::Network(NetworkError::Decode(_))));
    }

    #[test]
    fn test_solid_image() {
        let img = DecodedImage::solid(2, 2, [1, 2, 3, 4]);
        assert_eq!(img.pixels, vec![1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_attempt_success() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Ok(DecodedImage::solid(1, 1, [0, 0, 0, 255])));

        let outcome = attempt(&fetcher, "https://x/a.png", Duration::from_secs(1)).await;
        assert!(outcome.is_loaded());
    }

    #[tokio::test]
    async fn test_attempt_error_becomes_failed() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Err(NetworkError::Http(500, "boom".into()).into()));

        match attempt(&fetcher, "https://x/a.png", Duration::from_secs(1)).await {
            LoadOutcome::Failed(reason) => assert!(reason.contains("500")),
            other => panic!("unexpected {other:?}"),
        }
    }

    struct Stalled;

    #[async_trait]
    impl ImageFetcher for Stalled {
        async fn fetch(&self, _url: &str) -> Result<DecodedImage> {
            futures::future::pending().await
        }
    }

    struct Panicking;

    #[async_trait]
    impl ImageFetcher for Panicking {
        async fn fetch(&self, _url: &str) -> Result<DecodedImage> {
            panic!("decoder exploded")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_times_out() {
        let outcome = attempt(&Stalled, "https://x/a.png", Duration::from_secs(5)).await;
        match outcome {
            LoadOutcome::Failed(reason) => assert!(reason.contains("timed out")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_attempt_contains_panics() {
        let outcome = attempt(&Panicking, "https://x/a.png", Duration::from_secs(1)).await;
        assert!(matches!(outcome, LoadOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_worker_silent_after_revoke() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Ok(DecodedImage::solid(1, 1, [0; 4])));
        let liveness = Liveness::new();
        let worker = FetchWorker::new(
            Arc::new(fetcher),
            request("https://x/a.png"),
            Duration::from_secs(1),
            liveness.clone(),
        );

        assert!(liveness.revoke());
        assert!(!liveness.revoke());
        assert!(worker.run().await.is_none());
    }

    #[tokio::test]
    async fn test_file_fetcher_reads_paths() {
        let path = std::env::temp_dir().join(format!("vista-worker-{}.png", std::process::id()));
        std::fs::write(&path, png_bytes()).unwrap();

        let url = Url::from_file_path(&path).unwrap().to_string();
        let decoded = FileFetcher.fetch(&url).await.unwrap();
        assert_eq!(decoded.width, 3);
        let plain = FileFetcher.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(plain.height, 2);

        std::fs::remove_file(&path).unwrap();
        assert!(FileFetcher.fetch(&url).await.is_err());
    }
}
