//! Filter list retrieval
//!
//! [`ListFetcher`] is the seam between the engine and the outside world.
//! [`HttpFetcher`] is the production implementation; hosts and tests can
//! supply their own.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{FetchConfig, FilterListSource, SourceLocation};
use crate::error::{ConfigError, SourceFetchError};

const RETRY_DELAY: Duration = Duration::from_secs(1);

#[async_trait]
pub trait ListFetcher: Send + Sync {
    /// Retrieve the raw text of one filter list.
    async fn fetch(&self, source: &FilterListSource) -> Result<String, SourceFetchError>;
}

/// Fetches `url` sources over HTTP(S), reads `file` sources from disk and
/// passes `inline` sources through.
pub struct HttpFetcher {
    client: reqwest::Client,
    retries: u32,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Self {
            client,
            retries: config.retries,
        })
    }

    async fn fetch_url(&self, id: &str, url: &str) -> Result<String, SourceFetchError> {
        let mut attempt = 0;
        loop {
            match self.get_once(id, url).await {
                Ok(text) => return Ok(text),
                Err(err) if attempt < self.retries && is_transient(&err) => {
                    attempt += 1;
                    log::warn!(
                        "Fetching '{}' failed, retrying (attempt {}/{}): {}",
                        id,
                        attempt,
                        self.retries,
                        err
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_once(&self, id: &str, url: &str) -> Result<String, SourceFetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(id, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceFetchError::Status {
                id: id.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| request_error(id, e))
    }
}

#[async_trait]
impl ListFetcher for HttpFetcher {
    async fn fetch(&self, source: &FilterListSource) -> Result<String, SourceFetchError> {
        match &source.location {
            SourceLocation::Url(url) => self.fetch_url(&source.id, url).await,
            SourceLocation::File(path) => read_file(&source.id, path).await,
            SourceLocation::Inline(text) => Ok(text.clone()),
        }
    }
}

async fn read_file(id: &str, path: &Path) -> Result<String, SourceFetchError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceFetchError::Io {
            id: id.to_string(),
            path: path.to_path_buf(),
            source,
        })
}

fn request_error(id: &str, err: reqwest::Error) -> SourceFetchError {
    if err.is_timeout() {
        SourceFetchError::Timeout { id: id.to_string() }
    } else {
        SourceFetchError::Request {
            id: id.to_string(),
            source: err,
        }
    }
}

/// Status errors are final; connection problems and timeouts may recover.
fn is_transient(err: &SourceFetchError) -> bool {
    matches!(
        err,
        SourceFetchError::Request { .. } | SourceFetchError::Timeout { .. }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    fn fetcher() -> HttpFetcher {
        fetcher_with_retries(0)
    }

    fn fetcher_with_retries(retries: u32) -> HttpFetcher {
        HttpFetcher::new(&FetchConfig {
            timeout_secs: 2,
            retries,
            ..FetchConfig::default()
        })
        .expect("client should build")
    }

    /// Answers every connection with `status` and counts the requests served.
    async fn status_server(status: u16) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("listener has an address");
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {} Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    status
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}/list.txt", addr), hits)
    }

    #[tokio::test]
    async fn test_inline_source() {
        let text = fetcher()
            .fetch(&FilterListSource::inline("user", "##.ad"))
            .await
            .expect("inline sources always succeed");
        assert_eq!(text, "##.ad");
    }

    #[tokio::test]
    async fn test_file_source() {
        let path = std::env::temp_dir().join(format!("ps-fetch-{}.txt", std::process::id()));
        std::fs::write(&path, "||ads.example.com^\n").expect("temp file should be writable");

        let text = fetcher()
            .fetch(&FilterListSource::file("local", &path))
            .await
            .expect("file should be readable");
        assert_eq!(text, "||ads.example.com^\n");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = fetcher()
            .fetch(&FilterListSource::file("missing", "/nonexistent/list.txt"))
            .await
            .expect_err("missing file should fail");
        assert!(matches!(err, SourceFetchError::Io { .. }));
        assert_eq!(err.source_id(), "missing");
    }

    #[tokio::test]
    async fn test_unreachable_url() {
        let err = fetcher()
            .fetch(&FilterListSource::url("down", "http://127.0.0.1:9/list.txt"))
            .await
            .expect_err("closed port should fail");
        assert!(is_transient(&err));
        assert_eq!(err.source_id(), "down");
    }

    #[test]
    fn test_status_is_not_transient() {
        let err = SourceFetchError::Status {
            id: "x".to_string(),
            status: 404,
        };
        assert!(!is_transient(&err));
    }

    #[tokio::test]
    async fn test_transient_error_is_retried() {
        let start = Instant::now();
        let err = fetcher_with_retries(1)
            .fetch(&FilterListSource::url("down", "http://127.0.0.1:9/list.txt"))
            .await
            .expect_err("closed port should fail");

        assert!(is_transient(&err));
        assert!(start.elapsed() >= RETRY_DELAY);
    }

    #[tokio::test]
    async fn test_status_error_is_not_retried() {
        let (url, hits) = status_server(503).await;
        let start = Instant::now();
        let err = fetcher_with_retries(2)
            .fetch(&FilterListSource::url("flaky", url))
            .await
            .expect_err("503 should fail");

        assert!(matches!(err, SourceFetchError::Status { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < RETRY_DELAY);
    }
}
