use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use reqwest::Client;

use crate::log::RunLog;
use crate::{log_error, Error, Result, Settings};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// Something that can GET a page body. Any `Err` counts as a failed attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String>;
}

/// Waiting between attempts and between pages.
#[async_trait]
pub trait Sleep: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleep;

#[async_trait]
impl Sleep for TokioSleep {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// `reqwest` transport that looks like a desktop browser.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    /// Requests a page and returns the HTML. 4xx and 5xx are errors.
    async fn get(&self, url: &str) -> Result<String> {
        let res = self.client.get(url).send().await?.error_for_status()?;
        let html = res.text().await?;
        Ok(html)
    }
}

/// GET with a fixed number of attempts and a fixed pause after each failed one
/// (except the last). No backoff, no jitter: a 404 is retried exactly like a timeout.
pub struct Fetcher<T = HttpTransport, S = TokioSleep> {
    transport: T,
    sleep: S,
    max_attempts: usize,
    retry_delay: Duration,
    log: Arc<RunLog>,
}

impl Fetcher {
    /// Production fetcher: `reqwest` transport, tokio timer.
    pub fn from_settings(settings: &Settings, log: Arc<RunLog>) -> Result<Self> {
        Ok(Self::new(
            HttpTransport::new(settings.request_timeout)?,
            TokioSleep,
            settings,
            log,
        ))
    }
}

impl<T: Transport, S: Sleep> Fetcher<T, S> {
    pub fn new(transport: T, sleep: S, settings: &Settings, log: Arc<RunLog>) -> Self {
        Self {
            transport,
            sleep,
            max_attempts: settings.max_attempts.max(1),
            retry_delay: settings.retry_delay,
            log,
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        let mut attempt = 1;
        loop {
            match self.transport.get(url).await {
                Ok(html) => return Ok(html),
                Err(e) => {
                    log_error!(
                        self.log,
                        "Error on attempt {attempt}/{}: {e}",
                        self.max_attempts
                    );
                    if attempt >= self.max_attempts {
                        return Err(Error::Fetch {
                            url: url.into(),
                            attempts: attempt,
                            source: Box::new(e),
                        });
                    }
                    self.sleep.sleep(self.retry_delay).await;
                    attempt += 1;
                }
            }
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The fetcher's timer, shared with the pipeline for the pause between pages.
    pub fn sleeper(&self) -> &S {
        &self.sleep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<VecDeque<Result<String>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn get(&self, _url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Extraction("script exhausted".into())))
        }
    }

    #[derive(Default)]
    struct CountingSleep {
        count: AtomicUsize,
        total: Mutex<Duration>,
    }

    #[async_trait]
    impl Sleep for CountingSleep {
        async fn sleep(&self, duration: Duration) {
            self.count.fetch_add(1, Ordering::SeqCst);
            *self.total.lock().unwrap() += duration;
        }
    }

    fn failure() -> Result<String> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "timed out",
        )))
    }

    #[tokio::test]
    async fn first_attempt_success_never_sleeps() {
        let log = Arc::new(RunLog::silent());
        let fetcher = Fetcher::new(
            Scripted::new(vec![Ok("<html/>".into())]),
            CountingSleep::default(),
            &Settings::default(),
            log,
        );

        assert_eq!(fetcher.fetch("http://x").await.unwrap(), "<html/>");
        assert_eq!(fetcher.transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fetcher.sleep.count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn two_failures_then_success() {
        let log = Arc::new(RunLog::silent());
        let fetcher = Fetcher::new(
            Scripted::new(vec![failure(), failure(), Ok("ok".into())]),
            CountingSleep::default(),
            &Settings::default(),
            log,
        );

        assert_eq!(fetcher.fetch("http://x").await.unwrap(), "ok");
        assert_eq!(fetcher.transport.calls.load(Ordering::SeqCst), 3);
        assert_eq!(fetcher.sleep.count.load(Ordering::SeqCst), 2);
        assert_eq!(*fetcher.sleep.total.lock().unwrap(), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn three_failures_give_up_without_trailing_sleep() {
        let log = Arc::new(RunLog::silent());
        let fetcher = Fetcher::new(
            Scripted::new(vec![failure(), failure(), failure(), Ok("late".into())]),
            CountingSleep::default(),
            &Settings::default(),
            log,
        );

        let err = fetcher.fetch("http://x/page").await.unwrap_err();
        match err {
            Error::Fetch { url, attempts, .. } => {
                assert_eq!(url, "http://x/page");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fetcher.transport.calls.load(Ordering::SeqCst), 3);
        assert_eq!(fetcher.sleep.count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn attempts_are_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fetch.log");
        let log = Arc::new(RunLog::file_only(&path).unwrap());
        let fetcher = Fetcher::new(
            Scripted::new(vec![failure(), Ok("ok".into())]),
            CountingSleep::default(),
            &Settings::default(),
            log,
        );

        fetcher.fetch("http://x").await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("ERROR - Error on attempt 1/3: "));
        assert!(!content.contains("attempt 2/3"));
    }
}
