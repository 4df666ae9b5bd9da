use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, SET_COOKIE,
};
use serde::de::DeserializeOwned;
use tokio::sync::{Semaphore, SemaphorePermit};
use url::Url;

use bsc_codec::XmlCodec;

use crate::credentials::Credentials;
use crate::error::{ApiError, ClientError, ClientResult};
use crate::options::{RequestBody, RequestMethod, RequestOptions};
use crate::retry::{RetryInfo, RetryKind};

/// Default API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.opensuse.org/";

/// Default cap on concurrent in-flight requests.
///
/// The server has a limited worker pool; a client issuing unbounded
/// concurrent requests can starve it for everyone. Keep this small.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: i32 = 6;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Options for constructing a [`Connection`].
#[derive(Clone, Debug)]
pub struct ConnectionOptions {
    /// Base URL of the API. Must use `https` unless [`force_https`] is
    /// disabled.
    ///
    /// [`force_https`]: ConnectionOptions::force_https
    pub url: String,
    /// When `false`, plain `http` endpoints are accepted as well.
    pub force_https: bool,
    /// Cap on concurrent in-flight requests; zero or negative means
    /// unlimited.
    pub max_concurrent_requests: i32,
    /// Custom root certificate in PEM format for endpoints whose
    /// certificate chain is not in the system store.
    pub server_ca_certificate: Option<String>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            force_https: true,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            server_ca_certificate: None,
        }
    }
}

/// One attempt either finished the call or asked for another round.
enum AttemptOutcome {
    Done(Vec<u8>),
    Retry(RetryInfo),
}

/// Releases the admission slot on every exit path.
struct Admission<'a> {
    _permit: Option<SemaphorePermit<'a>>,
    gauge: &'a AtomicUsize,
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        self.gauge.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A connection to one build service API endpoint.
///
/// Holds the credentials, the session cookies (replaced wholesale whenever
/// a response carries `Set-Cookie`, so session-based instances do not have
/// to authenticate every request), and the admission limiter bounding
/// concurrent load on the server.
///
/// All state shared between concurrent calls (cookies, in-flight gauge) is
/// internally synchronized; a `Connection` can be shared freely behind an
/// `Arc`.
#[derive(Debug)]
pub struct Connection {
    credentials: Credentials,
    base_url: Url,
    client: reqwest::Client,
    cookies: Mutex<Vec<String>>,
    limiter: Option<Semaphore>,
    in_flight: AtomicUsize,
}

impl Connection {
    /// Create a connection to `options.url` with the given credentials.
    ///
    /// Fails when the URL cannot be parsed or uses a scheme the policy
    /// does not allow (`https` only, unless `force_https` is disabled).
    pub fn new(credentials: Credentials, options: ConnectionOptions) -> ClientResult<Self> {
        let base_url = Url::parse(&options.url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", options.url)))?;

        match base_url.scheme() {
            "https" => {}
            "http" if !options.force_https => {}
            "http" => {
                return Err(ClientError::HttpsRequired {
                    url: base_url.to_string(),
                    scheme: "http".to_string(),
                })
            }
            other => {
                return Err(ClientError::UnsupportedScheme {
                    url: base_url.to_string(),
                    scheme: other.to_string(),
                })
            }
        }

        // Redirects stay disabled: the retry loop owns 301 handling so a
        // redirect consumes a retry slot like every other transient signal.
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(pem) = &options.server_ca_certificate {
            let cert = reqwest::Certificate::from_pem(pem.as_bytes())?;
            builder = builder.add_root_certificate(cert);
        }
        let client = builder.build()?;

        let limiter = (options.max_concurrent_requests > 0)
            .then(|| Semaphore::new(options.max_concurrent_requests as usize));

        Ok(Self {
            credentials,
            base_url,
            client,
            cookies: Mutex::new(Vec::new()),
            limiter,
            in_flight: AtomicUsize::new(0),
        })
    }

    /// The API endpoint this connection talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The username these credentials authenticate as, when known.
    pub fn username(&self) -> Option<&str> {
        self.credentials.username()
    }

    /// Current session cookies.
    pub fn cookies(&self) -> Vec<String> {
        self.cookies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of calls currently inside the admission gate.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Perform a request and return the raw response body.
    ///
    /// The request is retried when it times out or when the server replies
    /// `503`, `429`, or `301`. At most `options.max_retries` attempts are
    /// made for `GET` requests; every other method gets exactly one
    /// attempt, since replaying it could repeat a side effect. The sleep
    /// between attempts starts at one second and doubles each round; a
    /// server-supplied `Retry-After` overrides a single wait.
    pub async fn request(&self, route: &str, options: &RequestOptions) -> ClientResult<Vec<u8>> {
        let mut url = self
            .base_url
            .join(route)
            .map_err(|e| ClientError::InvalidUrl(format!("{route}: {e}")))?;

        let attempts = if options.method.is_idempotent() {
            options.max_retries.max(1)
        } else {
            1
        };
        let mut timeout = options.timeout;
        let mut backoff = INITIAL_BACKOFF;

        let _admission = self.admit().await?;

        for attempt in 1..=attempts {
            let info = match self
                .attempt(&url, options.method, options.body.as_ref(), timeout)
                .await?
            {
                AttemptOutcome::Done(bytes) => return Ok(bytes),
                AttemptOutcome::Retry(info) => info,
            };

            tracing::debug!(
                %url,
                method = %options.method,
                attempt,
                kind = ?info.kind,
                "request did not complete"
            );

            let mut follow_redirect = false;
            match &info.kind {
                RetryKind::Redirect(Some(location)) => {
                    url = location.clone();
                    follow_redirect = true;
                }
                RetryKind::Timeout => timeout *= 2,
                _ => {}
            }

            if attempt != attempts && !follow_redirect {
                tokio::time::sleep(info.retry_after.unwrap_or(backoff)).await;
            }
            backoff *= 2;
        }

        Err(ClientError::RetriesExhausted {
            method: options.method,
            url: url.to_string(),
            attempts,
        })
    }

    /// Perform a request and decode the response body through the codec.
    pub async fn request_xml<T: DeserializeOwned>(
        &self,
        route: &str,
        options: &RequestOptions,
    ) -> ClientResult<T> {
        let bytes = self.request(route, options).await?;
        Ok(XmlCodec::decode(&bytes)?)
    }

    async fn admit(&self) -> ClientResult<Admission<'_>> {
        let permit = match &self.limiter {
            Some(semaphore) => Some(
                semaphore
                    .acquire()
                    .await
                    .map_err(|_| ClientError::Internal("request limiter closed".to_string()))?,
            ),
            None => None,
        };
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        Ok(Admission {
            _permit: permit,
            gauge: &self.in_flight,
        })
    }

    async fn attempt(
        &self,
        url: &Url,
        method: RequestMethod,
        body: Option<&RequestBody>,
        timeout: Duration,
    ) -> ClientResult<AttemptOutcome> {
        let mut request = self
            .client
            .request(method.to_reqwest(), url.clone())
            .timeout(timeout)
            .header(COOKIE, self.cookie_header());

        request = match &self.credentials {
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            Credentials::Token(token) => request.header(AUTHORIZATION, format!("Token {token}")),
        };

        if let Some(body) = body {
            // The server rejects chunked transfer encoding, so the length
            // is always sent explicitly.
            request = request
                .header(CONTENT_TYPE, "application/octet-stream")
                .header(CONTENT_LENGTH, body.len())
                .body(body.as_bytes().to_vec());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => return Ok(AttemptOutcome::Retry(RetryInfo::timeout())),
            Err(err) => return Err(ClientError::Transport(err)),
        };

        self.capture_cookies(response.headers());

        let status = response.status();
        if let Some(info) = RetryInfo::from_response(status.as_u16(), response.headers()) {
            return Ok(AttemptOutcome::Retry(info));
        }

        let bytes = response.bytes().await.map_err(ClientError::Transport)?;
        if status.is_success() {
            Ok(AttemptOutcome::Done(bytes.to_vec()))
        } else {
            Err(ClientError::Api(ApiError {
                status: status.as_u16(),
                url: url.to_string(),
                method,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }))
        }
    }

    fn cookie_header(&self) -> HeaderValue {
        let cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        HeaderValue::from_str(&cookies.join("; ")).unwrap_or_else(|_| HeaderValue::from_static(""))
    }

    /// Replace the session cookies wholesale when the response carries any.
    fn capture_cookies(&self, headers: &HeaderMap) {
        let fresh: Vec<String> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_owned)
            .collect();
        if !fresh.is_empty() {
            let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
            *cookies = fresh;
        }
    }
}
