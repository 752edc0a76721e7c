//! Transport client: query encoding, headers, retries and status translation.

use bytes::Bytes;
use log::debug;
use reqwest::{Method, StatusCode, Url};
use std::fmt;

use super::retry::RetryPolicy;
use super::transport::{ReqwestTransport, Request, Response, Transport};
use super::{Headers, HttpError, QueryParams};

/// HTTP client bound to one absolute base URL.
///
/// The client is immutable: each call derives its request URL from the base
/// URL and that call's query parameters, so one instance can serve any number
/// of calls, concurrently or not.
pub struct HttpClient {
    base_url: Url,
    transport: Box<dyn Transport>,
    retry: RetryPolicy,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Creates a client for `raw_url` backed by a fresh [`ReqwestTransport`].
    ///
    /// Fails without touching the network when `raw_url` is not an absolute
    /// URI with a scheme and a host.
    pub fn new(raw_url: &str) -> Result<Self, HttpError> {
        let base_url = parse_base_url(raw_url)?;
        Ok(Self::from_parts(base_url, Box::new(ReqwestTransport::new()?)))
    }

    /// Creates a client for `raw_url` that performs exchanges through `transport`.
    pub fn with_transport<T: Transport + 'static>(
        raw_url: &str,
        transport: T,
    ) -> Result<Self, HttpError> {
        let base_url = parse_base_url(raw_url)?;
        Ok(Self::from_parts(base_url, Box::new(transport)))
    }

    fn from_parts(base_url: Url, transport: Box<dyn Transport>) -> Self {
        Self {
            base_url,
            transport,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the default retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The URL a GET or DELETE with `query` is sent to.
    ///
    /// The query string holds exactly the encoded `query` pairs, in key order.
    /// An empty map yields a URL without a query string.
    pub fn request_url(&self, query: &QueryParams) -> Url {
        let mut url = self.base_url.clone();
        if query.is_empty() {
            url.set_query(None);
        } else {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    /// Sends a GET and returns the body of a 2xx response.
    #[tracing::instrument(skip(self, headers))]
    pub async fn get(&self, headers: &Headers, query: &QueryParams) -> Result<Bytes, HttpError> {
        let request = Request {
            method: Method::GET,
            url: self.request_url(query),
            headers: headers.clone(),
            body: None,
        };
        let response = self.exchange(request).await?;
        expect_success(response)
    }

    /// Sends a POST of `body` to the base URL and returns the body of a 2xx response.
    #[tracing::instrument(skip(self, headers, body))]
    pub async fn post(
        &self,
        headers: &Headers,
        body: impl Into<Bytes>,
    ) -> Result<Bytes, HttpError> {
        let request = Request {
            method: Method::POST,
            url: self.base_url.clone(),
            headers: headers.clone(),
            body: Some(body.into()),
        };
        let response = self.exchange(request).await?;
        expect_success(response)
    }

    /// Sends a DELETE. Only `204 No Content` counts as success.
    #[tracing::instrument(skip(self, headers))]
    pub async fn delete(&self, headers: &Headers, query: &QueryParams) -> Result<(), HttpError> {
        let request = Request {
            method: Method::DELETE,
            url: self.request_url(query),
            headers: headers.clone(),
            body: None,
        };
        let response = self.exchange(request).await?;
        if response.status != StatusCode::NO_CONTENT {
            return Err(HttpError::Status(response.status));
        }
        Ok(())
    }

    async fn exchange(&self, request: Request) -> Result<Response, HttpError> {
        debug!("{} {}...", request.method, request.url);
        self.retry.send(self.transport.as_ref(), &request).await
    }
}

fn expect_success(response: Response) -> Result<Bytes, HttpError> {
    if response.status.is_success() {
        Ok(response.body)
    } else {
        Err(HttpError::Status(response.status))
    }
}

fn parse_base_url(raw_url: &str) -> Result<Url, HttpError> {
    let url = Url::parse(raw_url).map_err(|e| HttpError::invalid_url(raw_url, e))?;
    if url.cannot_be_a_base() || !url.has_host() {
        return Err(HttpError::invalid_url(
            raw_url,
            "expected an absolute URL with a scheme and a host",
        ));
    }
    Ok(url)
}
