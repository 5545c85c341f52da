// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Building blocks for talking to APIs over HTTP.

use reqwest::{Client, ClientBuilder, StatusCode, header};
use std::time::Duration;
use thiserror::Error;

/// Builds HTTP clients suitable for talking to the Reddit API.
///
/// Every client created by a factory shares the same user agent, request
/// timeout, and idle connection pool limits. The factory itself holds no
/// connections; each call to [`HTTPClientFactory::create()`] produces a new,
/// independently owned client.
#[derive(Clone, Debug)]
pub struct HTTPClientFactory {
    user_agent: String,
    timeout: Duration,
    max_idle_per_host: usize,
}

impl HTTPClientFactory {
    /// Requests that take longer than this are abandoned.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Maximum number of idle connections kept open for a single host.
    pub const DEFAULT_MAX_IDLE_PER_HOST: usize = 20;

    /// Creates a new factory whose clients identify themselves as
    /// `name` at the given `version`.
    ///
    /// # Examples
    ///
    /// ```
    /// use redditstream::http::HTTPClientFactory;
    /// let factory = HTTPClientFactory::new("redditstream", "1.0.0");
    /// assert_eq!(factory.user_agent(), "redditstream v1.0.0");
    /// ```
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            user_agent: format!("{name} v{version}"),
            timeout: Self::DEFAULT_TIMEOUT,
            max_idle_per_host: Self::DEFAULT_MAX_IDLE_PER_HOST,
        }
    }

    /// Sets the timeout applied to every request.
    pub fn timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Sets the number of idle connections kept per host.
    ///
    /// This bounds idle connections only. It does not limit how many
    /// requests may be in flight at the same time.
    pub fn max_idle_per_host(self, max_idle_per_host: usize) -> Self {
        Self {
            max_idle_per_host,
            ..self
        }
    }

    /// The user agent sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Creates a new HTTP client.
    pub fn create(&self) -> Client {
        ClientBuilder::new()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.max_idle_per_host)
            .build()
            // According to the docs, build() only fails if a TLS backend
            // cannot be initialized, or if DNS resolution cannot be
            // initialized, and both of these are unrecoverable for us.
            .expect("could not create a new HTTP client")
    }
}

impl Default for HTTPClientFactory {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

/// The result of an HTTP request.
pub type HTTPResult<T> = Result<T, HTTPError>;

/// Indicates an error has occurred when making an HTTP call.
#[derive(Debug, Error)]
pub enum HTTPError {
    /// An error that occurred while making an HTTP request.
    #[error("Error while making HTTP request: {0}")]
    Request(#[source] reqwest::Error),

    /// An error retrieving the body of a response.
    #[error("Error retrieving body of HTTP response: {0}")]
    Body(#[source] reqwest::Error),

    /// An unsuccessful HTTP status code in an HTTP response.
    #[error("Request returned HTTP {0}")]
    Http(StatusCode),

    /// A missing Content-Type header in a response.
    #[error("Missing Content-Type header")]
    MissingContentType,

    /// An invalid Content-Type header.
    #[error("Invalid Content-Type header value: {0}")]
    InvalidContentType(#[from] header::ToStrError),

    /// A Content-Type that is not understood by the service.
    #[error("Unexpected content type: {0}")]
    UnexpectedContentType(String),
}

impl HTTPError {
    /// True if the server asked us to slow down.
    ///
    /// Reddit signals rate limiting with HTTP 429 and nothing else, so this
    /// is the only status that callers are expected to retry.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, HTTPError::Http(status) if *status == StatusCode::TOO_MANY_REQUESTS)
    }
}
