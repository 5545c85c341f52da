// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Clients for reading data from the Reddit API.

use crate::http::HTTPError;
use crate::reddit::service::{RedditService, Resource, Service};
use crate::reddit::thing::{self, Cursor, Page};
use crate::retry::RetryPolicy;
use log::{debug, warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Fetches listings and comments from Reddit.
///
/// A client owns its [`Service`] and is meant to be shared, usually behind
/// an [`Arc`](std::sync::Arc), by every task in a pipeline run. Each fetch
/// retries on its own when Reddit rate limits it; there is no cooldown
/// shared between concurrent fetches.
#[derive(Debug)]
pub struct RedditClient<S: Service = RedditService> {
    service: S,
    retry: RetryPolicy,
}

impl<S: Service> RedditClient<S> {
    /// Creates a client that retrieves data using the given `service`.
    pub fn new_with_service(service: S, retry: RetryPolicy) -> Self {
        Self { service, retry }
    }

    /// The underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Fetches a single page of top posts for `subreddit`, starting at `cursor`.
    ///
    /// Transport and parse errors are returned immediately. Rate limiting
    /// is retried according to the client's [`RetryPolicy`].
    pub async fn fetch_listing(
        &self,
        subreddit: &str,
        cursor: &Cursor,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Page, Error> {
        let resource = Resource::Listing {
            subreddit: subreddit.to_string(),
            limit,
            cursor: cursor.clone(),
        };
        let body = self.get_with_retry(&resource, cancel).await?;
        let page = Page::parse(&body)?;
        debug!(
            "r/{subreddit}: received {} posts, next page after {:?}",
            page.posts.len(),
            page.next.after()
        );
        Ok(page)
    }

    /// Fetches the bodies of at most `limit` top comments for a post.
    ///
    /// Reddit does not honor the requested count exactly and mixes
    /// placeholders in with real comments, so more items are requested
    /// than needed and the result is trimmed afterward.
    pub async fn fetch_comments(
        &self,
        post_id: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, Error> {
        let resource = Resource::Comments {
            post_id: post_id.to_string(),
            limit: Self::overfetch(limit),
        };
        let body = self.get_with_retry(&resource, cancel).await?;
        let comments = thing::parse_comments(&body, limit)?;
        debug!("{post_id}: received {} comments", comments.len());
        Ok(comments)
    }

    fn overfetch(limit: usize) -> usize {
        limit * 2 + 20
    }

    async fn get_with_retry(
        &self,
        resource: &Resource,
        cancel: &CancellationToken,
    ) -> Result<String, Error> {
        let mut attempt = 1;
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            match self.service.get_resource(resource).await {
                Err(err) if err.is_rate_limited() => {
                    if !self.retry.should_retry(attempt) {
                        warn!("{}: still rate limited after {attempt} attempts", resource.path());
                        return Err(Error::RateLimited { attempts: attempt });
                    }
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "{}: rate limited, retrying in {}ms",
                        resource.path(),
                        delay.as_millis()
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
                result => return Ok(result?),
            }
        }
    }
}

/// A client error.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the underlying HTTP service.
    #[error("Service error: {0}")]
    Service(#[from] HTTPError),

    /// An error parsing data.
    #[error("Parse error: {0}")]
    Parse(#[from] thing::Error),

    /// Reddit kept rate limiting the request until the retry policy gave up.
    #[error("Rate limited after {attempts} attempts")]
    RateLimited {
        /// Number of attempts made, including the first.
        attempts: u32,
    },

    /// The fetch was abandoned because the run was cancelled.
    #[error("Cancelled")]
    Cancelled,
}
