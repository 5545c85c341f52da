// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Streams top posts and their comments from Reddit.
//!
//! A pipeline run has three stages, each running concurrently:
//!
//! 1. A [`PaginationDriver`] fetches pages of posts and sends each page
//!    downstream as a batch.
//! 2. A [`CommentFanout`] receives batches and fetches comments for every
//!    post concurrently, sending each post on as soon as its comments
//!    arrive.
//! 3. A [consumer](consumer::consume) renders each finished post.
//!
//! Stages are connected by channels that hold at most one item, so a fast
//! stage waits for a slow one instead of piling up work. Closing a channel
//! is the only "no more posts" signal; every stage closes its outgoing
//! channel exactly once, however it stops.

pub mod consumer;
pub mod driver;
pub mod fanout;

pub use consumer::{Render, TerminalRenderer};
pub use driver::{DriverReport, PaginationDriver};
pub use fanout::{CommentFanout, FanoutReport};

use crate::reddit::client::{self, RedditClient};
use crate::reddit::service::Service;
use crate::reddit::thing::Cursor;
use log::info;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

/// Pipeline options.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineOptions {
    subreddit: String,
    page_size: usize,
    target: usize,
    comment_limit: usize,
    max_concurrency: usize,
}

impl PipelineOptions {
    /// Incrementally builds a new set of pipeline options.
    ///
    /// # Examples
    ///
    /// ```
    /// use redditstream::pipeline::PipelineOptions;
    /// let opts = PipelineOptions::build()
    ///     .subreddit("rust")
    ///     .target(25)
    ///     .build();
    /// assert_eq!(opts.subreddit(), "rust");
    /// assert_eq!(opts.target(), 25);
    /// assert_eq!(opts.page_size(), 10);
    /// ```
    pub fn build() -> PipelineOptionsBuilder {
        PipelineOptionsBuilder::default()
    }

    /// Subreddit whose top posts are fetched.
    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// Posts requested per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total number of posts to fetch.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Maximum number of comments fetched for each post.
    pub fn comment_limit(&self) -> usize {
        self.comment_limit
    }

    /// Maximum number of comment fetches in flight at once.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptionsBuilder::default().build()
    }
}

/// A builder for pipeline options.
///
/// You probably don't want to use this directly; call
/// [`PipelineOptions::build()`] and construct it incrementally instead.
#[derive(Debug)]
#[must_use]
pub struct PipelineOptionsBuilder {
    subreddit: String,
    page_size: usize,
    target: usize,
    comment_limit: usize,
    max_concurrency: usize,
}

impl Default for PipelineOptionsBuilder {
    fn default() -> Self {
        Self {
            subreddit: String::from("all"),
            page_size: 10,
            target: 10,
            comment_limit: 5,
            max_concurrency: fanout::DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl PipelineOptionsBuilder {
    /// Sets the subreddit, without the `r/` prefix.
    pub fn subreddit(mut self, subreddit: impl Into<String>) -> Self {
        self.subreddit = subreddit.into();
        self
    }

    /// Sets the number of posts requested per page. At least 1.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets the total number of posts to fetch.
    pub fn target(mut self, target: usize) -> Self {
        self.target = target;
        self
    }

    /// Sets the maximum number of comments per post.
    pub fn comment_limit(mut self, comment_limit: usize) -> Self {
        self.comment_limit = comment_limit;
        self
    }

    /// Sets the maximum number of concurrent comment fetches. At least 1.
    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Finalizes the [`PipelineOptions`].
    pub fn build(self) -> PipelineOptions {
        PipelineOptions {
            subreddit: self.subreddit,
            page_size: self.page_size,
            target: self.target,
            comment_limit: self.comment_limit,
            max_concurrency: self.max_concurrency,
        }
    }
}

/// What a pipeline run accomplished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pages of posts fetched.
    pub pages: usize,

    /// Posts fetched from the listing.
    pub posts_fetched: usize,

    /// Posts handed to the renderer.
    pub posts_rendered: usize,

    /// Posts rendered without comments because fetching them failed.
    pub comment_failures: usize,
}

/// Fetches top posts and their comments and renders them as they arrive.
#[derive(Debug)]
pub struct Pipeline<S: Service> {
    client: Arc<RedditClient<S>>,
    options: PipelineOptions,
}

impl<S: Service + 'static> Pipeline<S> {
    /// Creates a pipeline that fetches data with `client`.
    ///
    /// The pipeline owns the client, and with it the HTTP connection pool,
    /// for as long as it exists.
    pub fn new(client: RedditClient<S>, options: PipelineOptions) -> Self {
        Self {
            client: Arc::new(client),
            options,
        }
    }

    /// The pipeline's options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Runs the pipeline to completion, rendering each post with `renderer`.
    ///
    /// Returns once every stage has stopped. If the listing could not be
    /// fetched, posts fetched before the failure have already been
    /// rendered and the listing error is returned.
    pub async fn run<R: Render + ?Sized>(
        &self,
        renderer: &mut R,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, Error> {
        let opts = &self.options;
        info!(
            "fetching {} posts from r/{}, {} comments each",
            opts.target, opts.subreddit, opts.comment_limit
        );

        let (batch_tx, batch_rx) = mpsc::channel(1);
        let (post_tx, post_rx) = mpsc::channel(1);

        let driver = PaginationDriver::new(&opts.subreddit, opts.page_size, opts.target);
        let driver = tokio::spawn(driver.run(
            Arc::clone(&self.client),
            Cursor::start(),
            batch_tx,
            cancel.clone(),
        ));

        let fanout = CommentFanout::new(opts.comment_limit, opts.max_concurrency);
        let fanout = tokio::spawn(fanout.run(
            Arc::clone(&self.client),
            batch_rx,
            post_tx,
            cancel.clone(),
        ));

        let rendered = consumer::consume(post_rx, renderer, cancel).await;
        let fanned = fanout.await?;
        let driven = driver.await??;

        let summary = RunSummary {
            pages: driven.pages,
            posts_fetched: driven.posts,
            posts_rendered: rendered,
            comment_failures: fanned.comment_failures,
        };
        info!("{summary:?}");
        Ok(summary)
    }
}

/// A pipeline error.
#[derive(Debug, Error)]
pub enum Error {
    /// The listing could not be fetched.
    #[error("Could not fetch listing: {0}")]
    Listing(#[from] client::Error),

    /// A pipeline stage panicked or was aborted.
    #[error("Pipeline stage failed: {0}")]
    Stage(#[from] JoinError),
}

impl Error {
    /// True if the run stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Listing(client::Error::Cancelled))
    }
}
