// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Walks a subreddit's top listing one page at a time.

use crate::reddit::client::{Error, RedditClient};
use crate::reddit::service::Service;
use crate::reddit::thing::{Cursor, Post};
use log::debug;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

/// Fetches pages of posts and hands each page downstream as a batch.
///
/// The driver stops when it has produced `target` posts, when Reddit runs
/// out of posts, or when a page cannot be fetched. Whichever way it stops,
/// it drops its sender, so the batch channel is closed exactly once.
#[derive(Clone, Debug)]
pub struct PaginationDriver {
    subreddit: String,
    page_size: usize,
    target: usize,
}

/// What a driver accomplished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverReport {
    /// Number of batches sent downstream.
    pub pages: usize,

    /// Number of posts sent downstream, across all batches.
    pub posts: usize,
}

impl PaginationDriver {
    /// Creates a driver that fetches `target` posts from `subreddit`,
    /// `page_size` posts at a time.
    pub fn new(subreddit: impl Into<String>, page_size: usize, target: usize) -> Self {
        Self {
            subreddit: subreddit.into(),
            page_size: page_size.max(1),
            target,
        }
    }

    /// Fetches pages starting at `cursor` and sends them on `batches`.
    ///
    /// Sending blocks until the next stage is ready for another batch, so
    /// the driver never runs more than one batch ahead of its consumer.
    ///
    /// A failed page is not sent; the error is returned instead.
    pub async fn run<S: Service>(
        self,
        client: Arc<RedditClient<S>>,
        cursor: Cursor,
        batches: Sender<Vec<Post>>,
        cancel: CancellationToken,
    ) -> Result<DriverReport, Error> {
        let mut report = DriverReport::default();
        let mut cursor = cursor;
        let mut remaining = self.target;

        while remaining > 0 {
            let limit = self.page_size.min(remaining);
            let page = client
                .fetch_listing(&self.subreddit, &cursor, limit, &cancel)
                .await?;

            if page.posts.is_empty() {
                debug!("r/{}: listing exhausted", self.subreddit);
                break;
            }

            let mut posts = page.posts;
            posts.truncate(remaining);
            let count = posts.len();

            tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                sent = batches.send(posts) => {
                    if sent.is_err() {
                        debug!("r/{}: nobody is listening for posts", self.subreddit);
                        break;
                    }
                }
            }

            report.pages += 1;
            report.posts += count;
            remaining -= count;

            if !page.next.has_next() {
                debug!("r/{}: no more pages", self.subreddit);
                break;
            }
            if page.next == cursor {
                debug!("r/{}: listing did not advance", self.subreddit);
                break;
            }
            cursor = page.next;
        }

        Ok(report)
    }
}
