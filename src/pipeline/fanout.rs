// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Fetches comments for every post in every batch, concurrently.

use crate::reddit::client::RedditClient;
use crate::reddit::service::Service;
use crate::reddit::thing::Post;
use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Number of comment fetches allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Receives batches of posts and sends each post on, with its comments,
/// as soon as they have been fetched.
///
/// Posts come out in whatever order their comments arrive, not in listing
/// order. A post whose comments cannot be fetched is still sent, with no
/// comments and a record of what went wrong.
#[derive(Clone, Debug)]
pub struct CommentFanout {
    comment_limit: usize,
    max_concurrency: usize,
}

/// What a fan-out stage accomplished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Posts received from upstream and handed to a comment fetch.
    pub received: usize,

    /// Posts sent downstream.
    pub sent: usize,

    /// Posts whose comments could not be fetched.
    pub comment_failures: usize,
}

impl CommentFanout {
    /// Creates a stage that fetches up to `comment_limit` comments per post
    /// with at most `max_concurrency` fetches in flight.
    pub fn new(comment_limit: usize, max_concurrency: usize) -> Self {
        Self {
            comment_limit,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Runs the stage until `batches` is closed and every fetch has finished.
    ///
    /// `posts` is dropped only after the last fetch task has sent its post,
    /// so downstream sees the channel close exactly once, and only when
    /// there is nothing left to come.
    pub async fn run<S: Service + 'static>(
        self,
        client: Arc<RedditClient<S>>,
        mut batches: Receiver<Vec<Post>>,
        posts: Sender<Post>,
        cancel: CancellationToken,
    ) -> FanoutReport {
        let tracker = TaskTracker::new();
        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let sent = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(AtomicUsize::new(0));
        let mut received = 0;

        'batches: loop {
            let batch = tokio::select! {
                _ = cancel.cancelled() => break,
                batch = batches.recv() => batch,
            };
            let Some(batch) = batch else {
                break;
            };
            debug!("fetching comments for {} posts", batch.len());

            for post in batch {
                let permit = tokio::select! {
                    _ = cancel.cancelled() => break 'batches,
                    permit = Arc::clone(&permits).acquire_owned() => permit,
                };
                let Ok(permit) = permit else {
                    break 'batches;
                };

                let client = Arc::clone(&client);
                let posts = posts.clone();
                let cancel = cancel.clone();
                let sent = Arc::clone(&sent);
                let failures = Arc::clone(&failures);
                let limit = self.comment_limit;

                tracker.spawn(async move {
                    let result = client.fetch_comments(post.id(), limit, &cancel).await;
                    if let Err(err) = &result {
                        warn!("could not fetch comments for {}: {err}", post.id());
                        failures.fetch_add(1, Ordering::Relaxed);
                    }
                    let post = post.with_comments(result);
                    drop(permit);

                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        delivered = posts.send(post) => {
                            if delivered.is_ok() {
                                sent.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                });
                received += 1;
            }
        }

        tracker.close();
        tracker.wait().await;
        drop(posts);

        FanoutReport {
            received,
            sent: sent.load(Ordering::Relaxed),
            comment_failures: failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for CommentFanout {
    fn default() -> Self {
        Self::new(5, DEFAULT_MAX_CONCURRENCY)
    }
}
