// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! redditstream is a command-line tool for reading a subreddit's top posts,
//! along with each post's top comments, in the terminal. Rather than waiting
//! for every post and every comment to be downloaded, it prints each post as
//! soon as its comments arrive.
//!
//! # Examples
//!
//! Show the top 10 posts on r/all, with 5 comments each:
//!
//! ```bash
//! redditstream
//! ```
//!
//! Show the top 25 posts on r/rust, with 3 comments each:
//!
//! ```bash
//! redditstream rust --posts 25 --comments 3
//! ```
//!
//! Get usage and help for the tool:
//!
//! ```bash
//! redditstream --help
//! ```
//!
//! # How it works
//!
//! Posts are fetched a page at a time. Each page is handed to a stage that
//! fetches comments for every post on the page concurrently, and each post
//! is printed the moment its comments are in. Posts therefore appear in
//! the order their comments finish downloading, not in listing order. See
//! the [`pipeline`] module for details.
//!
//! Reddit rate limits anonymous clients fairly aggressively. Rate-limited
//! requests are retried with exponential backoff; see [`retry`].
//!
//! # License
//!
//! redditstream is licensed under the terms of the [Apache License 2.0]. Please
//! see the LICENSE file accompanying this source code or visit the previous
//! link for more information on licensing.
//!
//! [Apache License 2.0]: https://www.apache.org/licenses/LICENSE-2.0

pub mod cli;
pub mod http;
pub mod pipeline;
pub mod reddit;
pub mod retry;
pub mod text;
pub mod view;

#[cfg(test)]
mod test_utils;
