// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! HTTPS connector for the Reddit API.
//!
//! Service structures in this module provide a low-level way to interact
//! with the Reddit API over HTTPS, essentially a specialized HTTPS client
//! specifically for Reddit. They know where resources live and how to get
//! their raw bodies, but nothing about what the bodies mean.

use crate::http::{HTTPClientFactory, HTTPError, HTTPResult};
use crate::reddit::thing::Cursor;
use log::debug;
use reqwest::{Client, header};

/// A resource that can be retrieved from the Reddit API.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    /// One page of a subreddit's top posts.
    Listing {
        /// Subreddit name, without the `r/` prefix.
        subreddit: String,
        /// Number of posts to request.
        limit: usize,
        /// Where the page starts.
        cursor: Cursor,
    },

    /// Comments for a single post.
    Comments {
        /// The post's identifier, without the `t3_` prefix.
        post_id: String,
        /// Number of items to request.
        limit: usize,
    },
}

impl Resource {
    /// Path and query string for the resource, relative to the API host.
    ///
    /// # Examples
    ///
    /// ```
    /// use redditstream::reddit::service::Resource;
    /// let resource = Resource::Comments { post_id: "abc".into(), limit: 30 };
    /// assert_eq!(resource.path(), "/r/all/comments/abc/top.json?sr_detail=false&limit=30");
    /// ```
    pub fn path(&self) -> String {
        match self {
            Resource::Listing {
                subreddit,
                limit,
                cursor,
            } => {
                let after = cursor.after().unwrap_or_default();
                let before = cursor.before().unwrap_or_default();
                format!("/r/{subreddit}/top.json?limit={limit}&after={after}&before={before}")
            }
            Resource::Comments { post_id, limit } => {
                format!("/r/all/comments/{post_id}/top.json?sr_detail=false&limit={limit}")
            }
        }
    }
}

/// A service for retrieving resources from Reddit.
///
/// Using this trait, clients can implement different ways of connecting
/// to the Reddit API, such as an actual connector for production code,
/// and a scripted connector for testing purposes.
///
/// Services are shared by every concurrent fetch in a pipeline, so they
/// must be safe to use from many tasks at once.
pub trait Service: Send + Sync {
    /// Performs a GET request for the `resource` and returns the raw body.
    ///
    /// Unsuccessful HTTP statuses, including rate limiting, are returned
    /// as [`HTTPError::Http`].
    fn get_resource(
        &self,
        resource: &Resource,
    ) -> impl Future<Output = HTTPResult<String>> + Send;
}

/// A service that contacts the Reddit API directly to retrieve information.
#[derive(Debug)]
pub struct RedditService {
    client: Client,
    base_url: String,
}

impl RedditService {
    /// Where the Reddit API lives.
    pub const BASE_URL: &'static str = "https://www.reddit.com";

    /// Creates a new Reddit service using clients from the given factory.
    pub fn new(factory: &HTTPClientFactory) -> Self {
        Self::with_base_url(factory, Self::BASE_URL)
    }

    /// Creates a new service that sends requests to `base_url` instead of
    /// the real Reddit API.
    pub fn with_base_url(factory: &HTTPClientFactory, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = factory.create();
        Self { client, base_url }
    }

    fn uri(&self, resource: &Resource) -> String {
        format!("{}{}", self.base_url, resource.path())
    }
}

impl Default for RedditService {
    /// Creates a new Reddit service.
    fn default() -> Self {
        Self::new(&HTTPClientFactory::default())
    }
}

impl Service for RedditService {
    async fn get_resource(&self, resource: &Resource) -> HTTPResult<String> {
        let uri = self.uri(resource);
        debug!("GET {uri}");

        let resp = self
            .client
            .get(&uri)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(HTTPError::Request)?;

        if !resp.status().is_success() {
            Err(HTTPError::Http(resp.status()))
        } else {
            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .ok_or(HTTPError::MissingContentType)?
                .to_str()?;
            if !content_type.starts_with("application/json") {
                Err(HTTPError::UnexpectedContentType(content_type.to_string()))
            } else {
                resp.text().await.map_err(HTTPError::Body)
            }
        }
    }
}
