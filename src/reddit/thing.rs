// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! A "thing" in the Reddit sense.
//!
//! Historically in the Reddit API and its old source code, a "Thing" was
//! any element of the Reddit system: users, posts, comments, etc. Every
//! thing is wrapped in an envelope with a `kind` tag (`t1` for comments,
//! `t3` for links, `more` for "load more comments" placeholders, and so
//! on) and a `data` object. Collections of things come wrapped in a
//! `Listing` envelope with pagination cursors.
//!
//! This module maps those JSON envelopes onto the small view model the
//! rest of the program works with.

use crate::text::convert_html_entities;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Kind tag Reddit uses for comments.
pub const COMMENT_KIND: &str = "t1";

/// A post in a subreddit listing.
///
/// A post starts out with no comments. Comments are attached exactly once,
/// via [`Post::with_comments()`], after they have been fetched.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    id: String,
    title: String,
    url: String,
    selftext: String,
    comments: Vec<String>,
    comment_error: Option<String>,
}

impl Post {
    /// Creates a new post without any comments.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        selftext: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            selftext: selftext.into(),
            comments: vec![],
            comment_error: None,
        }
    }

    /// Attaches the outcome of a comment fetch to the post.
    ///
    /// On success the comments are stored as-is. On failure the post gets
    /// no comments and remembers why, so a renderer can tell "no comments"
    /// apart from "could not fetch comments".
    pub fn with_comments<E: fmt::Display>(self, result: Result<Vec<String>, E>) -> Self {
        match result {
            Ok(comments) => Self {
                comments,
                comment_error: None,
                ..self
            },
            Err(err) => Self {
                comments: vec![],
                comment_error: Some(err.to_string()),
                ..self
            },
        }
    }

    /// Reddit's unique identifier for the post, without the `t3_` prefix.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The post's title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The URL the post links to. Self posts link to themselves.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Body of a self post. Empty for link posts.
    pub fn selftext(&self) -> &str {
        &self.selftext
    }

    /// Bodies of the post's top comments, in the order Reddit returned them.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Why comments could not be fetched, if they could not.
    pub fn comment_error(&self) -> Option<&str> {
        self.comment_error.as_deref()
    }

    /// True if fetching comments for this post failed.
    pub fn has_comment_error(&self) -> bool {
        self.comment_error.is_some()
    }
}

/// A position in a listing.
///
/// Cursors are opaque tokens handed out by Reddit. An absent `after`
/// means "start from the beginning" when sent, and "there are no more
/// pages" when received; an absent `before` means there is no prior page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cursor {
    after: Option<String>,
    before: Option<String>,
}

impl Cursor {
    /// A cursor pointing at the first page of a listing.
    pub fn start() -> Self {
        Self::default()
    }

    /// Creates a cursor from raw tokens. Empty tokens are treated as absent.
    pub fn new(after: Option<String>, before: Option<String>) -> Self {
        let present = |s: Option<String>| s.filter(|s| !s.is_empty());
        Self {
            after: present(after),
            before: present(before),
        }
    }

    /// Token for the page following this one.
    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }

    /// Token for the page preceding this one.
    pub fn before(&self) -> Option<&str> {
        self.before.as_deref()
    }

    /// True if Reddit indicated there is another page after this one.
    pub fn has_next(&self) -> bool {
        self.after.is_some()
    }
}

/// A single page of posts from a listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    /// Posts in the order Reddit returned them.
    pub posts: Vec<Post>,

    /// Where the next page starts.
    pub next: Cursor,
}

impl Page {
    /// Parses a listing response from `/r/<subreddit>/top.json`.
    ///
    /// # Examples
    ///
    /// ```
    /// use redditstream::reddit::thing::Page;
    /// let data = r#"{"kind": "Listing", "data": {
    ///     "after": "t3_b", "before": null,
    ///     "children": [
    ///         {"kind": "t3", "data": {
    ///             "id": "a", "title": "A", "url": "https://a", "selftext": ""
    ///         }}
    ///     ]
    /// }}"#;
    /// let page = Page::parse(data).unwrap();
    /// assert_eq!(page.posts.len(), 1);
    /// assert_eq!(page.posts[0].id(), "a");
    /// assert_eq!(page.next.after(), Some("t3_b"));
    /// ```
    pub fn parse(data: &str) -> Result<Self, Error> {
        let listing: Listing<RawPost> = serde_json::from_str(data)?;
        let ListingData {
            children,
            after,
            before,
        } = listing.data;
        let posts = children.into_iter().map(|thing| thing.data.into()).collect();
        let next = Cursor::new(after, before);
        Ok(Self { posts, next })
    }
}

/// Parses a response from the comments endpoint into comment bodies.
///
/// The comments endpoint returns a two-element array: the first element is
/// a listing containing the post itself, the second is the comment tree.
/// Only actual comments (kind `t1`) are kept; "load more" placeholders
/// are dropped. At most `limit` comments are returned, in their original
/// order.
///
/// A response with fewer than two elements is not an error; it simply
/// yields no comments.
pub fn parse_comments(data: &str, limit: usize) -> Result<Vec<String>, Error> {
    let envelopes: Vec<Listing<serde_json::Value>> = serde_json::from_str(data)?;
    let Some(tree) = envelopes.into_iter().nth(1) else {
        return Ok(vec![]);
    };

    tree.data
        .children
        .into_iter()
        .filter(|thing| thing.kind == COMMENT_KIND)
        .take(limit)
        .map(|thing| -> Result<String, Error> {
            let comment: RawComment = serde_json::from_value(thing.data)?;
            Ok(convert_html_entities(&comment.body))
        })
        .collect()
}

/// An error parsing Reddit data.
#[derive(Debug, Error)]
pub enum Error {
    /// The response was not valid JSON or did not have the expected shape.
    #[error("Could not parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    #[serde(default = "Vec::new")]
    children: Vec<Thing<T>>,
    #[serde(default)]
    after: Option<String>,
    #[serde(default)]
    before: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thing<T> {
    #[serde(default)]
    kind: String,
    data: T,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    selftext: String,
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        Post::new(
            raw.id,
            convert_html_entities(&raw.title),
            raw.url,
            convert_html_entities(&raw.selftext),
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawComment {
    #[serde(default)]
    body: String,
}

#[cfg(test)]
mod tests {
    mod post {
        use crate::reddit::thing::Post;
        use std::io;

        #[test]
        fn it_starts_without_comments() {
            let post = Post::new("abc", "Title", "https://example.com", "");
            assert!(post.comments().is_empty());
            assert!(!post.has_comment_error());
        }

        #[test]
        fn it_attaches_comments() {
            let comments = vec![String::from("first"), String::from("second")];
            let post = Post::new("abc", "Title", "https://example.com", "")
                .with_comments::<io::Error>(Ok(comments.clone()));
            assert_eq!(post.comments(), comments.as_slice());
            assert!(post.comment_error().is_none());
        }

        #[test]
        fn it_records_a_failed_comment_fetch() {
            let err = io::Error::other("connection reset");
            let post = Post::new("abc", "Title", "https://example.com", "").with_comments(Err(err));
            assert!(post.comments().is_empty());
            assert_eq!(post.comment_error(), Some("connection reset"));
        }
    }

    mod cursor {
        use crate::reddit::thing::Cursor;
        use std::collections::HashSet;

        #[test]
        fn it_starts_empty() {
            let cursor = Cursor::start();
            assert_eq!(cursor.after(), None);
            assert_eq!(cursor.before(), None);
            assert!(!cursor.has_next());
        }

        #[test]
        fn it_treats_empty_tokens_as_absent() {
            let cursor = Cursor::new(Some(String::new()), Some(String::new()));
            assert_eq!(cursor, Cursor::start());
        }

        #[test]
        fn it_keeps_tokens() {
            let cursor = Cursor::new(Some("t3_after".into()), Some("t3_before".into()));
            assert_eq!(cursor.after(), Some("t3_after"));
            assert_eq!(cursor.before(), Some("t3_before"));
            assert!(cursor.has_next());
        }

        #[test]
        fn it_hashes_equal_cursors_alike() {
            let mut seen = HashSet::new();
            seen.insert(Cursor::new(Some("t3_after".into()), None));
            assert!(seen.contains(&Cursor::new(Some("t3_after".into()), Some(String::new()))));
            assert!(!seen.contains(&Cursor::start()));
        }
    }

    mod page {
        use crate::reddit::thing::{Cursor, Page};
        use crate::test_utils::load_data;
        use pretty_assertions::assert_eq;

        #[test]
        fn it_parses_posts_in_order() {
            let page = Page::parse(&load_data("listing_page1")).unwrap();
            let ids: Vec<_> = page.posts.iter().map(|p| p.id()).collect();
            assert_eq!(ids, vec!["p1", "p2"]);
        }

        #[test]
        fn it_parses_post_fields() {
            let page = Page::parse(&load_data("listing_page1")).unwrap();
            let post = &page.posts[0];
            assert_eq!(post.title(), "Cats & Dogs <living together>");
            assert_eq!(post.url(), "https://i.redd.it/p1.jpg");
            assert_eq!(post.selftext(), "");
            let post = &page.posts[1];
            assert_eq!(post.selftext(), "Some self text.");
        }

        #[test]
        fn it_parses_cursors() {
            let page = Page::parse(&load_data("listing_page1")).unwrap();
            assert_eq!(page.next, Cursor::new(Some("t3_p2".into()), None));
        }

        #[test]
        fn it_parses_the_last_page() {
            let page = Page::parse(&load_data("listing_page2")).unwrap();
            assert_eq!(page.posts.len(), 2);
            assert!(!page.next.has_next());
            assert_eq!(page.next.before(), Some("t3_p3"));
        }

        #[test]
        fn it_parses_an_empty_listing() {
            let page = Page::parse(&load_data("listing_empty")).unwrap();
            assert!(page.posts.is_empty());
            assert!(!page.next.has_next());
        }

        #[test]
        fn it_fails_on_malformed_json() {
            assert!(Page::parse("{\"data\": ").is_err());
        }

        #[test]
        fn it_fails_on_an_unexpected_shape() {
            assert!(Page::parse("[1, 2, 3]").is_err());
        }
    }

    mod comments {
        use crate::reddit::thing::parse_comments;
        use crate::test_utils::load_data;
        use pretty_assertions::assert_eq;

        #[test]
        fn it_keeps_only_comments() {
            let comments = parse_comments(&load_data("comments_p1"), 10).unwrap();
            assert_eq!(
                comments,
                vec![
                    "First!",
                    "This is a comment\nthat spans lines.",
                    "Third & last",
                ]
            );
        }

        #[test]
        fn it_truncates_to_the_limit_after_filtering() {
            // The first child is a "more" placeholder, so truncating before
            // filtering would only yield one comment.
            let comments = parse_comments(&load_data("comments_more_first"), 2).unwrap();
            assert_eq!(comments, vec!["one", "two"]);
        }

        #[test]
        fn it_returns_nothing_for_a_zero_limit() {
            let comments = parse_comments(&load_data("comments_p1"), 0).unwrap();
            assert!(comments.is_empty());
        }

        #[test]
        fn it_returns_nothing_for_a_short_envelope() {
            let comments = parse_comments(&load_data("comments_short"), 5).unwrap();
            assert!(comments.is_empty());
        }

        #[test]
        fn it_returns_nothing_for_an_empty_array() {
            let comments = parse_comments("[]", 5).unwrap();
            assert!(comments.is_empty());
        }

        #[test]
        fn it_fails_on_malformed_json() {
            assert!(parse_comments("[{\"kind\": ", 5).is_err());
        }

        #[test]
        fn it_fails_when_the_response_is_not_an_array() {
            assert!(parse_comments("{\"kind\": \"Listing\"}", 5).is_err());
        }
    }
}
