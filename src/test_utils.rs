use crate::http::{HTTPError, HTTPResult};
use crate::pipeline::consumer::Render;
use crate::reddit::service::{Resource, Service};
use crate::reddit::thing::{Cursor, Post};
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::sync::Mutex;
use std::time::Duration;

pub fn do_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn load_data(file: &str) -> String {
    fs::read_to_string(format!("tests/data/{file}.json")).expect("could not find test data")
}

#[derive(Clone, Debug)]
enum Reply {
    Body(String),
    Status(StatusCode),
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Reply>,
    delay: Duration,
    requests: usize,
}

/// A scripted stand-in for the Reddit API.
///
/// Replies are queued per resource and handed out in order. The last reply
/// queued for a resource is repeated forever once the others are used up.
/// Resources with no replies at all get a 404.
#[derive(Debug, Default)]
pub struct TestService {
    scripts: Mutex<HashMap<Resource, Script>>,
}

impl TestService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, resource: Resource, body: impl Into<String>) -> Self {
        self.push(resource, Reply::Body(body.into()))
    }

    pub fn with_status(self, resource: Resource, status: StatusCode) -> Self {
        self.push(resource, Reply::Status(status))
    }

    /// Makes every request for `resource` take `delay` to answer.
    pub fn with_delay(self, resource: Resource, delay: Duration) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(resource)
            .or_default()
            .delay = delay;
        self
    }

    /// Number of times `resource` has been requested.
    pub fn requests(&self, resource: &Resource) -> usize {
        self.scripts
            .lock()
            .unwrap()
            .get(resource)
            .map(|script| script.requests)
            .unwrap_or(0)
    }

    fn push(self, resource: Resource, reply: Reply) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(resource)
            .or_default()
            .replies
            .push_back(reply);
        self
    }

    fn next_reply(&self, resource: &Resource) -> (Duration, Option<Reply>) {
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.entry(resource.clone()).or_default();
        script.requests += 1;
        let reply = if script.replies.len() > 1 {
            script.replies.pop_front()
        } else {
            script.replies.front().cloned()
        };
        (script.delay, reply)
    }
}

impl Service for TestService {
    async fn get_resource(&self, resource: &Resource) -> HTTPResult<String> {
        let (delay, reply) = self.next_reply(resource);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Status(status)) => Err(HTTPError::Http(status)),
            None => Err(HTTPError::Http(StatusCode::NOT_FOUND)),
        }
    }
}

/// Keeps every rendered post so tests can inspect them.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub posts: Vec<Post>,
}

impl Render for RecordingRenderer {
    fn render(&mut self, post: &Post) {
        self.posts.push(post.clone());
    }
}

pub fn listing(subreddit: &str, limit: usize, cursor: Cursor) -> Resource {
    Resource::Listing {
        subreddit: subreddit.to_string(),
        limit,
        cursor,
    }
}

pub fn comments(post_id: &str, limit: usize) -> Resource {
    Resource::Comments {
        post_id: post_id.to_string(),
        limit,
    }
}
