// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! The last stage of a pipeline: drawing posts as they arrive.

use crate::reddit::thing::Post;
use crate::view::{ViewOptions, Viewable};
use log::debug;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

/// Something that can display a finished post.
pub trait Render {
    /// Displays a single post. Its comments have already been attached.
    fn render(&mut self, post: &Post);
}

/// Prints posts to standard output.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    opts: ViewOptions,
}

impl TerminalRenderer {
    /// Creates a renderer that draws posts using the given view options.
    pub fn new(opts: ViewOptions) -> Self {
        Self { opts }
    }
}

impl Render for TerminalRenderer {
    fn render(&mut self, post: &Post) {
        println!("{}", post.view(&self.opts));
    }
}

/// Renders every post received on `posts` until the channel closes.
///
/// Returns the number of posts rendered. Stops early, without draining the
/// channel, if `cancel` fires.
pub async fn consume<R: Render + ?Sized>(
    mut posts: Receiver<Post>,
    renderer: &mut R,
    cancel: &CancellationToken,
) -> usize {
    let mut rendered = 0;

    loop {
        let post = tokio::select! {
            _ = cancel.cancelled() => break,
            post = posts.recv() => post,
        };
        let Some(post) = post else {
            break;
        };
        renderer.render(&post);
        rendered += 1;
    }

    debug!("rendered {rendered} posts");
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingRenderer;
    use tokio::sync::mpsc;

    fn post(id: &str) -> Post {
        Post::new(id, "Title", "https://example.com", "").with_comments::<String>(Ok(vec![
            String::from("a comment"),
        ]))
    }

    #[tokio::test]
    async fn it_renders_every_post_until_the_channel_closes() {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            for id in ["p1", "p2", "p3"] {
                tx.send(post(id)).await.unwrap();
            }
        });

        let mut renderer = RecordingRenderer::default();
        let rendered = consume(rx, &mut renderer, &CancellationToken::new()).await;

        assert_eq!(rendered, 3);
        let ids: Vec<_> = renderer.posts.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
        assert!(renderer.posts.iter().all(|p| p.comments().len() == 1));
    }

    #[tokio::test]
    async fn it_renders_nothing_from_a_closed_channel() {
        let (tx, rx) = mpsc::channel::<Post>(1);
        drop(tx);
        let mut renderer = RecordingRenderer::default();
        let rendered = consume(rx, &mut renderer, &CancellationToken::new()).await;
        assert_eq!(rendered, 0);
        assert!(renderer.posts.is_empty());
    }

    #[tokio::test]
    async fn it_stops_when_cancelled() {
        let (_tx, rx) = mpsc::channel::<Post>(1);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut renderer = RecordingRenderer::default();
        let rendered = consume(rx, &mut renderer, &cancel).await;
        assert_eq!(rendered, 0);
    }
}
