//! Drives the command-line program.

use crate::http::HTTPClientFactory;
use crate::pipeline::{Pipeline, PipelineOptions, TerminalRenderer};
use crate::reddit::client::RedditClient;
use crate::reddit::service::RedditService;
use crate::retry::RetryPolicy;
use crate::view::ViewOptions;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use log::{debug, warn};
use std::process;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub fn die(error_code: i32, message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(error_code);
}

/// Program configuration.
#[derive(Debug, Parser)]
#[command(version)]
#[command(about = "Streams a subreddit's top posts and their top comments", long_about = None)]
pub struct Config {
    #[command(flatten)]
    verbosity: Verbosity,

    /// Subreddit to read, without the "r/" prefix
    #[arg(default_value = "all")]
    subreddit: String,

    /// Number of comments to show for each post
    #[arg(short = 'c', long = "comments", default_value_t = 5)]
    comments: usize,

    /// Number of posts to show
    #[arg(short = 'n', long = "posts", default_value_t = 10)]
    posts: usize,

    /// Number of posts to request per page
    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Maximum number of comment requests in flight at once
    #[arg(short = 'j', long, default_value_t = 8)]
    concurrency: usize,

    /// Give up on a rate-limited request after this many attempts
    #[arg(long, default_value_t = 5)]
    max_retries: u32,

    /// Abandon requests that take longer than this many seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    timeout: u64,

    /// Show the body of self posts
    #[arg(long, default_value_t = false)]
    selftext: bool,

    /// Do not wrap comments to the width of the terminal
    #[arg(long, default_value_t = false)]
    no_wrap: bool,
}

impl Config {
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Options for the fetch pipeline.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions::build()
            .subreddit(self.subreddit.trim_start_matches("r/"))
            .comment_limit(self.comments)
            .target(self.posts)
            .page_size(self.page_size)
            .max_concurrency(self.concurrency)
            .build()
    }

    /// Options for drawing posts.
    pub fn view_options(&self) -> ViewOptions {
        let builder = ViewOptions::build().selftext(self.selftext);
        let builder = if self.no_wrap {
            builder
        } else {
            builder.wrap_to_terminal()
        };
        builder.build()
    }

    /// How rate-limited requests are retried.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default().max_attempts(self.max_retries)
    }

    /// Factory for the HTTP clients used to talk to Reddit.
    pub fn client_factory(&self) -> HTTPClientFactory {
        HTTPClientFactory::default().timeout(Duration::from_secs(self.timeout))
    }
}

/// Runs the command-line program using the given `config`.
///
/// Pressing Ctrl-C stops the run after the posts already in hand have been
/// drawn.
pub async fn run(config: Config) {
    let service = RedditService::new(&config.client_factory());
    let client = RedditClient::new_with_service(service, config.retry_policy());
    let pipeline = Pipeline::new(client, config.pipeline_options());
    let mut renderer = TerminalRenderer::new(config.view_options());

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping");
            canceller.cancel();
        }
    });

    match pipeline.run(&mut renderer, &cancel).await {
        Ok(summary) => debug!("done: {summary:?}"),
        Err(err) if err.is_cancelled() => die(130, "Cancelled"),
        Err(err) => die(1, &err.to_string()),
    }
}
