use clap::Parser;
use redditstream::cli::Config;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    env_logger::Builder::new()
        .filter_level(config.verbosity().log_level_filter())
        .init();
    redditstream::cli::run(config).await
}
