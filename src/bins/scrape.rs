use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use reddit_scraper::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name of the subreddit to scrape (e.g. 'rust')
    #[arg(value_parser = clap::builder::NonEmptyStringValueParser::new())]
    subreddit: String,

    /// Sort order for the listing
    #[arg(long = "sort_type", value_enum, default_value_t = SortOrder::Hot)]
    sort_type: SortOrder,

    /// Number of posts to retrieve. Must be positive
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    limit: i64,

    /// Format for saving the output
    #[arg(long = "output_format", value_enum, default_value_t = OutputFormat::None)]
    output_format: OutputFormat,

    /// Name of the output file (matching extension appended when missing)
    #[arg(long = "output_file", default_value = "reddit_posts")]
    output_file: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.limit <= 0 {
        error!("Limit must be a positive integer.");
        return;
    }
    let limit = u32::try_from(args.limit).unwrap_or(u32::MAX);

    info!("Subreddit: {}", args.subreddit);
    info!("Sort type: {}", args.sort_type);
    info!("Limit: {}", args.limit);
    info!("Output format: {}", args.output_format);
    info!("Output file prefix: {}", args.output_file);

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(err) => {
            error!("Failed to resolve Reddit credentials: {err}");
            return;
        }
    };
    let session = match Session::connect(&credentials) {
        Ok(session) => session,
        Err(err) => {
            error!("Failed to initialize the Reddit session: {err}");
            return;
        }
    };
    match session.identity() {
        Some(name) => info!("Successfully authenticated as: {name}"),
        None => warn!("Authenticated for read-only access. Some functionality might be limited."),
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template(" [{elapsed_precise}] {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Collecting r/{}", args.subreddit));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = fetch_posts(&session, &args.subreddit, args.sort_type, limit);
    spinner.finish_and_clear();

    if let Some(err) = &outcome.error {
        warn!(
            "Fetch ended early; continuing with the {} posts collected before the error: {err}",
            outcome.posts.len()
        );
    }

    write_posts(&outcome.posts, args.output_format, &args.output_file);
}
