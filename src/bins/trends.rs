use tracing_subscriber::EnvFilter;

use reddit_scraper::fetch_trends;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let trends = fetch_trends();
    if trends.is_empty() {
        return;
    }

    println!("Top Reddit Trends:");
    for (i, title) in trends.iter().enumerate() {
        println!("{}. {title}", i + 1);
    }
}
