mod client;
pub use client::*;

mod fetch;
pub use fetch::*;


use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A single submission, reduced to the fields the scraper persists.
///
/// Field order is load-bearing: the CSV header row is derived from it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// The API-assigned identifier, such as "1abc2d".
    pub id: String,
    /// The title of the post.
    pub title: String,
    /// The score (upvotes - downvotes) the post has received.
    pub score: i64,
    /// The link target, or the post's own permalink for self posts.
    pub url: String,
    /// The number of comments at fetch time.
    pub num_comments: u64,
    /// The creation time, in UTC epoch seconds.
    pub created_utc: f64,
    /// The post body. Empty for link posts.
    pub selftext: String,
}

/// The listing orders a subreddit feed can be read in.
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum SortOrder {
    Hot,
    New,
    Top,
    Controversial,
}

impl SortOrder {
    /// The path segment of the listing endpoint for this order.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Hot => "hot",
            SortOrder::New => "new",
            SortOrder::Top => "top",
            SortOrder::Controversial => "controversial",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
