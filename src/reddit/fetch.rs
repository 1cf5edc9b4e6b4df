use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{Credentials, Post, ScrapeError, Session, SortOrder};

const TRENDING_FEED: &str = "popular";
const TRENDING_LIMIT: u32 = 10;

/// The one API operation the fetchers need: a bounded, sorted listing of a
/// feed's submissions. [`Session`] implements it against the live API; tests
/// substitute canned listings.
pub trait Listings {
    fn listing(&self, feed: &str, sort: SortOrder, limit: u32)
        -> Result<Vec<Value>, ScrapeError>;
}

impl Listings for Session {
    fn listing(
        &self,
        feed: &str,
        sort: SortOrder,
        limit: u32,
    ) -> Result<Vec<Value>, ScrapeError> {
        Session::listing(self, feed, sort, limit)
    }
}

/// What a listing fetch produced: every record decoded before the first
/// failure, plus the failure itself if one occurred.
///
/// A fetch never propagates an error. `error: None` is a complete run;
/// records alongside an error are a partial one, still worth serializing.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub posts: Vec<Post>,
    pub error: Option<ScrapeError>,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// One `kind: t3` child of a listing response.
#[derive(Debug, Deserialize)]
struct Thing {
    data: Submission,
}

/// The submission fields this tool consumes, as the API serializes them.
#[derive(Debug, Deserialize)]
struct Submission {
    id: String,
    title: String,
    score: i64,
    url: String,
    num_comments: u64,
    created_utc: f64,
    #[serde(default)]
    selftext: String,
}

impl From<Submission> for Post {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            title: submission.title,
            score: submission.score,
            url: submission.url,
            num_comments: submission.num_comments,
            created_utc: submission.created_utc,
            selftext: submission.selftext,
        }
    }
}

/// Fetch up to `limit` posts from `r/{subreddit}` under `sort`.
///
/// Submissions are decoded one at a time in API order; a failure partway
/// through stops iteration and leaves the records decoded so far in the
/// outcome.
pub fn fetch_posts(
    client: &impl Listings,
    subreddit: &str,
    sort: SortOrder,
    limit: u32,
) -> FetchOutcome {
    info!("Fetching {limit} posts from r/{subreddit} sorted by '{sort}'...");

    let children = match client.listing(subreddit, sort, limit) {
        Ok(children) => children,
        Err(err) => {
            error!("Error while fetching posts from r/{subreddit}: {err}");
            return FetchOutcome {
                posts: vec![],
                error: Some(err),
            };
        }
    };

    let mut outcome = FetchOutcome::default();
    for child in children {
        let submission = match serde_json::from_value::<Thing>(child) {
            Ok(thing) => thing.data,
            Err(err) => {
                error!("Malformed submission in r/{subreddit} listing: {err}");
                outcome.error = Some(err.into());
                break;
            }
        };
        let post = Post::from(submission);
        info!(
            "[{}] {} ({} points, {} comments)",
            post.id, post.title, post.score, post.num_comments
        );
        outcome.posts.push(post);
    }

    if outcome.is_complete() {
        if outcome.posts.is_empty() {
            info!("No posts found for r/{subreddit} with the current filters.");
        } else {
            info!("Successfully fetched {} posts.", outcome.posts.len());
        }
    }
    outcome
}

/// The titles of r/popular's hot posts, in listing order.
pub fn fetch_trend_titles(client: &impl Listings) -> Vec<String> {
    let outcome = fetch_posts(client, TRENDING_FEED, SortOrder::Hot, TRENDING_LIMIT);
    outcome.posts.into_iter().map(|post| post.title).collect()
}

/// Fetch the current trending post titles from r/popular.
///
/// Intended for programmatic callers, so it resolves its own credentials and
/// never propagates an error: whatever titles were collected (possibly none)
/// are returned, failures are logged.
pub fn fetch_trends() -> Vec<String> {
    info!("Fetching Reddit trends from r/{TRENDING_FEED}...");

    let session = match Credentials::from_env().and_then(|creds| Session::connect(&creds)) {
        Ok(session) => session,
        Err(err) => {
            error!("Failed to open a Reddit session for trends: {err}");
            return vec![];
        }
    };
    match session.identity() {
        Some(name) => debug!("Authenticated for trends fetch as: {name}"),
        None => warn!("Fetching trends with read-only access."),
    }

    let titles = fetch_trend_titles(&session);
    if titles.is_empty() {
        info!("No trending posts found or r/{TRENDING_FEED} is inaccessible.");
    } else {
        info!("Successfully fetched {} trending posts.", titles.len());
    }
    titles
}
