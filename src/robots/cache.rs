//! Robots.txt caching implementation
//!
//! A session fetches robots.txt once; the result is kept with the time it
//! was obtained and, for fail-open results, the reason the fetch failed.

use crate::robots::ParsedRobots;
use chrono::{DateTime, Duration, Utc};

/// Cached robots.txt data for the target site
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt content
    pub content: ParsedRobots,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,

    /// Why the fetch failed, when `content` is the allow-all fallback
    pub warning: Option<String>,
}

impl CachedRobots {
    /// Creates a new CachedRobots instance stamped with the current time
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Utc::now(),
            warning: None,
        }
    }

    /// Allow-all rules used when robots.txt could not be fetched
    pub fn fail_open(reason: impl Into<String>) -> Self {
        Self {
            content: ParsedRobots::allow_all(),
            fetched_at: Utc::now(),
            warning: Some(reason.into()),
        }
    }

    /// True when these rules are the allow-all fallback
    pub fn is_fail_open(&self) -> bool {
        self.warning.is_some()
    }

    /// Returns the age of the cached robots.txt
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    /// Checks if a request path is allowed according to the cached robots.txt
    pub fn is_allowed(&self, path: &str) -> bool {
        self.content.is_allowed(path)
    }
}
