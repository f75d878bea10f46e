//! Market configuration.

use std::time::Duration;

// ---------------------------------------------------------------------------
// FeedConfig
// ---------------------------------------------------------------------------

/// Configuration for the news feed paginator.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Posts requested per page. A page shorter than this is the last one.
    pub page_size: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

// ---------------------------------------------------------------------------
// ProfileConfig
// ---------------------------------------------------------------------------

/// How hard the edit-profile screen tries to load the profile.
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    /// Total attempts, including the first. Values below 1 count as 1.
    pub fetch_attempts: u32,

    /// Pause between attempts.
    pub retry_delay: Duration,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            fetch_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}
