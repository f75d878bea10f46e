//! The news feed: `GET /posts`, one page at a time.

use std::collections::HashSet;
use std::sync::Arc;

use souk_protocol::Post;
use souk_protocol::endpoints::POSTS;
use souk_session::ApiClient;
use souk_store::SessionStore;
use souk_transport::{ApiRequest, HttpTransport};

use crate::{FeedConfig, MarketError};

/// `GET /posts?page=&limit=`.
pub struct PostsApi<T, S> {
    client: Arc<ApiClient<T, S>>,
}

impl<T: HttpTransport, S: SessionStore> PostsApi<T, S> {
    pub fn new(client: Arc<ApiClient<T, S>>) -> Self {
        Self { client }
    }

    /// Fetches one page. Pages start at 1.
    pub async fn page(&self, page: u32, limit: u32) -> Result<Vec<Post>, MarketError> {
        let request = ApiRequest::get(POSTS).query("page", page).query("limit", limit);
        let posts: Option<Vec<Post>> = self.client.send_envelope(request).await?.data;
        Ok(posts.unwrap_or_default())
    }
}

/// Infinite-scroll state over [`PostsApi`].
///
/// ```text
///   reset() ──→ page 1 replaces everything
///   load_more() ──→ next page appended, posts already shown are skipped
/// ```
///
/// A page shorter than `page_size` means there is nothing after it. A
/// failed load also stops paging until the next `reset`, so a broken
/// backend isn't hammered by scroll events.
pub struct Feed<T, S> {
    api: PostsApi<T, S>,
    config: FeedConfig,
    posts: Vec<Post>,
    seen: HashSet<String>,
    next_page: u32,
    has_more: bool,
}

impl<T: HttpTransport, S: SessionStore> Feed<T, S> {
    pub fn new(api: PostsApi<T, S>, config: FeedConfig) -> Self {
        Self {
            api,
            config,
            posts: Vec::new(),
            seen: HashSet::new(),
            next_page: 1,
            has_more: true,
        }
    }

    /// Everything loaded so far, in feed order.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// The page `load_more` will ask for.
    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    /// Loads the next page. Returns how many new posts were added; 0
    /// without a request when the feed is exhausted.
    pub async fn load_more(&mut self) -> Result<usize, MarketError> {
        if !self.has_more {
            return Ok(0);
        }
        let page = self.fetch(self.next_page).await?;
        let before = self.posts.len();
        for post in page {
            if self.seen.insert(post.id.clone()) {
                self.posts.push(post);
            }
        }
        let added = self.posts.len() - before;
        tracing::debug!(page = self.next_page - 1, added, has_more = self.has_more, "feed page loaded");
        Ok(added)
    }

    /// Pull-to-refresh: reloads page 1 and replaces the feed with it.
    pub async fn reset(&mut self) -> Result<usize, MarketError> {
        self.posts.clear();
        self.seen.clear();
        self.next_page = 1;
        self.has_more = true;
        let page = self.fetch(1).await?;
        for post in page {
            if self.seen.insert(post.id.clone()) {
                self.posts.push(post);
            }
        }
        Ok(self.posts.len())
    }

    /// Fetches `page` and advances the cursor.
    async fn fetch(&mut self, page: u32) -> Result<Vec<Post>, MarketError> {
        let limit = self.config.page_size;
        match self.api.page(page, limit).await {
            Ok(posts) => {
                self.has_more = posts.len() == limit as usize;
                self.next_page = page + 1;
                Ok(posts)
            }
            Err(e) => {
                tracing::warn!(page, error = %e, "feed page failed");
                self.has_more = false;
                Err(e)
            }
        }
    }
}
