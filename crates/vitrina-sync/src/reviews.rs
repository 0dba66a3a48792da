//! # Review Feed
//!
//! Per-product review list with submission. A small sibling of the catalog
//! engine: same published-state shape, same fail-fast authentication, but no
//! pagination. A product's reviews are fetched whole, newest first.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use vitrina_core::{validation, ErrorKind, Review};

use crate::config::CatalogConfig;
use crate::error::SyncResult;
use crate::source::{NewReview, ReviewSource, UserSession};

/// Fallback author name when the user profile has none.
const ANONYMOUS: &str = "Anonymous";

// =============================================================================
// Review Feed State
// =============================================================================

/// Published review-feed state.
#[derive(Debug, Clone, Default)]
pub struct ReviewFeedState {
    /// Reviews for the loaded product, newest first.
    pub reviews: Vec<Review>,

    /// True while a fetch or submission is in flight.
    pub is_loading: bool,

    /// Failure of the most recent operation, if any.
    pub error: Option<ErrorKind>,
}

// =============================================================================
// Review Feed
// =============================================================================

/// Loads and appends reviews for one product at a time.
pub struct ReviewFeed {
    source: Arc<dyn ReviewSource>,
    session: Arc<dyn UserSession>,
    timeout: std::time::Duration,
    timeout_secs: u64,
    state: Arc<RwLock<ReviewFeedState>>,
}

impl ReviewFeed {
    /// Creates a feed over the given review source.
    pub fn new(
        config: &CatalogConfig,
        source: Arc<dyn ReviewSource>,
        session: Arc<dyn UserSession>,
    ) -> Self {
        ReviewFeed {
            source,
            session,
            timeout: config.fetch_timeout(),
            timeout_secs: config.catalog.fetch_timeout_secs,
            state: Arc::new(RwLock::new(ReviewFeedState::default())),
        }
    }

    /// Returns a copy of the current published state.
    pub async fn state(&self) -> ReviewFeedState {
        self.state.read().await.clone()
    }

    /// Loads the reviews for one product, newest first.
    pub async fn load(&self, product_id: &str) -> SyncResult<()> {
        {
            let mut state = self.state.write().await;
            if state.is_loading {
                debug!(product_id, "Skipping review load, one is in flight");
                return Ok(());
            }
            state.is_loading = true;
            state.error = None;
        }

        let result = self
            .with_timeout(self.source.fetch_reviews(product_id))
            .await;

        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(reviews) => {
                debug!(product_id, count = reviews.len(), "Reviews loaded");
                state.reviews = reviews;
                Ok(())
            }
            Err(kind) => {
                warn!(product_id, error = %kind, "Review load failed");
                state.error = Some(kind.clone());
                Err(kind)
            }
        }
    }

    /// Submits a review and refreshes the list.
    ///
    /// Validates input before any I/O and fails fast without a signed-in
    /// user. The author's display name is resolved from the profile at
    /// submission time.
    pub async fn add(&self, product_id: &str, rating: u8, comment: &str) -> SyncResult<()> {
        validation::validate_rating(rating)?;
        let comment = validation::validate_comment(comment)?;

        let Some(user_id) = self.session.current_user_id() else {
            let mut state = self.state.write().await;
            state.error = Some(ErrorKind::Unauthenticated);
            return Err(ErrorKind::Unauthenticated);
        };

        let user_name = match self
            .with_timeout(self.source.fetch_user_name(&user_id))
            .await
        {
            Ok(Some(name)) => name,
            Ok(None) => ANONYMOUS.to_string(),
            Err(kind) => {
                // A missing display name should not block the submission.
                warn!(user_id = %user_id, error = %kind, "Could not resolve reviewer name");
                ANONYMOUS.to_string()
            }
        };

        let review = NewReview {
            user_id,
            user_name,
            rating,
            comment,
        };
        match self
            .with_timeout(self.source.add_review(product_id, review))
            .await
        {
            Ok(()) => {
                debug!(product_id, rating, "Review submitted");
                self.load(product_id).await
            }
            Err(kind) => {
                warn!(product_id, error = %kind, "Review submission failed");
                let mut state = self.state.write().await;
                state.error = Some(kind.clone());
                Err(kind)
            }
        }
    }

    async fn with_timeout<T, F>(&self, fut: F) -> SyncResult<T>
    where
        F: std::future::Future<Output = SyncResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ErrorKind::Timeout(self.timeout_secs)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
