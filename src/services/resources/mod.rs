//! Resource augmentation: turn the conversation topic into filtered article
//! and video results.

pub mod filter;
pub mod planner;

use std::sync::Arc;

use crate::models::entities::SearchItem;
use crate::services::ai::ProviderError;
use crate::services::helplines::Region;
use crate::services::search::SearchProvider;

pub use filter::filter_videos;
pub use planner::{QueryPlan, plan};

pub const ARTICLE_COUNT: u8 = 3;
pub const VIDEO_COUNT: u8 = 2;
pub const VIDEO_SITE: &str = "youtube.com";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceBundle {
    pub articles: Vec<SearchItem>,
    pub videos: Vec<SearchItem>,
}

#[derive(Clone)]
pub struct ResourceService {
    provider: Arc<dyn SearchProvider>,
}

impl ResourceService {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Run both searches concurrently. A failed search contributes an empty
    /// list; it never fails the other one.
    pub async fn find(&self, topic: &str, crisis: bool, region: Region) -> ResourceBundle {
        let QueryPlan {
            article_query,
            video_query,
        } = plan(topic, crisis, region);

        let (articles, videos) = tokio::join!(
            self.provider.search(&article_query, ARTICLE_COUNT, None),
            self.provider
                .search(&video_query, VIDEO_COUNT, Some(VIDEO_SITE)),
        );

        let mut articles = or_empty(articles, "articles");
        articles.truncate(ARTICLE_COUNT as usize);

        let mut videos = filter_videos(or_empty(videos, "videos"), crisis);
        videos.truncate(VIDEO_COUNT as usize);

        ResourceBundle { articles, videos }
    }
}

fn or_empty(result: Result<Vec<SearchItem>, ProviderError>, kind: &str) -> Vec<SearchItem> {
    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, kind, "Search provider error");
        Vec::new()
    })
}
