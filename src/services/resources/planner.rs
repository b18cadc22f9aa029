use crate::services::helplines::Region;

/// Appended to every article query after the crisis branch.
pub const ARTICLE_CONTEXT_SUFFIX: &str = "mental health support";
/// Appended to every video query after the crisis branch.
pub const VIDEO_CONTEXT_SUFFIX: &str = "mental wellness";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub article_query: String,
    pub video_query: String,
}

/// Derive the article and video queries for a resource lookup.
///
/// In a crisis the topic is ignored and safety resources are searched for
/// instead. The generic context suffixes are added in both branches.
pub fn plan(topic: &str, crisis: bool, region: Region) -> QueryPlan {
    let (article, video) = if crisis {
        let (article_area, video_area) = match region {
            Region::India => ("India", "India"),
            Region::Default => ("worldwide", ""),
        };
        (
            format!("crisis support helplines {article_area}"),
            format!(
                "grounding exercises for anxiety OR immediate stress relief techniques {video_area}"
            ),
        )
    } else {
        (
            format!("{topic} mental health articles"),
            format!("{topic} calming music OR mindfulness exercises"),
        )
    };

    QueryPlan {
        article_query: format!("{article} {ARTICLE_CONTEXT_SUFFIX}"),
        video_query: format!("{video} {VIDEO_CONTEXT_SUFFIX}"),
    }
}
