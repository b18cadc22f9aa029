use crate::models::entities::SearchItem;

/// Terms that exclude a video when found in its title or snippet.
pub const NEGATIVE_VIDEO_KEYWORDS: &[&str] = &[
    "death",
    "suicide",
    "kill yourself",
    "depressing",
    "sad songs",
    "breakup",
    "heartbreak",
    "grief",
    "alone",
    "lonely",
    "dark",
    "stressful life",
    "fight",
    "anger",
];

struct SafeResource {
    title: &'static str,
    link: &'static str,
    snippet: &'static str,
}

const SAFE_FALLBACK_VIDEOS: &[SafeResource] = &[
    SafeResource {
        title: "Guided Breathing for Stress Relief",
        link: "https://www.youtube.com/watch?v=Qtb1HDg1z-8",
        snippet: "A simple guided breathing exercise to calm your mind.",
    },
    SafeResource {
        title: "5-Minute Guided Meditation for Anxiety",
        link: "https://www.youtube.com/watch?v=MKp7C3mQx3U",
        snippet: "Quick meditation to help reduce feelings of anxiety.",
    },
];

pub fn safe_fallback_videos() -> Vec<SearchItem> {
    SAFE_FALLBACK_VIDEOS
        .iter()
        .map(|r| SearchItem {
            title: r.title.to_string(),
            link: r.link.to_string(),
            snippet: r.snippet.to_string(),
        })
        .collect()
}

/// One row of the video substitution policy: when `applies` holds for the
/// filtered list, it is replaced by `substitute()`.
struct FallbackRule {
    name: &'static str,
    applies: fn(crisis: bool, videos: &[SearchItem]) -> bool,
    substitute: fn() -> Vec<SearchItem>,
}

fn crisis_left_empty(crisis: bool, videos: &[SearchItem]) -> bool {
    crisis && videos.is_empty()
}

const VIDEO_FALLBACK_POLICY: &[FallbackRule] = &[FallbackRule {
    name: "crisis_without_safe_videos",
    applies: crisis_left_empty,
    substitute: safe_fallback_videos,
}];

pub fn is_safe_video(item: &SearchItem) -> bool {
    let title = item.title.to_lowercase();
    let snippet = item.snippet.to_lowercase();
    !NEGATIVE_VIDEO_KEYWORDS
        .iter()
        .any(|k| title.contains(k) || snippet.contains(k))
}

/// Drop unsafe-looking videos, then apply the fallback policy.
pub fn filter_videos(videos: Vec<SearchItem>, crisis: bool) -> Vec<SearchItem> {
    let safe: Vec<SearchItem> = videos.into_iter().filter(is_safe_video).collect();

    match VIDEO_FALLBACK_POLICY
        .iter()
        .find(|rule| (rule.applies)(crisis, &safe))
    {
        Some(rule) => {
            tracing::info!(rule = rule.name, "Substituting fallback videos");
            (rule.substitute)()
        }
        None => safe,
    }
}
