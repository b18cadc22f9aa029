/// Phrases that flag a message as a crisis. Matched as lower-case substrings,
/// so "hang myself" also fires inside longer text. Negations still match.
pub const CRISIS_PHRASES: &[&str] = &[
    "kill myself",
    "suicide",
    "want to die",
    "end my life",
    "no reason to live",
    "self-harm",
    "harm myself",
    "jump from",
    "hang myself",
    "take my life",
];

/// Decides whether a single message indicates self-harm risk.
///
/// Implementations must be total over any input and must not keep state
/// between calls: every message is judged on its own.
pub trait CrisisClassifier: Send + Sync {
    fn classify(&self, message: &str) -> bool;
}

/// Keyword strategy: case-insensitive substring match against a phrase list.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    phrases: Vec<String>,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self::with_phrases(CRISIS_PHRASES.iter().copied())
    }

    pub fn with_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CrisisClassifier for KeywordClassifier {
    fn classify(&self, message: &str) -> bool {
        let lowered = message.to_lowercase();
        match self.phrases.iter().find(|p| lowered.contains(p.as_str())) {
            Some(phrase) => {
                tracing::debug!(phrase = %phrase, "Crisis phrase matched");
                true
            }
            None => false,
        }
    }
}
