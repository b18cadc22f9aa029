use std::sync::Arc;

use crate::models::entities::ChatMessage;
use crate::services::ai::{AiProvider, ProviderError};
use crate::services::crisis::CrisisClassifier;
use crate::services::helplines::{HelplineRecord, Region};
use crate::services::prompt::{self, Persona};

/// Reply used when the provider answers successfully but without text.
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't process that. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub reply: String,
    pub crisis_detected: bool,
    /// Set whenever a crisis was detected, regardless of what the provider said.
    pub helpline: Option<&'static HelplineRecord>,
}

/// Provider failure for a turn whose classification already ran.
#[derive(Debug, thiserror::Error)]
#[error("chat turn failed (crisis_detected={crisis_detected}): {source}")]
pub struct DispatchError {
    pub crisis_detected: bool,
    pub helpline: Option<&'static HelplineRecord>,
    #[source]
    pub source: ProviderError,
}

impl DispatchError {
    pub fn is_configuration(&self) -> bool {
        matches!(self.source, ProviderError::NotConfigured)
    }
}

/// Classifier → helplines → prompt → provider, for one stateless turn.
#[derive(Clone)]
pub struct ConversationDispatcher {
    classifier: Arc<dyn CrisisClassifier>,
    provider: Arc<dyn AiProvider>,
}

impl ConversationDispatcher {
    pub fn new(classifier: Arc<dyn CrisisClassifier>, provider: Arc<dyn AiProvider>) -> Self {
        Self {
            classifier,
            provider,
        }
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_configured()
    }

    pub async fn handle(
        &self,
        message: &str,
        history: &[ChatMessage],
        region: Region,
    ) -> Result<ChatOutcome, DispatchError> {
        let crisis_detected = self.classifier.classify(message);

        let (persona, helpline) = if crisis_detected {
            tracing::warn!(region = region.as_ref(), "Crisis language detected");
            let helpline = region.helplines();
            (Persona::Crisis { helpline }, Some(helpline))
        } else {
            (Persona::Supportive, None)
        };

        let payload = prompt::compose(persona, history, message);

        let reply = self
            .provider
            .generate(&payload)
            .await
            .map_err(|source| {
                tracing::error!(error = %source, crisis_detected, "AI generation failed");
                DispatchError {
                    crisis_detected,
                    helpline,
                    source,
                }
            })?
            .unwrap_or_else(|| {
                tracing::warn!(crisis_detected, "AI returned no usable text, using fallback");
                FALLBACK_REPLY.to_string()
            });

        Ok(ChatOutcome {
            reply,
            crisis_detected,
            helpline,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::entities::{MessageRole, Part};
    use crate::services::crisis::KeywordClassifier;
    use crate::services::helplines::{DEFAULT_HELPLINES, INDIA_HELPLINES};
    use crate::services::prompt::ProviderPayload;

    enum Script {
        Reply(&'static str),
        Empty,
        Fail,
        Unconfigured,
    }

    struct FakeProvider {
        script: Script,
        seen: Mutex<Vec<ProviderPayload>>,
    }

    impl FakeProvider {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last_payload(&self) -> ProviderPayload {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl AiProvider for FakeProvider {
        async fn generate(
            &self,
            payload: &ProviderPayload,
        ) -> Result<Option<String>, ProviderError> {
            self.seen.lock().unwrap().push(payload.clone());
            match self.script {
                Script::Reply(text) => Ok(Some(text.to_string())),
                Script::Empty => Ok(None),
                Script::Fail => Err(ProviderError::Status {
                    status: 500,
                    message: "boom".into(),
                }),
                Script::Unconfigured => Err(ProviderError::NotConfigured),
            }
        }

        fn is_configured(&self) -> bool {
            !matches!(self.script, Script::Unconfigured)
        }
    }

    fn dispatcher(provider: Arc<FakeProvider>) -> ConversationDispatcher {
        ConversationDispatcher::new(Arc::new(KeywordClassifier::new()), provider)
    }

    #[tokio::test]
    async fn crisis_message_uses_regional_helplines() {
        let provider = FakeProvider::new(Script::Reply("Please call now."));
        let outcome = dispatcher(provider.clone())
            .handle("I want to kill myself", &[], Region::India)
            .await
            .unwrap();

        assert!(outcome.crisis_detected);
        assert_eq!(outcome.reply, "Please call now.");
        assert_eq!(outcome.helpline, Some(&INDIA_HELPLINES));

        let payload = provider.last_payload();
        assert!(
            payload
                .system_instruction
                .contains("Kiran Helpline: 1800-599-0019")
        );
        assert_eq!(payload.new_message.parts[0].text, "I want to kill myself");
    }

    #[tokio::test]
    async fn crisis_without_region_uses_default_helplines() {
        let provider = FakeProvider::new(Script::Reply("ok"));
        let outcome = dispatcher(provider.clone())
            .handle("there is no reason to live", &[], Region::Default)
            .await
            .unwrap();

        assert_eq!(outcome.helpline, Some(&DEFAULT_HELPLINES));
        assert!(provider.last_payload().system_instruction.contains("US/Canada: 988"));
    }

    #[tokio::test]
    async fn ordinary_message_uses_supportive_persona() {
        let provider = FakeProvider::new(Script::Reply("I'm here for you."));
        let history = vec![ChatMessage {
            role: MessageRole::Model,
            parts: vec![Part::text("Earlier reply")],
            crisis_detected: Some(true),
        }];

        let outcome = dispatcher(provider.clone())
            .handle("exams are stressing me out", &history, Region::India)
            .await
            .unwrap();

        assert!(!outcome.crisis_detected);
        assert!(outcome.helpline.is_none());
        let payload = provider.last_payload();
        assert!(payload.system_instruction.contains("BotCure"));
        assert_eq!(payload.history.len(), 1);
    }

    #[tokio::test]
    async fn prior_crisis_does_not_carry_over() {
        let provider = FakeProvider::new(Script::Reply("ok"));
        let dispatcher = dispatcher(provider);

        let first = dispatcher
            .handle("I want to end my life", &[], Region::Default)
            .await
            .unwrap();
        let second = dispatcher
            .handle("thanks, I called them", &[], Region::Default)
            .await
            .unwrap();

        assert!(first.crisis_detected);
        assert!(!second.crisis_detected);
    }

    #[tokio::test]
    async fn empty_provider_reply_falls_back_to_apology() {
        let provider = FakeProvider::new(Script::Empty);
        let outcome = dispatcher(provider)
            .handle("suicide", &[], Region::Default)
            .await
            .unwrap();

        assert_eq!(outcome.reply, FALLBACK_REPLY);
        assert!(outcome.crisis_detected);
    }

    #[tokio::test]
    async fn provider_failure_keeps_crisis_flag() {
        let provider = FakeProvider::new(Script::Fail);
        let err = dispatcher(provider)
            .handle("I might harm myself", &[], Region::India)
            .await
            .unwrap_err();

        assert!(err.crisis_detected);
        assert_eq!(err.helpline, Some(&INDIA_HELPLINES));
        assert!(!err.is_configuration());
    }

    #[tokio::test]
    async fn missing_credentials_surface_as_configuration() {
        let provider = FakeProvider::new(Script::Unconfigured);
        let dispatcher = dispatcher(provider);
        assert!(!dispatcher.provider_configured());

        let err = dispatcher
            .handle("hello", &[], Region::Default)
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(!err.crisis_detected);
        assert!(err.helpline.is_none());
    }
}
