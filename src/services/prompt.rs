use crate::models::entities::{ChatMessage, Content};
use crate::services::helplines::HelplineRecord;

/// Word ceiling the crisis persona is told to stay under.
pub const CRISIS_WORD_LIMIT: usize = 60;

const SUPPORTIVE_PERSONA: &str = "\
You are BotCure, an empathetic and supportive AI mental health guide. \
Your personality is calm, wise, and thoughtful. \
Your goal is to listen, offer comfort, and provide gentle guidance. \
ALWAYS respond in well-structured markdown. \
Use hyphens (-) for lists and double asterisks (**) for bolding. \
If the user expresses sadness, validate their feelings and gently ask what they might prefer \
to talk about or if they'd like a calming exercise, rather than a long monologue.";

/// Which system instruction the provider receives for this turn.
#[derive(Debug, Clone, Copy)]
pub enum Persona<'a> {
    Crisis { helpline: &'a HelplineRecord },
    Supportive,
}

impl Persona<'_> {
    pub fn instruction(&self) -> String {
        match self {
            Self::Crisis { helpline } => format!(
                "You are a crisis intervention AI. Your only goal is to provide immediate, concise help. \
                 Acknowledge their pain in one sentence. \
                 Then, **IMMEDIATELY** provide the following helplines: {numbers}. \
                 Do not provide any other information or options. \
                 Keep the entire message under {CRISIS_WORD_LIMIT} words. Be direct and urgent.",
                numbers = helpline.joined_numbers(),
            ),
            Self::Supportive => SUPPORTIVE_PERSONA.to_string(),
        }
    }
}

/// Everything the generative provider needs for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPayload {
    pub system_instruction: String,
    pub history: Vec<Content>,
    pub new_message: Content,
}

impl ProviderPayload {
    /// Turns in send order: instruction, history oldest first, new message.
    ///
    /// The instruction travels as a leading user turn.
    pub fn contents(&self) -> Vec<Content> {
        let mut contents = Vec::with_capacity(self.history.len() + 2);
        contents.push(Content::user(self.system_instruction.clone()));
        contents.extend(self.history.iter().cloned());
        contents.push(self.new_message.clone());
        contents
    }
}

/// Reduce client history to provider turns carrying only role and parts.
pub fn normalize_history(history: &[ChatMessage]) -> Vec<Content> {
    history.iter().map(Content::from).collect()
}

pub fn compose(persona: Persona<'_>, history: &[ChatMessage], new_message: &str) -> ProviderPayload {
    ProviderPayload {
        system_instruction: persona.instruction(),
        history: normalize_history(history),
        new_message: Content::user(new_message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entities::{MessageRole, Part};
    use crate::services::helplines::{DEFAULT_HELPLINES, INDIA_HELPLINES, Region};

    fn message(role: MessageRole, text: &str, crisis: Option<bool>) -> ChatMessage {
        ChatMessage {
            role,
            parts: vec![Part::text(text)],
            crisis_detected: crisis,
        }
    }

    #[test]
    fn crisis_instruction_lists_every_number() {
        for record in [&INDIA_HELPLINES, &DEFAULT_HELPLINES] {
            let instruction = Persona::Crisis { helpline: record }.instruction();
            for number in record.numbers {
                assert!(instruction.contains(number), "missing {number}");
            }
            assert!(instruction.contains(&record.joined_numbers()));
        }
    }

    #[test]
    fn crisis_instruction_excludes_supportive_persona() {
        let instruction = Persona::Crisis {
            helpline: &DEFAULT_HELPLINES,
        }
        .instruction();
        assert!(!instruction.contains("BotCure"));
        assert!(!instruction.contains("markdown"));
        assert!(!instruction.contains("calming exercise"));
    }

    #[test]
    fn india_crisis_instruction_stays_under_word_limit() {
        let payload = compose(
            Persona::Crisis {
                helpline: Region::from_code("IND").helplines(),
            },
            &[],
            "I want to kill myself",
        );
        assert!(
            payload
                .system_instruction
                .contains("Kiran Helpline: 1800-599-0019")
        );
        let words = payload.system_instruction.split_whitespace().count();
        assert!(words < CRISIS_WORD_LIMIT, "instruction has {words} words");
    }

    #[test]
    fn supportive_instruction_carries_formatting_contract() {
        let instruction = Persona::Supportive.instruction();
        assert!(instruction.contains("markdown"));
        assert!(instruction.contains("hyphens (-)"));
        assert!(instruction.contains("double asterisks (**)"));
        assert!(instruction.contains("validate their feelings"));
        assert!(!instruction.contains("helplines"));
    }

    #[test]
    fn history_is_normalized_and_ordered() {
        let history = vec![
            message(MessageRole::User, "first", None),
            message(MessageRole::Model, "second", Some(true)),
            message(MessageRole::User, "third", None),
        ];

        let payload = compose(Persona::Supportive, &history, "fourth");
        let contents = payload.contents();

        assert_eq!(contents.len(), 5);
        assert_eq!(contents[0].role, MessageRole::User);
        assert_eq!(contents[0].parts[0].text, payload.system_instruction);
        let texts: Vec<&str> = contents[1..]
            .iter()
            .map(|c| c.parts[0].text.as_str())
            .collect();
        assert_eq!(texts, ["first", "second", "third", "fourth"]);
        assert_eq!(contents[2].role, MessageRole::Model);
        assert_eq!(contents[4].role, MessageRole::User);
    }

    #[test]
    fn normalized_entries_serialize_with_two_fields() {
        let history = vec![message(MessageRole::Model, "reply", Some(false))];
        for content in normalize_history(&history) {
            let value = serde_json::to_value(&content).unwrap();
            let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
            assert_eq!(keys.len(), 2);
            assert!(value.get("crisisDetected").is_none());
        }
    }

    #[test]
    fn compose_does_not_touch_input_history() {
        let history = vec![message(MessageRole::Model, "kept", Some(true))];
        let _ = compose(Persona::Supportive, &history, "next");
        assert_eq!(history[0].crisis_detected, Some(true));
    }
}
