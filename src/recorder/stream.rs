use serde::{Deserialize, Serialize};

const REASONING_MARKER: &str = "\n[Reasoning]\n";

/// One streamed delta of a chat completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Accumulates streamed deltas into the text that gets recorded.
#[derive(Debug, Clone, Default)]
pub struct StreamContentCollector {
    content: String,
}

impl StreamContentCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_chunk(&mut self, delta: &StreamDelta) {
        if let Some(content) = &delta.content {
            self.content.push_str(content);
        }
        for reasoning in [&delta.reasoning_content, &delta.reasoning]
            .into_iter()
            .flatten()
        {
            self.content.push_str(REASONING_MARKER);
            self.content.push_str(reasoning);
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

/// The message of one non-streamed choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    /// Plain text, or an array of content parts.
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Text to record for a complete (non-streamed) response.
///
/// String content is appended as-is; structured content is appended as JSON.
/// Reasoning text follows its choice's content behind a marker line.
pub fn extract_response_content(choices: &[ChoiceMessage]) -> String {
    let mut content = String::new();
    for choice in choices {
        match &choice.content {
            Some(serde_json::Value::String(text)) => content.push_str(text),
            Some(parts @ serde_json::Value::Array(_)) => content.push_str(&parts.to_string()),
            _ => {}
        }
        for reasoning in [&choice.reasoning_content, &choice.reasoning]
            .into_iter()
            .flatten()
            .filter(|r| !r.is_empty())
        {
            content.push_str(REASONING_MARKER);
            content.push_str(reasoning);
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collector_concatenates_content() {
        let mut collector = StreamContentCollector::new();
        for piece in ["Hel", "lo", "!"] {
            collector.add_chunk(&StreamDelta {
                content: Some(piece.into()),
                ..StreamDelta::default()
            });
        }
        assert_eq!(collector.content(), "Hello!");
    }

    #[test]
    fn collector_marks_reasoning() {
        let mut collector = StreamContentCollector::new();
        collector.add_chunk(&StreamDelta {
            reasoning_content: Some("think".into()),
            ..StreamDelta::default()
        });
        collector.add_chunk(&StreamDelta {
            content: Some("answer".into()),
            ..StreamDelta::default()
        });
        assert_eq!(collector.into_content(), "\n[Reasoning]\nthinkanswer");
    }

    #[test]
    fn deltas_parse_from_wire_json() {
        let delta: StreamDelta = serde_json::from_value(json!({ "content": "x" })).unwrap();
        assert_eq!(delta.content.as_deref(), Some("x"));
        assert!(delta.reasoning.is_none());
    }

    #[test]
    fn extract_handles_text_parts_and_reasoning() {
        let choices = vec![
            ChoiceMessage {
                content: Some(json!("plain")),
                reasoning: Some("why".into()),
                ..ChoiceMessage::default()
            },
            ChoiceMessage {
                content: Some(json!([{ "type": "text", "text": "part" }])),
                ..ChoiceMessage::default()
            },
        ];
        let content = extract_response_content(&choices);
        assert!(content.starts_with("plain\n[Reasoning]\nwhy"));
        assert!(content.ends_with(r#"[{"text":"part","type":"text"}]"#));
    }

    #[test]
    fn extract_of_nothing_is_empty() {
        assert!(extract_response_content(&[]).is_empty());
        assert!(extract_response_content(&[ChoiceMessage::default()]).is_empty());
    }
}
