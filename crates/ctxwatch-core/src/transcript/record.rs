use serde::Deserialize;

/// Role/type tag of agent-authored turns
const ASSISTANT: &str = "assistant";

/// One transcript line, decoded with every field optional
///
/// Host transcripts mix many record shapes (user turns, tool results,
/// summaries, snapshots). Only the fields below are looked at.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptRecord {
    /// Record type tag ("user", "assistant", "summary", ...)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Bare role tag, for transcripts that put it at the top level
    #[serde(default)]
    pub role: Option<String>,
    /// API message wrapped by the record
    #[serde(default)]
    pub message: Option<RecordMessage>,
    /// Usage at the top level, for flattened transcripts
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// The model message embedded in a transcript record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// Token accounting reported by the provider for one response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    /// Direct input tokens (non-cached)
    #[serde(default)]
    pub input_tokens: Option<u64>,
    /// Tokens read from cache
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
    /// Tokens written to cache
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
    /// Output tokens generated (not part of resident context)
    #[serde(default)]
    pub output_tokens: Option<u64>,
}

impl TranscriptRecord {
    /// Whether the record is a turn authored by the agent itself
    pub fn is_agent_turn(&self) -> bool {
        [
            self.kind.as_deref(),
            self.role.as_deref(),
            self.message.as_ref().and_then(|m| m.role.as_deref()),
        ]
        .contains(&Some(ASSISTANT))
    }

    /// Usage sub-record, preferring the one nested in `message`
    pub fn usage(&self) -> Option<&TokenUsage> {
        self.message
            .as_ref()
            .and_then(|m| m.usage.as_ref())
            .or(self.usage.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_record_with_nested_usage() {
        let line = r#"{"type":"assistant","uuid":"u1","message":{"id":"msg_1","role":"assistant","model":"claude-sonnet-4","content":[{"type":"text","text":"done"}],"usage":{"input_tokens":12,"cache_creation_input_tokens":300,"cache_read_input_tokens":4000,"output_tokens":55,"service_tier":"standard"}}}"#;
        let record: TranscriptRecord = serde_json::from_str(line).unwrap();
        assert!(record.is_agent_turn());
        let usage = record.usage().unwrap();
        assert_eq!(usage.input_tokens, Some(12));
        assert_eq!(usage.cache_read_input_tokens, Some(4000));
        assert_eq!(usage.cache_creation_input_tokens, Some(300));
        assert_eq!(usage.output_tokens, Some(55));
    }

    #[test]
    fn test_user_record_is_not_agent_turn() {
        let line = r#"{"type":"user","message":{"role":"user","content":"hi"}}"#;
        let record: TranscriptRecord = serde_json::from_str(line).unwrap();
        assert!(!record.is_agent_turn());
        assert!(record.usage().is_none());
    }

    #[test]
    fn test_flat_record_with_top_level_role_and_usage() {
        let line = r#"{"role":"assistant","usage":{"input_tokens":7}}"#;
        let record: TranscriptRecord = serde_json::from_str(line).unwrap();
        assert!(record.is_agent_turn());
        assert_eq!(record.usage().unwrap().input_tokens, Some(7));
        assert_eq!(record.usage().unwrap().cache_read_input_tokens, None);
    }

    #[test]
    fn test_summary_record_without_message() {
        let line = r#"{"type":"summary","summary":"Refactor parser","leafUuid":"x"}"#;
        let record: TranscriptRecord = serde_json::from_str(line).unwrap();
        assert!(!record.is_agent_turn());
        assert!(record.usage().is_none());
    }

    #[test]
    fn test_non_numeric_counter_fails_decode() {
        let line = r#"{"type":"assistant","message":{"usage":{"input_tokens":"lots"}}}"#;
        assert!(serde_json::from_str::<TranscriptRecord>(line).is_err());
    }
}
