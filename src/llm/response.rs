//! Response parsing for the correction endpoint.
//!
//! Which body shape to expect is decided by configuration:
//!
//! | [`ResponseMode`] | Body                                   |
//! |------------------|----------------------------------------|
//! | `Single`         | one JSON object                        |
//! | `Lines`          | newline-delimited JSON chunks          |
//!
//! and which field carries the text by [`Endpoint`] (`message.content` for
//! chat, `response` for generate).  In `Lines` mode the chunk texts are
//! concatenated in order and `done` plus metadata come from the last chunk.

use serde::Deserialize;

use crate::config::{Endpoint, ResponseMode};

use super::CorrectionError;

/// Timing and usage figures reported by the server.
///
/// Informational only; the workflow logs them and nothing else reads them.
/// Durations are nanoseconds, as Ollama reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CorrectionMetadata {
    pub model: Option<String>,
    pub created_at: Option<String>,
    pub total_duration: Option<u64>,
    pub load_duration: Option<u64>,
    pub prompt_eval_count: Option<u64>,
    pub prompt_eval_duration: Option<u64>,
    pub eval_count: Option<u64>,
    pub eval_duration: Option<u64>,
}

/// Outcome of a successful correction call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionResult {
    /// Corrected text, exactly as the server returned it.
    pub text: String,
    /// Whether the server marked the completion as finished.
    pub done: bool,
    pub metadata: CorrectionMetadata,
}

#[derive(Deserialize)]
struct ChatMessageOut {
    content: String,
}

#[derive(Deserialize)]
struct ChatChunk {
    message: ChatMessageOut,
    #[serde(default)]
    done: bool,
    #[serde(flatten)]
    metadata: CorrectionMetadata,
}

#[derive(Deserialize)]
struct GenerateChunk {
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(flatten)]
    metadata: CorrectionMetadata,
}

/// Parse a complete response body.
///
/// # Errors
///
/// [`CorrectionError::MalformedResponse`] when the body (or any line of it in
/// `Lines` mode) does not match the expected shape, or `Lines` mode yields no
/// chunks at all or stops before a chunk with `done: true`.
pub fn parse_response(
    body: &str,
    endpoint: Endpoint,
    mode: ResponseMode,
) -> Result<CorrectionResult, CorrectionError> {
    match mode {
        ResponseMode::Single => parse_chunk(body, endpoint),
        ResponseMode::Lines => {
            let mut merged: Option<CorrectionResult> = None;
            for (index, line) in body.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let chunk = parse_chunk(line, endpoint).map_err(|e| match e {
                    CorrectionError::MalformedResponse(msg) => {
                        CorrectionError::MalformedResponse(format!("line {}: {msg}", index + 1))
                    }
                    other => other,
                })?;
                merged = Some(match merged {
                    None => chunk,
                    Some(mut acc) => {
                        acc.text.push_str(&chunk.text);
                        acc.done = chunk.done;
                        acc.metadata = chunk.metadata;
                        acc
                    }
                });
            }
            let merged = merged
                .ok_or_else(|| CorrectionError::MalformedResponse("empty response body".into()))?;
            if !merged.done {
                return Err(CorrectionError::MalformedResponse(
                    "stream ended before done".into(),
                ));
            }
            Ok(merged)
        }
    }
}

fn parse_chunk(json: &str, endpoint: Endpoint) -> Result<CorrectionResult, CorrectionError> {
    let malformed = |e: serde_json::Error| CorrectionError::MalformedResponse(e.to_string());
    match endpoint {
        Endpoint::Chat => {
            let chunk: ChatChunk = serde_json::from_str(json).map_err(malformed)?;
            Ok(CorrectionResult {
                text: chunk.message.content,
                done: chunk.done,
                metadata: chunk.metadata,
            })
        }
        Endpoint::Generate => {
            let chunk: GenerateChunk = serde_json::from_str(json).map_err(malformed)?;
            Ok(CorrectionResult {
                text: chunk.response,
                done: chunk.done,
                metadata: chunk.metadata,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT_SINGLE: &str = r#"{
        "model": "mistral",
        "created_at": "2024-03-01T10:00:00Z",
        "message": { "role": "assistant", "content": "There are three apples." },
        "done": true,
        "total_duration": 5000000,
        "load_duration": 1000,
        "prompt_eval_count": 42,
        "prompt_eval_duration": 2000,
        "eval_count": 7,
        "eval_duration": 3000
    }"#;

    #[test]
    fn chat_single_object() {
        let result = parse_response(CHAT_SINGLE, Endpoint::Chat, ResponseMode::Single).unwrap();
        assert_eq!(result.text, "There are three apples.");
        assert!(result.done);
        assert_eq!(result.metadata.model.as_deref(), Some("mistral"));
        assert_eq!(result.metadata.eval_count, Some(7));
        assert_eq!(result.metadata.total_duration, Some(5_000_000));
    }

    #[test]
    fn text_is_not_trimmed() {
        let body = r#"{"message":{"role":"assistant","content":"  spaced \n"},"done":true}"#;
        let result = parse_response(body, Endpoint::Chat, ResponseMode::Single).unwrap();
        assert_eq!(result.text, "  spaced \n");
    }

    #[test]
    fn metadata_is_optional() {
        let body = r#"{"message":{"role":"assistant","content":"ok"}}"#;
        let result = parse_response(body, Endpoint::Chat, ResponseMode::Single).unwrap();
        assert!(!result.done);
        assert_eq!(result.metadata, CorrectionMetadata::default());
    }

    #[test]
    fn missing_content_is_malformed() {
        let body = r#"{"message":{"role":"assistant"},"done":true}"#;
        let err = parse_response(body, Endpoint::Chat, ResponseMode::Single).unwrap_err();
        assert!(matches!(err, CorrectionError::MalformedResponse(_)));
    }

    #[test]
    fn missing_message_is_malformed() {
        let body = r#"{"done":true,"eval_count":3}"#;
        let err = parse_response(body, Endpoint::Chat, ResponseMode::Single).unwrap_err();
        assert!(matches!(err, CorrectionError::MalformedResponse(_)));
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_response("<html>502</html>", Endpoint::Chat, ResponseMode::Single)
            .unwrap_err();
        assert!(matches!(err, CorrectionError::MalformedResponse(_)));
    }

    #[test]
    fn generate_single_object() {
        let body = r#"{"model":"mistral","response":"Fixed.","done":true,"eval_count":2}"#;
        let result = parse_response(body, Endpoint::Generate, ResponseMode::Single).unwrap();
        assert_eq!(result.text, "Fixed.");
        assert_eq!(result.metadata.eval_count, Some(2));
    }

    #[test]
    fn chat_body_is_not_accepted_as_generate() {
        let err = parse_response(CHAT_SINGLE, Endpoint::Generate, ResponseMode::Single)
            .unwrap_err();
        assert!(matches!(err, CorrectionError::MalformedResponse(_)));
    }

    #[test]
    fn lines_are_concatenated_and_last_chunk_wins() {
        let body = concat!(
            r#"{"message":{"role":"assistant","content":"There "},"done":false}"#,
            "\n",
            r#"{"message":{"role":"assistant","content":"are three "},"done":false}"#,
            "\n\n",
            r#"{"message":{"role":"assistant","content":"apples."},"done":true,"eval_count":9}"#,
            "\n"
        );
        let result = parse_response(body, Endpoint::Chat, ResponseMode::Lines).unwrap();
        assert_eq!(result.text, "There are three apples.");
        assert!(result.done);
        assert_eq!(result.metadata.eval_count, Some(9));
    }

    #[test]
    fn generate_lines() {
        let body = "{\"response\":\"Hel\",\"done\":false}\n{\"response\":\"lo\",\"done\":true}";
        let result = parse_response(body, Endpoint::Generate, ResponseMode::Lines).unwrap();
        assert_eq!(result.text, "Hello");
    }

    #[test]
    fn bad_line_is_malformed_with_line_number() {
        let body = "{\"response\":\"a\",\"done\":false}\nnot json";
        let err = parse_response(body, Endpoint::Generate, ResponseMode::Lines).unwrap_err();
        match err {
            CorrectionError::MalformedResponse(msg) => assert!(msg.starts_with("line 2:")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_lines_body_is_malformed() {
        let err = parse_response("\n\n", Endpoint::Chat, ResponseMode::Lines).unwrap_err();
        assert!(matches!(err, CorrectionError::MalformedResponse(_)));
    }

    #[test]
    fn truncated_stream_is_malformed() {
        let body = "{\"response\":\"There\",\"done\":false}\n";
        let err = parse_response(body, Endpoint::Generate, ResponseMode::Lines).unwrap_err();
        match err {
            CorrectionError::MalformedResponse(msg) => assert!(msg.contains("before done")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
