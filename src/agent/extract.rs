//! Final answer extraction
//!
//! Maps the terminal message's payload to the user-facing [`Answer`].

use serde_json::Value;

use crate::core::{
    Answer, Message, Result, StructuredPayload, TriageError, CLU_RESULT, CQA_RESULT,
};

/// Extract the answer carried by the terminal message
///
/// - `cqa_result`: the first QA answer
/// - `clu_result`: a classification with no route taken is a routing error
/// - any other `type`: [`TriageError::UnexpectedDiscriminator`]
/// - no `type`: the leaf agent's `response` body
pub fn extract_answer(message: &Message) -> Result<Answer> {
    let payload = message.payload()?;

    match payload.kind() {
        Some(CQA_RESULT) => qa_answer(&payload),
        Some(CLU_RESULT) => Err(TriageError::routing(format!(
            "intent '{}' was classified but never routed",
            payload.top_intent().unwrap_or("unknown")
        ))),
        Some(other) => Err(TriageError::UnexpectedDiscriminator(other.to_string())),
        None => leaf_answer(&payload),
    }
}

/// `response.answers[0].answer`
fn qa_answer(payload: &StructuredPayload) -> Result<Answer> {
    payload
        .response()
        .and_then(|r| r.pointer("/answers/0/answer"))
        .and_then(Value::as_str)
        .map(|a| Answer::Text(a.to_string()))
        .ok_or_else(|| TriageError::parse("cqa_result payload has no answers[0].answer"))
}

fn leaf_answer(payload: &StructuredPayload) -> Result<Answer> {
    match payload.response() {
        Some(Value::String(text)) => Ok(Answer::Text(text.clone())),
        Some(Value::Array(items)) => Ok(Answer::List(items.iter().map(text_of).collect())),
        Some(other) => Ok(Answer::Text(other.to_string())),
        None => match payload.target_agent() {
            Some(target) => Err(TriageError::routing(format!(
                "no agent named '{}' in the roster",
                target
            ))),
            None => Err(TriageError::parse("terminal payload has no response")),
        },
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(content: &str) -> Message {
        Message::agent("OrderStatusAgent", content)
    }

    #[test]
    fn test_leaf_string() {
        let answer = extract_answer(&leaf(
            r#"{"response": "Order 12345 is shipped and will arrive in 2-3 days.", "terminated": "True"}"#,
        ))
        .unwrap();
        assert_eq!(
            answer,
            Answer::Text("Order 12345 is shipped and will arrive in 2-3 days.".into())
        );
    }

    #[test]
    fn test_leaf_list() {
        let answer =
            extract_answer(&leaf(r#"{"response": ["first", "second", 3], "terminated": true}"#))
                .unwrap();
        assert_eq!(
            answer,
            Answer::List(vec!["first".into(), "second".into(), "3".into()])
        );
    }

    #[test]
    fn test_cqa_answer() {
        let content = json!({
            "type": "cqa_result",
            "response": {"answers": [
                {"answer": "Contoso Outdoors is proud to offer a 30 day refund policy...", "confidenceScore": 0.9},
                {"answer": "ignored"}
            ]},
            "terminated": "True"
        })
        .to_string();
        let answer = extract_answer(&Message::agent("TriageAgent", content)).unwrap();
        assert_eq!(
            answer.to_string(),
            "Contoso Outdoors is proud to offer a 30 day refund policy..."
        );
    }

    #[test]
    fn test_cqa_without_answers_is_parse_error() {
        let err = extract_answer(&Message::agent(
            "TriageAgent",
            r#"{"type": "cqa_result", "response": {"answers": []}}"#,
        ))
        .unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_unknown_discriminator() {
        let err = extract_answer(&leaf(r#"{"type": "sentiment_result", "response": "x"}"#))
            .unwrap_err();
        assert!(matches!(err, TriageError::UnexpectedDiscriminator(ref k) if k == "sentiment_result"));
    }

    #[test]
    fn test_unrouted_target_is_routing_error() {
        let err = extract_answer(&Message::agent(
            "HeadSupportAgent",
            r#"{"target_agent": "GiftCardAgent", "terminated": "False"}"#,
        ))
        .unwrap_err();
        assert_eq!(err.kind(), "routing");
        assert!(err.to_string().contains("GiftCardAgent"));
    }

    #[test]
    fn test_unclassified_clu_is_routing_error() {
        let err = extract_answer(&Message::agent("TriageAgent", r#"{"type": "clu_result"}"#))
            .unwrap_err();
        assert_eq!(err.kind(), "routing");
    }

    #[test]
    fn test_free_text_is_parse_error() {
        let err = extract_answer(&leaf("Your order has shipped.")).unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_payload_is_not_mutated() {
        let original = json!({
            "response": ["a", "b"],
            "entities": [{"category": "OrderId", "text": "12345"}],
            "terminated": "True"
        });
        let message = leaf(&original.to_string());
        extract_answer(&message).unwrap();

        let reparsed: Value = serde_json::from_str(&message.content).unwrap();
        assert_eq!(reparsed, original);
    }
}
