//! Classification of the free-form `msg` field of `strategy_msg` webhooks.
//!
//! Strategies send whatever they like through `self.dp.send_msg()`: a dict, a
//! pre-serialized JSON string, a list, or plain prose.

use serde_json::{Map, Value};
use tracing::debug;

use super::fields::{display_value, UNKNOWN};

/// A strategy message, normalized for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyMessage {
    /// Key/value pairs, rendered as labelled lines
    Mapping(Map<String, Value>),
    /// Free text, rendered verbatim
    PlainText(String),
    /// Any other structured value, rendered as a preformatted block
    Parsed(Value),
}

impl StrategyMessage {
    /// Classify the raw `msg` value (absent when the event has no `msg`).
    pub fn classify(msg: Option<&Value>) -> Self {
        match msg {
            None | Some(Value::Null) => StrategyMessage::PlainText(UNKNOWN.to_string()),
            Some(Value::Object(map)) => StrategyMessage::Mapping(map.clone()),
            Some(list @ Value::Array(_)) => StrategyMessage::Parsed(list.clone()),
            Some(Value::String(text)) => Self::classify_text(text),
            Some(other) => StrategyMessage::PlainText(display_value(other)),
        }
    }

    fn classify_text(text: &str) -> Self {
        let trimmed = text.trim_start();
        if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
            return StrategyMessage::PlainText(text.to_string());
        }

        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => StrategyMessage::Mapping(map),
            Ok(other) => StrategyMessage::Parsed(other),
            Err(e) => {
                debug!(error = %e, "strategy_msg_not_json");
                StrategyMessage::PlainText(text.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_mapping() {
        let msg = json!({"market": "bullish", "value": 28});
        match StrategyMessage::classify(Some(&msg)) {
            StrategyMessage::Mapping(map) => {
                assert_eq!(map.get("market"), Some(&json!("bullish")));
                assert_eq!(map.len(), 2);
            }
            other => panic!("Expected Mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_json_string_matches_mapping() {
        let from_string = StrategyMessage::classify(Some(&json!(r#"{"market": "bullish"}"#)));
        let from_map = StrategyMessage::classify(Some(&json!({"market": "bullish"})));
        assert_eq!(from_string, from_map);
    }

    #[test]
    fn test_classify_json_list_string() {
        let msg = json!(r#"[{"coin": "BTC"}, {"coin": "ETH"}]"#);
        assert_eq!(
            StrategyMessage::classify(Some(&msg)),
            StrategyMessage::Parsed(json!([{"coin": "BTC"}, {"coin": "ETH"}]))
        );
    }

    #[test]
    fn test_classify_raw_list() {
        let msg = json!([{"coin": "BTC", "signal": "buy"}]);
        assert_eq!(
            StrategyMessage::classify(Some(&msg)),
            StrategyMessage::Parsed(msg.clone())
        );
    }

    #[test]
    fn test_classify_plain_text() {
        let text = "Market is trending up, RSI at 28";
        assert_eq!(
            StrategyMessage::classify(Some(&json!(text))),
            StrategyMessage::PlainText(text.to_string())
        );
    }

    #[test]
    fn test_classify_broken_json_falls_back_to_text() {
        let text = "{not really json";
        assert_eq!(
            StrategyMessage::classify(Some(&json!(text))),
            StrategyMessage::PlainText(text.to_string())
        );
    }

    #[test]
    fn test_classify_missing_and_scalars() {
        assert_eq!(
            StrategyMessage::classify(None),
            StrategyMessage::PlainText(UNKNOWN.to_string())
        );
        assert_eq!(
            StrategyMessage::classify(Some(&Value::Null)),
            StrategyMessage::PlainText(UNKNOWN.to_string())
        );
        assert_eq!(
            StrategyMessage::classify(Some(&json!(42))),
            StrategyMessage::PlainText("42".to_string())
        );
    }
}
