//! Rendering of webhook events into plain-text and HTML email bodies.
//!
//! Events are first reduced to a list of [`Detail`] items, then each sink
//! (text, HTML) turns the same items into its own markup.

use serde_json::{Map, Value};

use super::fields::{
    display_value, format_percent, layout_for, lookup, ratio_value, FieldFormat, FieldSpec,
};
use super::message::StrategyMessage;

/// Heading shared by both renderings.
pub const TITLE: &str = "Freqtrade Trading Bot Alert";

/// Sign of a profit figure, used only for HTML coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Gain,
    Loss,
}

impl Tone {
    fn color(self) -> &'static str {
        match self {
            Tone::Gain => "green",
            Tone::Loss => "red",
        }
    }
}

/// One rendered item of the details section.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    /// "Label: value" line / list item
    Field {
        label: String,
        value: String,
        tone: Option<Tone>,
    },
    /// Free text paragraph
    Text(String),
    /// Preformatted block
    Block(String),
}

impl Detail {
    fn field(label: impl Into<String>, value: impl Into<String>) -> Self {
        Detail::Field {
            label: label.into(),
            value: value.into(),
            tone: None,
        }
    }
}

/// Build the details section for an event of the given type.
pub fn details_for(event_type: &str, event: &Map<String, Value>) -> Vec<Detail> {
    if event_type == "strategy_msg" {
        return message_details(StrategyMessage::classify(event.get("msg")));
    }

    match layout_for(event_type) {
        Some(layout) => layout.iter().map(|spec| field_detail(spec, event)).collect(),
        None => generic_details(event),
    }
}

fn field_detail(spec: &FieldSpec, event: &Map<String, Value>) -> Detail {
    match (spec.format, event.get(spec.key)) {
        (FieldFormat::Percent, Some(value)) => {
            match ratio_value(value).and_then(|ratio| Some((ratio, format_percent(ratio)?))) {
                Some((ratio, percent)) => Detail::Field {
                    label: spec.label.to_string(),
                    value: percent,
                    tone: Some(if ratio >= 0.0 { Tone::Gain } else { Tone::Loss }),
                },
                None => Detail::field(spec.label, display_value(value)),
            }
        }
        _ => Detail::field(spec.label, lookup(event, spec.key)),
    }
}

fn message_details(message: StrategyMessage) -> Vec<Detail> {
    match message {
        StrategyMessage::Mapping(map) => map
            .iter()
            .map(|(key, value)| Detail::field(key.as_str(), display_value(value)))
            .collect(),
        StrategyMessage::PlainText(text) => vec![Detail::Text(text)],
        StrategyMessage::Parsed(value) => {
            let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            vec![Detail::Block(pretty)]
        }
    }
}

/// Every field except `type`, in the order the sender wrote them.
fn generic_details(event: &Map<String, Value>) -> Vec<Detail> {
    event
        .iter()
        .filter(|(key, _)| key.as_str() != "type")
        .map(|(key, value)| Detail::field(key.as_str(), display_value(value)))
        .collect()
}

/// Plain-text email body.
pub fn render_text(timestamp: &str, event_type: &str, details: &[Detail], dump: &str) -> String {
    let mut body = format!("{TITLE}\n\nTime: {timestamp}\nType: {event_type}\n\n");

    for detail in details {
        match detail {
            Detail::Field { label, value, .. } => body.push_str(&format!("{label}: {value}\n")),
            Detail::Text(text) => body.push_str(&format!("Message: {text}\n")),
            Detail::Block(block) => body.push_str(&format!("Message:\n{block}\n")),
        }
    }

    body.push_str("\nComplete Webhook Data:\n");
    body.push_str(dump);
    body.push('\n');
    body
}

/// HTML email body. Consecutive fields share one `<ul>`.
pub fn render_html(timestamp: &str, event_type: &str, details: &[Detail], dump: &str) -> String {
    let mut body = String::from("<html>\n<head></head>\n<body>\n");
    body.push_str(&format!("  <h1>{TITLE}</h1>\n"));
    body.push_str(&format!("  <p>Time: {}</p>\n", escape_html(timestamp)));
    body.push_str(&format!("  <p>Type: {}</p>\n", escape_html(event_type)));
    body.push_str("  <h2>Details</h2>\n");

    let mut in_list = false;
    for detail in details {
        let is_field = matches!(detail, Detail::Field { .. });
        if is_field && !in_list {
            body.push_str("  <ul>\n");
        } else if !is_field && in_list {
            body.push_str("  </ul>\n");
        }
        in_list = is_field;

        match detail {
            Detail::Field { label, value, tone } => {
                let value = match tone {
                    Some(tone) => format!(
                        "<span style=\"color: {};\">{}</span>",
                        tone.color(),
                        escape_html(value)
                    ),
                    None => escape_html(value),
                };
                body.push_str(&format!("    <li>{}: {}</li>\n", escape_html(label), value));
            }
            Detail::Text(text) => body.push_str(&format!("  <p>{}</p>\n", escape_html(text))),
            Detail::Block(block) => body.push_str(&format!("  <pre>{}</pre>\n", escape_html(block))),
        }
    }
    if in_list {
        body.push_str("  </ul>\n");
    }

    body.push_str("  <h2>Complete Webhook Data</h2>\n");
    body.push_str(&format!("  <pre>{}</pre>\n", escape_html(dump)));
    body.push_str("</body>\n</html>\n");
    body
}

/// Escape text for inclusion in HTML element content.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
