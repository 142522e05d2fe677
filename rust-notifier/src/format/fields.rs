//! Per-event field layouts.
//!
//! Each known Freqtrade webhook type maps to an ordered list of fields. The
//! renderer walks the list, so adding a type means adding a table entry.

use serde_json::{Map, Value};

/// Placeholder for fields the event does not carry.
pub const UNKNOWN: &str = "Unknown";

/// How a field value is turned into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// Value shown as-is
    Raw,
    /// Ratio shown as a signed percentage (0.04 -> 4.00%)
    Percent,
}

/// One labelled field in a layout.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub label: &'static str,
    pub key: &'static str,
    pub format: FieldFormat,
}

const fn raw(label: &'static str, key: &'static str) -> FieldSpec {
    FieldSpec {
        label,
        key,
        format: FieldFormat::Raw,
    }
}

const fn percent(label: &'static str, key: &'static str) -> FieldSpec {
    FieldSpec {
        label,
        key,
        format: FieldFormat::Percent,
    }
}

const PAIR: FieldSpec = raw("Trading Pair", "pair");
const DIRECTION: FieldSpec = raw("Direction", "direction");
const ORDER_TYPE: FieldSpec = raw("Order Type", "order_type");
const AMOUNT: FieldSpec = raw("Amount", "amount");
const LIMIT: FieldSpec = raw("Limit", "limit");
const STAKE_AMOUNT: FieldSpec = raw("Stake Amount", "stake_amount");
const STAKE_CURRENCY: FieldSpec = raw("Stake Currency", "stake_currency");
const PROFIT_AMOUNT: FieldSpec = raw("Profit Amount", "profit_amount");
const PROFIT_RATIO: FieldSpec = percent("Profit", "profit_ratio");
const EXIT_REASON: FieldSpec = raw("Exit Reason", "exit_reason");

const ENTRY: &[FieldSpec] = &[
    PAIR,
    DIRECTION,
    ORDER_TYPE,
    raw("Open Rate", "open_rate"),
    AMOUNT,
    STAKE_AMOUNT,
    STAKE_CURRENCY,
    raw("Enter Tag", "enter_tag"),
];

const ENTRY_CANCEL: &[FieldSpec] = &[
    PAIR,
    DIRECTION,
    ORDER_TYPE,
    LIMIT,
    AMOUNT,
    STAKE_AMOUNT,
    STAKE_CURRENCY,
];

const EXIT: &[FieldSpec] = &[
    PAIR,
    DIRECTION,
    ORDER_TYPE,
    LIMIT,
    AMOUNT,
    PROFIT_AMOUNT,
    PROFIT_RATIO,
    STAKE_CURRENCY,
    EXIT_REASON,
];

const EXIT_FILL: &[FieldSpec] = &[
    PAIR,
    DIRECTION,
    ORDER_TYPE,
    raw("Close Rate", "close_rate"),
    AMOUNT,
    PROFIT_AMOUNT,
    PROFIT_RATIO,
    STAKE_CURRENCY,
    EXIT_REASON,
    raw("Open Date", "open_date"),
    raw("Close Date", "close_date"),
];

const EXIT_CANCEL: &[FieldSpec] = &[
    PAIR,
    DIRECTION,
    ORDER_TYPE,
    LIMIT,
    AMOUNT,
    PROFIT_AMOUNT,
    PROFIT_RATIO,
    STAKE_CURRENCY,
];

const STATUS: &[FieldSpec] = &[raw("Status", "status")];

/// Field layout for a webhook type, or `None` when the type has no fixed layout.
pub fn layout_for(event_type: &str) -> Option<&'static [FieldSpec]> {
    match event_type {
        "entry" | "entry_fill" => Some(ENTRY),
        "entry_cancel" => Some(ENTRY_CANCEL),
        "exit" => Some(EXIT),
        "exit_fill" => Some(EXIT_FILL),
        "exit_cancel" => Some(EXIT_CANCEL),
        "status" => Some(STATUS),
        _ => None,
    }
}

/// Display text for a JSON value.
///
/// Strings lose their quotes, `null` reads as [`UNKNOWN`], containers stay compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => UNKNOWN.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Display text for `key`, or [`UNKNOWN`] when absent.
pub fn lookup(event: &Map<String, Value>, key: &str) -> String {
    event
        .get(key)
        .map(display_value)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Numeric view of a ratio: JSON numbers or numeric strings.
pub fn ratio_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Format a ratio as a percentage with two decimals.
///
/// `None` when the scaled value is not finite (e.g. `1e308 * 100`).
pub fn format_percent(ratio: f64) -> Option<String> {
    let percent = ratio * 100.0;
    percent.is_finite().then(|| format!("{:.2}%", percent))
}
