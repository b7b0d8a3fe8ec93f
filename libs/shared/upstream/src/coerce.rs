//! Lenient field coercions for upstream payloads. None of these fail: a
//! value that cannot be read becomes `None`, so one bad cell never rejects
//! the row it sits in.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_finite(s),
        _ => None,
    }
}

/// String or number rendered with two decimals; anything else is `None`.
pub fn to_fixed2(value: &Value) -> Option<String> {
    as_number(value).map(|n| format!("{:.2}", n))
}

/// Grade-like value: `"85"` and `85` both become `"85.00"`.
pub fn fixed_decimal<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_fixed2(&value))
}

/// Kardex grade. Non-numeric text such as `"AC"` (credited) is kept as is.
pub fn kardex_grade_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if parse_finite(s).is_none() => Some(s.clone()),
        other => to_fixed2(other),
    }
}

pub fn kardex_grade<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(kardex_grade_value(&value))
}

/// Leading integer of a string (`"8 créditos"` -> 8) or a number truncated.
pub fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            let end = trimmed
                .char_indices()
                .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
                .map(|(i, _)| i)
                .unwrap_or(trimmed.len());
            trimmed[..end].parse().ok()
        }
        _ => None,
    }
}

pub fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(int_value(&value))
}

/// Strings pass through, numbers are printed, everything else is `None`.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_value(&value))
}
