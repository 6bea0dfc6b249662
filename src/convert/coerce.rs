//! Cell encoding and decoding per value kind.
//!
//! Empty cells always decode to "absent", never to a zero value.

use super::error::CoercionReason;
use crate::catalog::ValueKind;
use crate::config::ConversionConfig;
use crate::tabular::Cell;
use crate::validation::reader::normalize_value;
use chrono::DateTime;
use serde_json::{Number, Value};

const ESCAPE: char = '\\';

/// Encode a document value for a cell. `Err` names the expected shape.
pub(crate) fn encode(
    value: Option<&Value>,
    kind: ValueKind,
    config: &ConversionConfig,
) -> Result<Cell, &'static str> {
    let value = match value {
        None | Some(Value::Null) => return Ok(Cell::Empty),
        Some(value) => value,
    };
    match (kind, value) {
        (ValueKind::Text | ValueKind::Timestamp, Value::String(s)) => Ok(Cell::Text(s.clone())),
        (ValueKind::Text | ValueKind::Timestamp, _) => Err("text"),
        (ValueKind::Integer, Value::Number(n)) => n.as_i64().map(Cell::Int).ok_or("integer"),
        (ValueKind::Integer, _) => Err("integer"),
        (ValueKind::Number, Value::Number(n)) => Ok(number_cell(n)),
        (ValueKind::Number, _) => Err("number"),
        (ValueKind::Boolean, Value::Bool(b)) => Ok(Cell::Bool(*b)),
        (ValueKind::Boolean, _) => Err("boolean"),
        (ValueKind::List, Value::Array(items)) => {
            let texts = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or("list of text")?;
            Ok(list_cell(&texts, config))
        }
        (ValueKind::ScalarList, Value::Array(items)) => {
            let texts: Vec<String> = items.iter().map(json_text).collect();
            Ok(list_cell(&texts, config))
        }
        (ValueKind::NumberPair, Value::Array(items)) if items.len() == 2 => {
            let texts = items
                .iter()
                .map(|item| item.as_number().map(Number::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or("pair of numbers")?;
            Ok(list_cell(&texts, config))
        }
        (ValueKind::List | ValueKind::ScalarList, _) => Err("list"),
        (ValueKind::NumberPair, _) => Err("pair of numbers"),
        (ValueKind::Json, Value::Number(n)) => Ok(number_cell(n)),
        (ValueKind::Json, Value::Bool(b)) => Ok(Cell::Bool(*b)),
        (ValueKind::Json, other) => Ok(Cell::Text(json_text(other))),
    }
}

/// Decode a cell into a document value; `None` means the field is absent.
pub(crate) fn decode(
    cell: &Cell,
    kind: ValueKind,
    config: &ConversionConfig,
) -> Result<Option<Value>, CoercionReason> {
    if cell.is_empty() {
        return Ok(None);
    }
    let value = match kind {
        ValueKind::Text => Value::String(cell.to_string()),
        ValueKind::Integer => Value::from(decode_integer(cell)?),
        ValueKind::Number => Value::Number(decode_number(cell)?),
        ValueKind::Boolean => Value::Bool(decode_bool(cell, config)?),
        ValueKind::Timestamp => Value::String(decode_timestamp(cell)?),
        ValueKind::List => {
            let items = split_cell(cell, config)?;
            if items.is_empty() {
                return Ok(None);
            }
            Value::Array(items.into_iter().map(Value::String).collect())
        }
        ValueKind::ScalarList => {
            let items = match cell {
                Cell::Text(_) => split_cell(cell, config)?
                    .iter()
                    .map(|item| parse_json_text(item))
                    .collect(),
                native => vec![decode_json(native)?],
            };
            if items.is_empty() {
                return Ok(None);
            }
            Value::Array(items)
        }
        ValueKind::NumberPair => {
            let items = split_cell(cell, config)?;
            if items.len() != 2 {
                return Err(CoercionReason::WrongArity {
                    expected: 2,
                    found: items.len(),
                });
            }
            let pair = items
                .iter()
                .map(|item| parse_number(item).map(Value::Number))
                .collect::<Result<Vec<_>, _>>()?;
            Value::Array(pair)
        }
        ValueKind::Json => decode_json(cell)?,
    };
    Ok(Some(value))
}

/// Integers beyond `i64` are written as text so no precision is lost
fn number_cell(n: &Number) -> Cell {
    match n.as_i64() {
        Some(i) => Cell::Int(i),
        None if n.is_u64() => Cell::Text(n.to_string()),
        None => Cell::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

fn list_cell(items: &[String], config: &ConversionConfig) -> Cell {
    if items.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(join_list(items, config))
    }
}

/// Text form of a value in a JSON cell or list item.
///
/// Strings are written raw unless the raw text would read back as a
/// different value (`"42"`, `"true"`, `""`, `" a "`), in which case they are quoted.
pub(crate) fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => {
            let ambiguous = s.trim() != s
                || s.is_empty()
                || serde_json::from_str::<Value>(s).is_ok();
            if ambiguous {
                Value::String(s.clone()).to_string()
            } else {
                s.clone()
            }
        }
        other => other.to_string(),
    }
}

/// Inverse of [`json_text`]: JSON when the text parses, the raw text otherwise
pub(crate) fn parse_json_text(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => normalize_value(&value),
        Err(_) => Value::String(text.to_string()),
    }
}

fn decode_json(cell: &Cell) -> Result<Value, CoercionReason> {
    match cell {
        Cell::Empty => Ok(Value::Null),
        Cell::Bool(b) => Ok(Value::Bool(*b)),
        Cell::Int(i) => Ok(Value::from(*i)),
        Cell::Float(x) => float_number(*x).map(Value::Number),
        Cell::DateTime(ts) => Ok(Value::String(ts.to_rfc3339())),
        Cell::Text(text) => Ok(parse_json_text(text)),
    }
}

/// Join list items, escaping separators and escapes inside items
pub fn join_list(items: &[String], config: &ConversionConfig) -> String {
    let separator = config.split_separator();
    items
        .iter()
        .map(|item| {
            let escaped = item.replace(ESCAPE, "\\\\");
            if separator.is_empty() {
                escaped
            } else {
                escaped.replace(separator, &format!("{}{}", ESCAPE, separator))
            }
        })
        .collect::<Vec<_>>()
        .join(&config.list_delimiter)
}

/// Split a list cell, honouring escapes. Items are trimmed and blank items dropped.
pub fn split_list(text: &str, config: &ConversionConfig) -> Result<Vec<String>, CoercionReason> {
    let separator = config.split_separator();
    let mut items = Vec::new();
    let mut current = String::new();
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if c == ESCAPE {
            let mut tail = rest[c.len_utf8()..].chars();
            match tail.next() {
                Some(escaped) => {
                    current.push(escaped);
                    rest = tail.as_str();
                }
                None => return Err(CoercionReason::DanglingEscape(text.to_string())),
            }
        } else if !separator.is_empty() && rest.starts_with(separator) {
            items.push(std::mem::take(&mut current));
            rest = &rest[separator.len()..];
        } else {
            current.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    items.push(current);
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

fn split_cell(cell: &Cell, config: &ConversionConfig) -> Result<Vec<String>, CoercionReason> {
    match cell {
        Cell::Text(text) => split_list(text, config),
        other => Ok(vec![other.to_string()]),
    }
}

fn decode_integer(cell: &Cell) -> Result<i64, CoercionReason> {
    match cell {
        Cell::Int(i) => Ok(*i),
        Cell::Float(x) if x.fract() == 0.0 && x.is_finite() => Ok(*x as i64),
        Cell::Text(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|x| x.fract() == 0.0 && x.is_finite())
                        .map(|x| x as i64)
                })
                .ok_or_else(|| CoercionReason::NotAnInteger(text.to_string()))
        }
        other => Err(CoercionReason::NotAnInteger(other.to_string())),
    }
}

fn decode_number(cell: &Cell) -> Result<Number, CoercionReason> {
    match cell {
        Cell::Int(i) => Ok(Number::from(*i)),
        Cell::Float(x) => float_number(*x),
        Cell::Text(text) => parse_number(text),
        other => Err(CoercionReason::NotANumber(other.to_string())),
    }
}

fn parse_number(text: &str) -> Result<Number, CoercionReason> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Number::from(i));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Ok(Number::from(u));
    }
    text.parse::<f64>()
        .map_err(|_| CoercionReason::NotANumber(text.to_string()))
        .and_then(float_number)
}

fn float_number(x: f64) -> Result<Number, CoercionReason> {
    if x.fract() == 0.0 && x.abs() < 9.0e15 {
        return Ok(Number::from(x as i64));
    }
    Number::from_f64(x).ok_or_else(|| CoercionReason::NotANumber(x.to_string()))
}

fn decode_bool(cell: &Cell, config: &ConversionConfig) -> Result<bool, CoercionReason> {
    match cell {
        Cell::Bool(b) => Ok(*b),
        other => {
            let text = other.to_string();
            config
                .parse_bool(&text)
                .ok_or_else(|| CoercionReason::NotABoolean(text.trim().to_string()))
        }
    }
}

fn decode_timestamp(cell: &Cell) -> Result<String, CoercionReason> {
    match cell {
        Cell::DateTime(ts) => Ok(ts.to_rfc3339()),
        other => {
            let text = other.to_string();
            let text = text.trim();
            DateTime::parse_from_rfc3339(text)
                .map(|_| text.to_string())
                .map_err(|_| CoercionReason::NotATimestamp(text.to_string()))
        }
    }
}
