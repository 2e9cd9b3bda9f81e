//! Typed custom-field values and raw-input parsing.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use super::data_type::DataType;
use super::error::EavError;
use super::schema::{AttributeDef, ChoiceOption};
use crate::error::CoreError;

/// Accepted date format for date attributes (ISO 8601 calendar date).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Tokens accepted as `true` for boolean attributes (compared lowercase).
pub const TRUTHY_TOKENS: &[&str] = &["true", "1", "yes", "on", "y", "t"];

/// Tokens accepted as `false` for boolean attributes (compared lowercase).
pub const FALSY_TOKENS: &[&str] = &["false", "0", "no", "off", "n", "f"];

/// Fractional digits stored for decimal attributes (`NUMERIC(18, 6)`).
pub const DECIMAL_SCALE: u32 = 6;

/// Integer digits stored for decimal attributes (`NUMERIC(18, 6)`).
pub const DECIMAL_INTEGER_DIGITS: u32 = 12;

/// Plain decimal notation: optional sign, digits, optional fraction. No
/// thousands separators, no exponent, `.` as the only decimal mark.
static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("valid regex"));

/// A stored custom-field value. Exactly one arm per [`DataType`].
///
/// Values of one attribute always share the same arm, so the derived
/// ordering is the natural ordering of that type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    Date(NaiveDate),
    /// The selected option's stored value.
    Choice(String),
}

impl TypedValue {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Text(_) => DataType::Text,
            Self::Integer(_) => DataType::Integer,
            Self::Decimal(_) => DataType::Decimal,
            Self::Boolean(_) => DataType::Boolean,
            Self::Date(_) => DataType::Date,
            Self::Choice(_) => DataType::Choice,
        }
    }

    /// Render the value in the same textual form [`parse_input`] accepts.
    pub fn to_raw(&self) -> String {
        match self {
            Self::Text(s) | Self::Choice(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Decimal(d) => d.normalize().to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
        }
    }

    /// Split into per-type storage slots. Exactly one slot is populated.
    pub fn into_slots(self) -> ValueSlots {
        let mut slots = ValueSlots::default();
        match self {
            Self::Text(s) => slots.text = Some(s),
            Self::Integer(i) => slots.integer = Some(i),
            Self::Decimal(d) => slots.decimal = Some(d),
            Self::Boolean(b) => slots.boolean = Some(b),
            Self::Date(d) => slots.date = Some(d),
            Self::Choice(c) => slots.choice = Some(c),
        }
        slots
    }
}

/// Per-type storage slots as persisted in one value row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueSlots {
    pub text: Option<String>,
    pub integer: Option<i64>,
    pub decimal: Option<Decimal>,
    pub boolean: Option<bool>,
    pub date: Option<NaiveDate>,
    pub choice: Option<String>,
}

impl ValueSlots {
    fn populated(&self) -> usize {
        [
            self.text.is_some(),
            self.integer.is_some(),
            self.decimal.is_some(),
            self.boolean.is_some(),
            self.date.is_some(),
            self.choice.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Rebuild the typed value, checking that exactly the slot matching
    /// `data_type` is populated.
    pub fn into_typed(self, data_type: DataType) -> Result<TypedValue, CoreError> {
        if self.populated() != 1 {
            return Err(CoreError::Internal(format!(
                "value row has {} populated slots, expected exactly one",
                self.populated()
            )));
        }
        let value = match data_type {
            DataType::Text => self.text.map(TypedValue::Text),
            DataType::Integer => self.integer.map(TypedValue::Integer),
            DataType::Decimal => self.decimal.map(|d| TypedValue::Decimal(d.normalize())),
            DataType::Boolean => self.boolean.map(TypedValue::Boolean),
            DataType::Date => self.date.map(TypedValue::Date),
            DataType::Choice => self.choice.map(TypedValue::Choice),
        };
        value.ok_or_else(|| {
            CoreError::Internal(format!("value row slot does not match data type {data_type}"))
        })
    }
}

/// Parse a raw form/CSV input for an attribute.
///
/// Input is trimmed first. Empty input means "no value": it returns
/// `Ok(None)` for optional attributes and [`EavError::RequiredFieldMissing`]
/// for required ones.
pub fn parse_input(
    attribute: &AttributeDef,
    choices: &[ChoiceOption],
    raw: &str,
) -> Result<Option<TypedValue>, EavError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        if attribute.is_required {
            return Err(EavError::RequiredFieldMissing {
                code: attribute.code.clone(),
            });
        }
        return Ok(None);
    }
    parse_typed(attribute, choices, trimmed).map(Some)
}

/// Parse a non-empty raw input according to the attribute's data type.
pub fn parse_typed(
    attribute: &AttributeDef,
    choices: &[ChoiceOption],
    raw: &str,
) -> Result<TypedValue, EavError> {
    let input = raw.trim();
    let mismatch = || EavError::TypeMismatch {
        code: attribute.code.clone(),
        expected: attribute.data_type,
        input: input.to_string(),
    };

    match attribute.data_type {
        DataType::Text => Ok(TypedValue::Text(input.to_string())),
        DataType::Integer => input
            .parse::<i64>()
            .map(TypedValue::Integer)
            .map_err(|_| mismatch()),
        DataType::Decimal => parse_decimal(input)
            .map(TypedValue::Decimal)
            .ok_or_else(mismatch),
        DataType::Boolean => parse_bool(input)
            .map(TypedValue::Boolean)
            .ok_or_else(mismatch),
        DataType::Date => NaiveDate::parse_from_str(input, DATE_FORMAT)
            .map(TypedValue::Date)
            .map_err(|_| EavError::InvalidDate {
                code: attribute.code.clone(),
                input: input.to_string(),
            }),
        DataType::Choice => {
            if choices.iter().any(|c| c.value == input) {
                Ok(TypedValue::Choice(input.to_string()))
            } else {
                Err(EavError::InvalidChoice {
                    code: attribute.code.clone(),
                    input: input.to_string(),
                })
            }
        }
    }
}

/// Convert a JSON input value to the raw text [`parse_input`] expects.
///
/// `null` is the empty input. Objects and arrays are not valid inputs.
pub fn raw_from_json(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => Some(String::new()),
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
    }
}

/// Parse a locale-invariant decimal that fits `NUMERIC(18, 6)` exactly.
fn parse_decimal(input: &str) -> Option<Decimal> {
    if !DECIMAL_RE.is_match(input) {
        return None;
    }
    // `from_str` rounds past 28 fractional digits; the exact parser refuses.
    let value = Decimal::from_str_exact(input).ok()?.normalize();
    if value.scale() > DECIMAL_SCALE {
        return None;
    }
    let limit = Decimal::from(10i64.pow(DECIMAL_INTEGER_DIGITS));
    if value.abs() >= limit {
        return None;
    }
    Some(value)
}

fn parse_bool(input: &str) -> Option<bool> {
    let lowered = input.to_ascii_lowercase();
    if TRUTHY_TOKENS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSY_TOKENS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}
