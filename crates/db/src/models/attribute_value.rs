//! Typed custom-field value rows and write requests.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::eav::value::ValueSlots;
use stockroom_core::eav::{AttributeDef, DataType, SchemaSnapshot, TypedValue};
use stockroom_core::error::CoreError;
use stockroom_core::types::DbId;

/// A value row joined with its attribute's data type and selected option.
#[derive(Debug, Clone, FromRow)]
pub struct AttributeValueRow {
    pub part_id: DbId,
    pub attribute_id: DbId,
    #[sqlx(try_from = "String")]
    pub data_type: DataType,
    pub value_text: Option<String>,
    pub value_int: Option<i64>,
    pub value_dec: Option<Decimal>,
    pub value_bool: Option<bool>,
    pub value_date: Option<NaiveDate>,
    pub choice_value: Option<String>,
}

impl AttributeValueRow {
    /// Decode into `(part_id, attribute_id, value)`, checking that the
    /// populated slot matches the attribute's data type.
    pub fn into_typed(self) -> Result<(DbId, DbId, TypedValue), CoreError> {
        let slots = ValueSlots {
            text: self.value_text,
            integer: self.value_int,
            decimal: self.value_dec,
            boolean: self.value_bool,
            date: self.value_date,
            choice: self.choice_value,
        };
        let value = slots.into_typed(self.data_type)?;
        Ok((self.part_id, self.attribute_id, value))
    }
}

/// One stored spec value as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SpecValue {
    pub attribute_id: DbId,
    pub code: String,
    pub name: String,
    pub data_type: DataType,
    pub unit: Option<String>,
    pub value: TypedValue,
}

impl SpecValue {
    pub fn new(attribute: &AttributeDef, value: TypedValue) -> Self {
        Self {
            attribute_id: attribute.id,
            code: attribute.code.clone(),
            name: attribute.name.clone(),
            data_type: attribute.data_type,
            unit: attribute.unit.clone(),
            value,
        }
    }
}

/// A validated write for one attribute of one part.
///
/// `value: None` clears the stored value. Choice values carry the id of the
/// selected option, which is what the value row references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueWrite {
    pub attribute_id: DbId,
    pub value: Option<TypedValue>,
    pub choice_id: Option<DbId>,
}

impl ValueWrite {
    pub fn clear(attribute_id: DbId) -> Self {
        Self {
            attribute_id,
            value: None,
            choice_id: None,
        }
    }

    /// Build a write for `attribute`, resolving choice values to option ids.
    pub fn resolve(
        snapshot: &SchemaSnapshot,
        attribute: &AttributeDef,
        value: Option<TypedValue>,
    ) -> Result<Self, CoreError> {
        let Some(value) = value else {
            return Ok(Self::clear(attribute.id));
        };
        let choice_id = match &value {
            TypedValue::Choice(selected) => Some(
                snapshot
                    .choice_by_value(attribute.id, selected)
                    .map(|c| c.id)
                    .ok_or_else(|| {
                        CoreError::Internal(format!(
                            "choice '{selected}' of attribute {} missing from schema",
                            attribute.id
                        ))
                    })?,
            ),
            _ => None,
        };
        Ok(Self {
            attribute_id: attribute.id,
            value: Some(value),
            choice_id,
        })
    }
}

/// Body of `PUT /parts/{id}/specs/{code}`. Strings, numbers, booleans and
/// `null` (clear) are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct SetSpecValue {
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Body of `PUT /parts/{id}/specs`: attribute code to raw input.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSpecValues {
    pub values: BTreeMap<String, serde_json::Value>,
}
