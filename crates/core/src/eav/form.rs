//! Projection of a part's specification values into editable form fields.

use std::collections::HashMap;

use serde::Serialize;

use super::data_type::DataType;
use super::schema::{AttributeDef, SchemaSnapshot};
use super::value::TypedValue;
use crate::types::DbId;

/// Input widget used to edit a value, derived only from the data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Text,
    Number,
    Checkbox,
    Date,
    Select,
}

impl From<DataType> for WidgetKind {
    fn from(dt: DataType) -> Self {
        match dt {
            DataType::Text => Self::Text,
            DataType::Integer | DataType::Decimal => Self::Number,
            DataType::Boolean => Self::Checkbox,
            DataType::Date => Self::Date,
            DataType::Choice => Self::Select,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// One editable field of a part's specification form.
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub attribute: AttributeDef,
    pub widget: WidgetKind,
    /// Current stored value, `None` when the part has no value yet.
    pub current_value: Option<TypedValue>,
    /// Current value rendered as input text (empty when absent).
    pub input: String,
    /// Step attribute for number inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<&'static str>,
    /// Options for select widgets, in display order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

/// Build the ordered form fields for a part in `category_id`.
///
/// `values` maps attribute id to the part's stored value. Values for
/// attributes outside the category are ignored; attributes without a value
/// produce an empty input. A part without a category has no fields.
pub fn build_form(
    snapshot: &SchemaSnapshot,
    category_id: Option<DbId>,
    values: &HashMap<DbId, TypedValue>,
) -> Vec<FormField> {
    let Some(category_id) = category_id else {
        return Vec::new();
    };

    snapshot
        .list_attributes(category_id)
        .into_iter()
        .map(|attribute| {
            let current_value = values.get(&attribute.id).cloned();
            let input = current_value
                .as_ref()
                .map(TypedValue::to_raw)
                .unwrap_or_default();
            let options = snapshot
                .choices_for(attribute.id)
                .iter()
                .map(|c| SelectOption {
                    value: c.value.clone(),
                    label: c.label.clone(),
                })
                .collect();
            let step = match attribute.data_type {
                DataType::Integer => Some("1"),
                DataType::Decimal => Some("any"),
                _ => None,
            };
            FormField {
                attribute: attribute.clone(),
                widget: WidgetKind::from(attribute.data_type),
                current_value,
                input,
                step,
                options,
            }
        })
        .collect()
}
