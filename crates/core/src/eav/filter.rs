//! Typed attribute clauses for dynamic filtering.
//!
//! Client clauses name an attribute by code within one category. Resolution
//! checks the operator against the attribute's type and parses operands with
//! the same rules as stored values, so the storage layer only ever sees a
//! [`Clause`] whose [`Condition`] carries typed values.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::data_type::DataType;
use super::error::EavError;
use super::schema::{AttributeDef, SchemaSnapshot};
use super::value::{parse_typed, TypedValue};
use crate::types::DbId;

/// Comparison operators accepted in a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Contains,
    Gt,
    Lt,
    Before,
    After,
    Between,
    In,
}

const ALL_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Contains,
    Operator::Gt,
    Operator::Lt,
    Operator::Before,
    Operator::After,
    Operator::Between,
    Operator::In,
];

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Contains => "contains",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Before => "before",
            Self::After => "after",
            Self::Between => "between",
            Self::In => "in",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ALL_OPERATORS.iter().copied().find(|op| op.as_str() == s)
    }

    /// Operators allowed for attributes of the given type.
    pub fn allowed_for(data_type: DataType) -> &'static [Operator] {
        match data_type {
            DataType::Text => &[Self::Eq, Self::Contains],
            DataType::Integer | DataType::Decimal => {
                &[Self::Eq, Self::Gt, Self::Lt, Self::Between]
            }
            DataType::Boolean => &[Self::Eq],
            DataType::Date => &[Self::Eq, Self::Before, Self::After, Self::Between],
            DataType::Choice => &[Self::Eq, Self::In],
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clause as submitted by a client, before resolution against a schema.
#[derive(Debug, Clone, Deserialize)]
pub struct ClauseInput {
    /// Attribute code within the filtered category.
    pub attribute: String,
    pub op: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Raw operand text: a single value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    One(String),
    Many(Vec<String>),
}

impl Operand {
    /// Convert a JSON operand. Strings, numbers and booleans are scalars;
    /// arrays must contain only scalars. Anything else is `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Array(items) => items
                .iter()
                .map(scalar_text)
                .collect::<Option<Vec<_>>>()
                .map(Self::Many),
            other => scalar_text(other).map(Self::One),
        }
    }
}

fn scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A typed condition on one attribute's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq(TypedValue),
    /// Case-insensitive substring; the needle is stored lowercased.
    Contains(String),
    Gt(TypedValue),
    Lt(TypedValue),
    /// Inclusive on both ends.
    Between(TypedValue, TypedValue),
    In(Vec<TypedValue>),
}

/// A clause resolved against one attribute of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub attribute_id: DbId,
    pub category_id: DbId,
    pub condition: Condition,
}

impl Clause {
    /// Build a clause for `attribute`, checking the operator against its type
    /// and parsing the operand with the same rules as stored values.
    pub fn new(
        snapshot: &SchemaSnapshot,
        attribute: &AttributeDef,
        op: Operator,
        operand: &Operand,
    ) -> Result<Self, EavError> {
        if !Operator::allowed_for(attribute.data_type).contains(&op) {
            return Err(unsupported(attribute, op.as_str()));
        }

        let choices = snapshot.choices_for(attribute.id);
        let parse = |raw: &str| parse_typed(attribute, choices, raw);
        let malformed = |expected: &'static str| EavError::MalformedOperand {
            code: attribute.code.clone(),
            operator: op.as_str().to_string(),
            expected,
        };

        let condition = match (op, operand) {
            (Operator::Between, Operand::Many(bounds)) if bounds.len() == 2 => {
                Condition::Between(parse(bounds[0].as_str())?, parse(bounds[1].as_str())?)
            }
            (Operator::Between, _) => return Err(malformed("a two-element array [low, high]")),
            (Operator::In, Operand::Many(items)) if !items.is_empty() => Condition::In(
                items
                    .iter()
                    .map(|raw| parse(raw.as_str()))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            (Operator::In, _) => return Err(malformed("a non-empty array")),
            (_, Operand::Many(_)) => return Err(malformed("a single value")),
            (Operator::Contains, Operand::One(raw)) => {
                let needle = raw.trim();
                if needle.is_empty() {
                    return Err(malformed("a non-empty string"));
                }
                Condition::Contains(needle.to_lowercase())
            }
            (Operator::Eq, Operand::One(raw)) => Condition::Eq(parse(raw.as_str())?),
            (Operator::Gt | Operator::After, Operand::One(raw)) => {
                Condition::Gt(parse(raw.as_str())?)
            }
            (Operator::Lt | Operator::Before, Operand::One(raw)) => {
                Condition::Lt(parse(raw.as_str())?)
            }
        };

        Ok(Self {
            attribute_id: attribute.id,
            category_id: attribute.category_id,
            condition,
        })
    }
}

fn unsupported(attribute: &AttributeDef, operator: &str) -> EavError {
    EavError::UnsupportedOperator {
        code: attribute.code.clone(),
        operator: operator.to_string(),
        data_type: attribute.data_type,
    }
}

/// Resolve a client clause within `category_id`.
///
/// Returns `Ok(None)` when the category has no attribute with that code; such
/// a clause can match nothing but is not an error.
pub fn resolve_clause(
    snapshot: &SchemaSnapshot,
    category_id: DbId,
    input: &ClauseInput,
) -> Result<Option<Clause>, EavError> {
    let Some(attribute) = snapshot.attribute_by_code(category_id, &input.attribute) else {
        return Ok(None);
    };
    let op = Operator::parse(&input.op).ok_or_else(|| unsupported(attribute, &input.op))?;
    let operand = Operand::from_json(&input.value).ok_or_else(|| EavError::MalformedOperand {
        code: attribute.code.clone(),
        operator: op.as_str().to_string(),
        expected: "a string, number, boolean or array of those",
    })?;
    Clause::new(snapshot, attribute, op, &operand).map(Some)
}

/// The resolved clauses of one search, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseSet {
    pub clauses: Vec<Clause>,
    /// Set when some clause named a code the category does not define.
    pub unsatisfiable: bool,
}

impl ClauseSet {
    /// Resolve client clauses within `category_id`.
    pub fn resolve(
        snapshot: &SchemaSnapshot,
        category_id: DbId,
        inputs: &[ClauseInput],
    ) -> Result<Self, EavError> {
        let mut set = Self::default();
        for input in inputs {
            match resolve_clause(snapshot, category_id, input)? {
                Some(clause) => set.clauses.push(clause),
                None => set.unsatisfiable = true,
            }
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && !self.unsatisfiable
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::eav::schema::fixtures::*;

    fn dec(s: &str) -> TypedValue {
        TypedValue::Decimal(Decimal::from_str(s).unwrap())
    }

    fn input(attribute: &str, op: &str, value: serde_json::Value) -> ClauseInput {
        ClauseInput {
            attribute: attribute.into(),
            op: op.into(),
            value,
        }
    }

    fn condition(attribute: &str, op: &str, value: serde_json::Value) -> Condition {
        resolve_clause(&snapshot(), FILTERS, &input(attribute, op, value))
            .unwrap()
            .unwrap()
            .condition
    }

    #[test]
    fn choice_operands_resolve_to_options() {
        assert_eq!(
            condition("thread_size", "eq", json!("10mm")),
            Condition::Eq(TypedValue::Choice("10mm".into()))
        );
        assert_eq!(
            condition("filter_type", "in", json!(["Oil", "Air"])),
            Condition::In(vec![
                TypedValue::Choice("Oil".into()),
                TypedValue::Choice("Air".into()),
            ])
        );
    }

    #[test]
    fn between_parses_both_bounds() {
        assert_eq!(
            condition("length", "between", json!([5, "15.5"])),
            Condition::Between(dec("5"), dec("15.5"))
        );
    }

    #[test]
    fn before_and_after_map_to_range_conditions() {
        let day = |d| TypedValue::Date(NaiveDate::from_ymd_opt(2024, 1, d).unwrap());
        assert_eq!(
            condition("inspected_on", "before", json!("2024-01-10")),
            Condition::Lt(day(10))
        );
        assert_eq!(
            condition("inspected_on", "after", json!("2024-01-02")),
            Condition::Gt(day(2))
        );
        assert_eq!(
            condition("pack_qty", "gt", json!(2)),
            Condition::Gt(TypedValue::Integer(2))
        );
    }

    #[test]
    fn contains_needle_is_trimmed_and_lowercased() {
        assert_eq!(
            condition("notes", "contains", json!("  HEAVY ")),
            Condition::Contains("heavy".into())
        );
        assert_eq!(
            condition("notes", "eq", json!("heavy")),
            Condition::Eq(TypedValue::Text("heavy".into()))
        );
    }

    #[test]
    fn boolean_operand_from_json_bool() {
        assert_eq!(
            condition("in_stock", "eq", json!(false)),
            Condition::Eq(TypedValue::Boolean(false))
        );
    }

    #[test]
    fn clause_carries_attribute_category() {
        let clause = resolve_clause(&snapshot(), BEARINGS, &input("filter_type", "eq", json!("x")))
            .unwrap()
            .unwrap();
        assert_eq!(clause.attribute_id, BEARING_TYPE);
        assert_eq!(clause.category_id, BEARINGS);
    }

    #[test]
    fn no_clauses_is_empty() {
        let set = ClauseSet::resolve(&snapshot(), FILTERS, &[]).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn unknown_code_makes_set_unsatisfiable() {
        let snap = snapshot();
        let set = ClauseSet::resolve(
            &snap,
            FILTERS,
            &[
                input("bore", "eq", json!("10")),
                input("thread_size", "eq", json!("10mm")),
            ],
        )
        .unwrap();
        assert!(set.unsatisfiable);
        assert!(!set.is_empty());
        assert_eq!(set.clauses.len(), 1);
    }

    #[test]
    fn operator_not_allowed_for_type_is_rejected() {
        let snap = snapshot();
        let err =
            resolve_clause(&snap, FILTERS, &input("in_stock", "gt", json!(true))).unwrap_err();
        assert_matches!(
            err,
            EavError::UnsupportedOperator { operator, data_type: DataType::Boolean, .. }
                if operator == "gt"
        );
        assert_matches!(
            resolve_clause(&snap, FILTERS, &input("notes", "like", json!("x"))),
            Err(EavError::UnsupportedOperator { .. })
        );
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let snap = snapshot();
        assert_matches!(
            resolve_clause(&snap, FILTERS, &input("length", "between", json!(5))),
            Err(EavError::MalformedOperand { .. })
        );
        assert_matches!(
            resolve_clause(&snap, FILTERS, &input("length", "eq", json!([1, 2]))),
            Err(EavError::MalformedOperand { .. })
        );
        assert_matches!(
            resolve_clause(&snap, FILTERS, &input("thread_size", "in", json!([]))),
            Err(EavError::MalformedOperand { .. })
        );
        assert_matches!(
            resolve_clause(&snap, FILTERS, &input("notes", "eq", json!(null))),
            Err(EavError::MalformedOperand { .. })
        );
    }

    #[test]
    fn bad_operands_use_value_errors() {
        let snap = snapshot();
        assert_matches!(
            resolve_clause(&snap, FILTERS, &input("thread_size", "eq", json!("14mm"))),
            Err(EavError::InvalidChoice { .. })
        );
        assert_matches!(
            resolve_clause(&snap, FILTERS, &input("inspected_on", "after", json!("01/02/2024"))),
            Err(EavError::InvalidDate { .. })
        );
        assert_matches!(
            resolve_clause(&snap, FILTERS, &input("pack_qty", "lt", json!("many"))),
            Err(EavError::TypeMismatch { .. })
        );
    }
}
