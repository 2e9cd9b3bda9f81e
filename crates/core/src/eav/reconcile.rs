//! Carrying or dropping a part's values when its category changes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::schema::SchemaSnapshot;
use super::value::TypedValue;
use crate::types::DbId;

/// What to do with existing values on a category change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconciliation {
    /// Carry values whose code exists in the new category with the same type.
    KeepMatching,
    /// Drop every value.
    #[default]
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    NotInCategory,
    TypeChanged,
    ChoiceUnavailable,
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarriedValue {
    pub code: String,
    pub from_attribute_id: DbId,
    pub to_attribute_id: DbId,
    pub value: TypedValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedValue {
    pub code: String,
    pub attribute_id: DbId,
    pub value: TypedValue,
    pub reason: DropReason,
}

/// Outcome of a category change, computed before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan {
    pub target_category_id: Option<DbId>,
    pub carry: Vec<CarriedValue>,
    pub drop: Vec<DroppedValue>,
    /// Required attribute codes of the target category left without a value.
    pub missing_required: Vec<String>,
}

/// Plan moving a part with `current` values (attribute id, value) to
/// `target`. Values whose attribute is unknown to the snapshot are ignored.
pub fn plan_category_change(
    snapshot: &SchemaSnapshot,
    current: &[(DbId, TypedValue)],
    target: Option<DbId>,
    mode: Reconciliation,
) -> ReconcilePlan {
    let mut carry = Vec::new();
    let mut drop = Vec::new();

    for (attribute_id, value) in current {
        let Some(source) = snapshot.attribute(*attribute_id) else {
            continue;
        };
        let dropped = |reason| DroppedValue {
            code: source.code.clone(),
            attribute_id: source.id,
            value: value.clone(),
            reason,
        };

        if mode == Reconciliation::Clear {
            drop.push(dropped(DropReason::Cleared));
            continue;
        }
        let Some(dest) = target.and_then(|t| snapshot.attribute_by_code(t, &source.code)) else {
            drop.push(dropped(DropReason::NotInCategory));
            continue;
        };
        if dest.data_type != source.data_type {
            drop.push(dropped(DropReason::TypeChanged));
            continue;
        }
        if let TypedValue::Choice(selected) = value {
            if snapshot.choice_by_value(dest.id, selected).is_none() {
                drop.push(dropped(DropReason::ChoiceUnavailable));
                continue;
            }
        }
        carry.push(CarriedValue {
            code: source.code.clone(),
            from_attribute_id: source.id,
            to_attribute_id: dest.id,
            value: value.clone(),
        });
    }

    carry.sort_by(|a, b| a.code.cmp(&b.code));
    drop.sort_by(|a, b| a.code.cmp(&b.code));

    let carried: HashSet<DbId> = carry.iter().map(|c| c.to_attribute_id).collect();
    let missing_required = target
        .map(|t| {
            snapshot
                .list_attributes(t)
                .into_iter()
                .filter(|a| a.is_required && !carried.contains(&a.id))
                .map(|a| a.code.clone())
                .collect()
        })
        .unwrap_or_default();

    ReconcilePlan {
        target_category_id: target,
        carry,
        drop,
        missing_required,
    }
}
