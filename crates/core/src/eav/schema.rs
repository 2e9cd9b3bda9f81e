//! Attribute schema: categories, attribute definitions and choice options,
//! held in an immutable versioned snapshot.

use std::collections::HashMap;

use serde::Serialize;

use super::data_type::DataType;
use super::error::EavError;
use crate::types::DbId;

/// A part category sharing one attribute schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// One custom field defined on a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDef {
    pub id: DbId,
    pub category_id: DbId,
    pub name: String,
    pub code: String,
    pub data_type: DataType,
    pub unit: Option<String>,
    pub is_required: bool,
    pub sort_order: i32,
    pub help_text: Option<String>,
}

/// One allowed value of a choice attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub id: DbId,
    pub attribute_id: DbId,
    pub value: String,
    pub label: String,
    pub sort_order: i32,
}

/// An attribute together with its ordered options (empty unless choice-typed).
#[derive(Debug, Clone, Serialize)]
pub struct AttributeSchema {
    #[serde(flatten)]
    pub attribute: AttributeDef,
    pub choices: Vec<ChoiceOption>,
}

/// The full schema of one category, as served to form and filter UIs.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySchema {
    pub schema_version: i64,
    pub category: Category,
    pub attributes: Vec<AttributeSchema>,
}

/// Immutable view of the whole attribute schema at one revision.
///
/// Loaded once per schema revision and shared by every request that needs
/// schema information, so a single request never mixes two revisions.
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    version: i64,
    categories: HashMap<DbId, Category>,
    attributes: HashMap<DbId, AttributeDef>,
    /// Attribute ids per category, ordered by `(sort_order, name, id)`.
    by_category: HashMap<DbId, Vec<DbId>>,
    /// Options per attribute, ordered by `(sort_order, label, id)`.
    choices: HashMap<DbId, Vec<ChoiceOption>>,
}

impl SchemaSnapshot {
    pub fn new(
        version: i64,
        categories: Vec<Category>,
        attributes: Vec<AttributeDef>,
        choices: Vec<ChoiceOption>,
    ) -> Self {
        let mut sorted_attrs: Vec<&AttributeDef> = attributes.iter().collect();
        sorted_attrs.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
                .then(a.id.cmp(&b.id))
        });
        let mut by_category: HashMap<DbId, Vec<DbId>> = HashMap::new();
        for attr in sorted_attrs {
            by_category.entry(attr.category_id).or_default().push(attr.id);
        }

        let mut grouped: HashMap<DbId, Vec<ChoiceOption>> = HashMap::new();
        for choice in choices {
            grouped.entry(choice.attribute_id).or_default().push(choice);
        }
        for options in grouped.values_mut() {
            options.sort_by(|a, b| {
                a.sort_order
                    .cmp(&b.sort_order)
                    .then_with(|| a.label.cmp(&b.label))
                    .then(a.id.cmp(&b.id))
            });
        }

        Self {
            version,
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
            attributes: attributes.into_iter().map(|a| (a.id, a)).collect(),
            by_category,
            choices: grouped,
        }
    }

    /// Schema revision this snapshot was loaded at.
    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn category(&self, id: DbId) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.values().find(|c| c.slug == slug)
    }

    pub fn attribute(&self, id: DbId) -> Option<&AttributeDef> {
        self.attributes.get(&id)
    }

    /// Attributes of a category ordered by display order, then name.
    ///
    /// Unknown categories have no attributes.
    pub fn list_attributes(&self, category_id: DbId) -> Vec<&AttributeDef> {
        self.by_category
            .get(&category_id)
            .map(|ids| ids.iter().filter_map(|id| self.attributes.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn attribute_by_code(&self, category_id: DbId, code: &str) -> Option<&AttributeDef> {
        self.list_attributes(category_id)
            .into_iter()
            .find(|a| a.code == code)
    }

    /// Ordered options of a choice attribute.
    pub fn list_choices(&self, attribute: &AttributeDef) -> Result<&[ChoiceOption], EavError> {
        if attribute.data_type != DataType::Choice {
            return Err(EavError::InvalidAttributeType {
                code: attribute.code.clone(),
                data_type: attribute.data_type,
            });
        }
        Ok(self.choices_for(attribute.id))
    }

    /// Ordered options of an attribute; empty for non-choice attributes.
    pub fn choices_for(&self, attribute_id: DbId) -> &[ChoiceOption] {
        self.choices
            .get(&attribute_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn choice_by_value(&self, attribute_id: DbId, value: &str) -> Option<&ChoiceOption> {
        self.choices_for(attribute_id)
            .iter()
            .find(|c| c.value == value)
    }

    /// Fail with [`EavError::DuplicateCode`] if `code` is already used in the
    /// category by an attribute other than `except`.
    pub fn ensure_code_available(
        &self,
        category_id: DbId,
        code: &str,
        except: Option<DbId>,
    ) -> Result<(), EavError> {
        let clash = self
            .list_attributes(category_id)
            .into_iter()
            .any(|a| a.code == code && Some(a.id) != except);
        if clash {
            Err(EavError::DuplicateCode {
                code: code.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Schema of one category with attributes and options in display order.
    ///
    /// The result owns its data so it can outlive the snapshot handle.
    pub fn category_schema(&self, category_id: DbId) -> Option<CategorySchema> {
        let category = self.category(category_id)?.clone();
        let attributes = self
            .list_attributes(category_id)
            .into_iter()
            .map(|attribute| AttributeSchema {
                attribute: attribute.clone(),
                choices: self.choices_for(attribute.id).to_vec(),
            })
            .collect();
        Some(CategorySchema {
            schema_version: self.version,
            category,
            attributes,
        })
    }
}
