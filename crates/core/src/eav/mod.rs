//! Custom-field (entity-attribute-value) engine for part specifications.
//!
//! Everything here operates on an explicitly loaded [`schema::SchemaSnapshot`]
//! and plain values; the repository layer is responsible for loading both.
//!
//! - [`schema`]: categories, attribute definitions and choice options.
//! - [`value`]: the typed value union and raw-input parsing.
//! - [`form`]: projection of a part's specs into editable form fields.
//! - [`filter`]: operators and typed clause resolution.
//! - [`reconcile`]: carrying or dropping values on a category change.

pub mod data_type;
pub mod error;
pub mod filter;
pub mod form;
pub mod reconcile;
pub mod schema;
pub mod value;

pub use data_type::DataType;
pub use error::{EavError, FieldViolation};
pub use schema::{AttributeDef, Category, ChoiceOption, SchemaSnapshot};
pub use value::TypedValue;
