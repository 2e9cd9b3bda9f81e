//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Every write that changes the
//! attribute schema bumps the schema revision in the same transaction.

pub mod attribute_repo;
pub mod attribute_value_repo;
pub mod category_repo;
pub mod choice_repo;
pub mod engine_repo;
pub mod fitment_repo;
pub mod machine_repo;
pub mod part_repo;
pub mod part_vendor_repo;
pub mod schema_repo;
pub mod vendor_repo;

pub use attribute_repo::AttributeRepo;
pub use attribute_value_repo::AttributeValueRepo;
pub use category_repo::CategoryRepo;
pub use choice_repo::ChoiceRepo;
pub use engine_repo::EngineRepo;
pub use fitment_repo::{EngineFitmentRepo, MachineFitmentRepo};
pub use machine_repo::MachineRepo;
pub use part_repo::PartRepo;
pub use part_vendor_repo::PartVendorRepo;
pub use schema_repo::SchemaRepo;
pub use vendor_repo::VendorRepo;

/// Wrap a free-text search term for `ILIKE`, escaping wildcards.
pub(crate) fn ilike_pattern(term: Option<&str>) -> Option<String> {
    let term = term.map(str::trim).filter(|t| !t.is_empty())?;
    Some(contains_pattern(term))
}

/// `ILIKE` pattern matching `needle` anywhere, taken literally.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
