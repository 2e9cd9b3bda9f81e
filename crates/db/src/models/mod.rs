//! Database models and request DTOs.
//!
//! Row structs derive `FromRow` + `Serialize`; create/update DTOs derive
//! `Deserialize` (and `Validate` where field rules apply).

pub mod attribute;
pub mod attribute_value;
pub mod category;
pub mod choice;
pub mod engine;
pub mod fitment;
pub mod machine;
pub mod part;
pub mod part_vendor;
pub mod vendor;
