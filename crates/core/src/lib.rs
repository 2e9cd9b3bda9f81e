//! Stockroom domain logic.
//!
//! Pure logic with no database dependencies: the EAV custom-field system
//! (schema snapshot, typed values, form projection, filter evaluation,
//! category reconciliation) plus the listing helpers shared by the
//! repository and API layers.

pub mod eav;
pub mod error;
pub mod listing;
pub mod naming;
pub mod types;
