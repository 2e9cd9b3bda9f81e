//! Listing helpers shared by list endpoints: sort parsing and pagination.

pub mod pagination;
pub mod sort;

pub use pagination::{
    clamp_limit, clamp_offset, Page, PageWindow, DEFAULT_LIMIT, MAX_LIMIT, PAGE_SIZE,
};
pub use sort::{SortDirection, SortField, SortKey, SortSpec};
