pub mod categories;
pub mod engines;
pub mod fitment;
pub mod machines;
pub mod part_vendors;
pub mod parts;
pub mod specs;
pub mod vendors;
