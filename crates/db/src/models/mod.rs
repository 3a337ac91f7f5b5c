//! Row types and DTOs, one module per table.

pub mod permission;
pub mod role;
pub mod user;
