//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the repositories in `warden_db` and map errors via
//! [`AppError`](crate::error::AppError).

pub mod access_control;
pub mod me;
pub mod users;
