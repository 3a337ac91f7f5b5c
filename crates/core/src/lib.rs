//! Domain core for the Warden admin panel.
//!
//! Pure logic only (no IO) so the API server, the repository layer and the
//! list-screen client can all share it.

pub mod bulk;
pub mod capability;
pub mod error;
pub mod list_query;
pub mod navigation;
pub mod roles;
pub mod selection;
pub mod types;
pub mod users;
