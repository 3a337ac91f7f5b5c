//! `warden-console` library crate.
//!
//! The users list screen as a terminal client: a [`ListBackend`](client::ListBackend)
//! talking to the API, debounced search, row selection and bulk actions.
//! The binary entrypoint lives in `main.rs`.

pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod notice;
pub mod screen;
