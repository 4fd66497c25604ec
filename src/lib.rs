//! History Viewer: paginated, date-filterable views over browsing history
//! and captured screenshots served by a remote HTTP API.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod controllers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
