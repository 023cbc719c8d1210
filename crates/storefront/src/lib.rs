//! Papelaria Santa Fé storefront library.
//!
//! Holds the database layer shared by the redirect server and the
//! provisioning CLI: configuration, connection handling, the schema and seed
//! jobs, repositories and domain models.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod telemetry;
