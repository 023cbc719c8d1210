//! Papelaria Core - Shared domain types.
//!
//! This crate provides the types used across the storefront workspace:
//! - `storefront` - Database layer, provisioning jobs and the redirect server
//! - `cli` - Batch commands for schema setup and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access. Database
//! encoding for the newtypes is gated behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, prices and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
