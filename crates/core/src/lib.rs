//! Pronto Core - Shared types library.
//!
//! This crate provides common types used across all Pronto components:
//! - `api` - the order-taking backend (entity store, workflows, JSON API)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe ids, emails, and money handling

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
