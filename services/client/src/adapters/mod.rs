//! services/client/src/adapters/mod.rs
//!
//! Concrete implementations of the core's port traits.

pub mod auth;
pub mod db;
pub mod local;
pub mod memory;
