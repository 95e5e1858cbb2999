//! Domain models for microauth.
//!
//! These are the core types shared across all crates.

pub mod account;
pub mod invite;
pub mod member;
pub mod organization;
