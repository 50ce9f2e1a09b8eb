//! # nat64d library
//!
//! *Note: There is a fair chance you are looking for `src/bin/nat64d.rs` instead of this file.*
//!
//! This crate is the stateful filtering/updating core of a NAT64 translator
//! (RFC 6146 / RFC 6052): the BIB, session table, pool4 allocator, and
//! expiry/reaper machinery live one layer down in `libs/*`; this crate ties
//! them together behind [`orchestrator::Nat64Core`] and adds the
//! administrator-facing configuration and introspection surface.
//!
//! Header rewriting, checksum adjustment, kernel packet interception, and
//! the admin control channel's own transport are all out of scope here --
//! see `interface` for the boundary this crate expects its caller to sit
//! behind.

#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod interface;
pub mod logging;
pub mod orchestrator;

pub use orchestrator::Nat64Core;
