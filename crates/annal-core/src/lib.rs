//! Core types for the annal history generator.
//!
//! This crate describes entity schemas, their annotations and the generator
//! configuration. It performs no I/O and has no async code; the derivation
//! engine (`annal-schema`) and the runtime hooks (`annal-hooks`) both build on
//! it.

pub mod annotation;
pub mod authz;
pub mod config;
pub mod error;
pub mod field;
pub mod operation;
pub mod schema;

pub use error::{Error, Result};
