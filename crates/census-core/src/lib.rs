//! Core types and trait definitions for the Census citizen registry.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the column catalog (the whitelist every dynamic statement is checked
//! against), the validated field and filter shapes handed to stores, and the
//! [`store::CitizenStore`] abstraction.

pub mod citizen;
pub mod columns;
pub mod error;
pub mod fields;
pub mod filter;
pub mod statistics;
pub mod store;

pub use error::{Error, Result};
