//! Query history storage.
//!
//! This crate provides a trait-based interface for recording answered
//! questions, with a JSON file implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{QueryLogStore, StorageError, Result};
pub use json_storage::JsonQueryLogStore;
