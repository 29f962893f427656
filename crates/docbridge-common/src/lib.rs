//! Common utilities for docbridge
//!
//! Shared error taxonomy used by the docbridge database crates.

pub mod error;

pub use error::{DocBridgeError, Result};
