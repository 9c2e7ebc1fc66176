//! Test infrastructure for the persistence layer.
//!
//! This module provides reusable fixtures and a scripted storage for testing
//! providers without a database.

#![allow(dead_code)]

pub mod fixtures;
pub mod stub;

// Re-export commonly used items
pub use fixtures::*;
pub use stub::*;
