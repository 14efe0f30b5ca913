//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - In-memory stub backend
//! - Study set and store fixtures
//! - Custom assertion macros

#[macro_use]
pub mod assertions;
pub mod fixtures;
pub mod stub_backend;

pub use fixtures::*;
pub use stub_backend::*;
