//! Shared test utilities for mailsift integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated scans against a temp directory
//! - `FakeMailbox`, an in-memory mail source
//! - Builders for raw messages and PDF documents

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{FakeMailbox, TestHarness};
