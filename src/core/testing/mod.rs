//! Test infrastructure
//!
//! This module provides:
//! - A scripted [`CommandRunner`](crate::core::CommandRunner) that replays tool output
//! - Captured output fixtures for every supported backend

pub mod fixtures;
pub mod mocks;

pub use mocks::*;
