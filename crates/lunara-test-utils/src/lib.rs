// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Lunara integration tests.
//!
//! Provides a mock channel adapter, an in-memory mock store with failure
//! injection, and a full-stack [`TestHarness`] backed by temp SQLite.

pub mod harness;
pub mod mock_channel;
pub mod mock_store;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_channel::MockChannel;
pub use mock_store::MockStore;
