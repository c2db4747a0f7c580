// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Localization for the Lunara companion bot.
//!
//! Every user-facing string in the system is produced through
//! [`Catalog::render`], so language fallback behaves uniformly: the user's
//! bundle, then the reference bundle, then the empty string. Bundles are TOML
//! assets embedded at compile time and parsed once at startup.

pub mod catalog;
pub mod format;
pub mod keys;

pub use catalog::Catalog;
pub use keys::MessageKey;
