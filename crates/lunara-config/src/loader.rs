// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./lunara.toml` > `~/.config/lunara/lunara.toml` > `/etc/lunara/lunara.toml`
//! with environment variable overrides via `LUNARA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LunaraConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lunara/lunara.toml` (system-wide)
/// 3. `~/.config/lunara/lunara.toml` (user XDG config)
/// 4. `./lunara.toml` (local directory)
/// 5. `LUNARA_*` environment variables
pub fn load_config() -> Result<LunaraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LunaraConfig::default()))
        .merge(Toml::file("/etc/lunara/lunara.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("lunara/lunara.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("lunara.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LunaraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LunaraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LunaraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LunaraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `LUNARA_BOT_CYCLE_LENGTH_DAYS`
/// must map to `bot.cycle_length_days`, not `bot.cycle.length.days`.
fn env_provider() -> Env {
    Env::prefixed("LUNARA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: LUNARA_WHATSAPP_ACCESS_TOKEN -> "whatsapp_access_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("bot_", "bot.", 1)
            .replacen("whatsapp_", "whatsapp.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
