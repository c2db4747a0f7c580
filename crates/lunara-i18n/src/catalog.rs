// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The immutable catalog of localized message bundles.
//!
//! Bundles are TOML assets compiled into the binary, parsed once at startup.
//! Rendering resolves through a three-tier fallback: the user's language
//! bundle, then the reference bundle, then the empty string. Rendering never
//! fails; a missing key in a shipped bundle is a content bug, not a runtime
//! error.

use std::collections::HashMap;

use lunara_core::LunaraError;
use tracing::warn;

use crate::format::fill;
use crate::keys::MessageKey;

/// Bundle assets compiled into the binary, in display order.
const ASSETS: &[(&str, &str)] = &[
    ("English", include_str!("../assets/english.toml")),
    ("Hausa", include_str!("../assets/hausa.toml")),
];

/// One language's key -> template mapping.
type Bundle = HashMap<String, String>;

/// All loaded bundles plus the designated reference (fallback) language.
pub struct Catalog {
    bundles: Vec<(String, Bundle)>,
    reference: String,
}

impl Catalog {
    /// Load the compiled-in bundles.
    ///
    /// Fails if an asset is not valid TOML or if the reference language is
    /// not among the shipped bundles.
    pub fn builtin(reference: &str) -> Result<Self, LunaraError> {
        let mut bundles = Vec::with_capacity(ASSETS.len());
        for (name, raw) in ASSETS {
            let bundle: Bundle = toml::from_str(raw).map_err(|e| {
                LunaraError::Config(format!("bundle `{name}` is not valid TOML: {e}"))
            })?;
            bundles.push((name.to_string(), bundle));
        }

        if !bundles.iter().any(|(name, _)| name == reference) {
            return Err(LunaraError::Config(format!(
                "reference language `{reference}` has no bundle; shipped: {}",
                bundles
                    .iter()
                    .map(|(n, _)| n.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        Ok(Self {
            bundles,
            reference: reference.to_string(),
        })
    }

    /// The reference (fallback) language name.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Names of all shipped bundles, in display order.
    pub fn language_names(&self) -> impl Iterator<Item = &str> {
        self.bundles.iter().map(|(name, _)| name.as_str())
    }

    /// Resolve typed text to a bundle language name by case-insensitive
    /// prefix match ("hau" -> "Hausa"). Returns `None` when nothing matches.
    pub fn resolve_language(&self, typed: &str) -> Option<&str> {
        let typed = typed.trim();
        if typed.is_empty() {
            return None;
        }
        let lower = typed.to_lowercase();
        self.language_names()
            .find(|name| name.to_lowercase().starts_with(&lower))
    }

    /// Render a message key in the given language with positional arguments.
    ///
    /// Lookup order: the named language's bundle, then the reference bundle,
    /// then the empty string. An unknown language name simply means every
    /// lookup lands in the reference bundle. Never fails.
    pub fn render(&self, language: Option<&str>, key: MessageKey, args: &[&str]) -> String {
        let key_name = key.to_string();
        let template = language
            .and_then(|lang| self.lookup(lang, &key_name))
            .or_else(|| self.lookup(&self.reference, &key_name));

        match template {
            Some(template) => fill(template, args),
            None => {
                warn!(key = %key_name, "message key missing from reference bundle");
                String::new()
            }
        }
    }

    fn lookup(&self, language: &str, key: &str) -> Option<&str> {
        self.bundles
            .iter()
            .find(|(name, _)| name == language)
            .and_then(|(_, bundle)| bundle.get(key))
            .map(String::as_str)
    }
}
