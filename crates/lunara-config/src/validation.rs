// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as known log levels, sane cycle lengths, and a reminder
//! lead time that fits inside one cycle.

use crate::diagnostic::ConfigError;
use crate::model::LunaraConfig;

const KNOWN_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LunaraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate log level is one of the known tracing levels
    if !KNOWN_LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level must be one of {}, got `{}`",
                KNOWN_LOG_LEVELS.join(", "),
                config.agent.log_level
            ),
        });
    }

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate reference language is not empty
    if config.bot.reference_language.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "bot.reference_language must not be empty".to_string(),
        });
    }

    // Validate cycle length is in a plausible range
    if config.bot.cycle_length_days == 0 || config.bot.cycle_length_days > 90 {
        errors.push(ConfigError::Validation {
            message: format!(
                "bot.cycle_length_days must be between 1 and 90, got {}",
                config.bot.cycle_length_days
            ),
        });
    }

    // Validate the reminder lead fits inside one cycle
    if config.bot.reminder_lead_days >= config.bot.cycle_length_days {
        errors.push(ConfigError::Validation {
            message: format!(
                "bot.reminder_lead_days ({}) must be smaller than bot.cycle_length_days ({})",
                config.bot.reminder_lead_days, config.bot.cycle_length_days
            ),
        });
    }

    // Validate the webhook port is usable
    if config.whatsapp.webhook_port == 0 {
        errors.push(ConfigError::Validation {
            message: "whatsapp.webhook_port must not be 0".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = LunaraConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = LunaraConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = LunaraConfig::default();
        config.agent.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))));
    }

    #[test]
    fn zero_cycle_length_fails_validation() {
        let mut config = LunaraConfig::default();
        config.bot.cycle_length_days = 0;
        let errors = validate_config(&config).unwrap_err();
        // Zero cycle also makes the lead >= cycle, so expect both complaints.
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("cycle_length_days"))));
        assert!(errors.len() >= 2);
    }

    #[test]
    fn lead_days_must_fit_inside_cycle() {
        let mut config = LunaraConfig::default();
        config.bot.reminder_lead_days = 28;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("reminder_lead_days"))));
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = LunaraConfig::default();
        config.agent.log_level = "debug".to_string();
        config.storage.database_path = "/tmp/test.db".to_string();
        config.bot.cycle_length_days = 30;
        config.bot.reminder_lead_days = 5;
        config.bot.vendor_chat_id = Some("120363000000000000".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_webhook_port_fails_validation() {
        let mut config = LunaraConfig::default();
        config.whatsapp.webhook_port = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("webhook_port"))));
    }
}
