//! Codec Configuration Manager
//!
//! Centralized configuration for struct encoding:
//! - Presets (standard, strict)
//! - Runtime configuration updates
//! - Validation of settings

use crate::error::{Eip712Error, Eip712Result};
use std::sync::RwLock;

/// Global codec configuration manager
pub struct CodecConfig {
    /// Current configuration
    config: RwLock<CodecSettings>,
}

/// How unknown field names supplied at instance construction are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    /// Drop the value and carry on
    Ignore,
    /// Fail with `FieldNotDeclared`
    Reject,
}

/// Codec settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecSettings {
    /// Preset these settings came from
    pub level: CodecLevel,

    /// Handling of unknown keys at construction
    pub unknown_fields: UnknownFieldPolicy,
    /// Log dropped unknown keys at debug level
    pub log_unknown_fields: bool,

    /// Deepest chain of struct references the resolver will follow
    pub max_reference_depth: usize,
}

/// Configuration presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecLevel {
    /// Permissive construction
    Standard,
    /// Unknown keys are rejected, shallower schemas
    Strict,
    /// User-defined settings
    Custom,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self::standard()
    }
}

impl CodecSettings {
    /// Standard preset
    pub fn standard() -> Self {
        Self {
            level: CodecLevel::Standard,
            unknown_fields: UnknownFieldPolicy::Ignore,
            log_unknown_fields: true,
            max_reference_depth: 64,
        }
    }

    /// Strict preset
    pub fn strict() -> Self {
        Self {
            level: CodecLevel::Strict,
            unknown_fields: UnknownFieldPolicy::Reject,
            log_unknown_fields: true,
            max_reference_depth: 16,
        }
    }

    /// Validate settings consistency
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.max_reference_depth == 0 {
            warnings.push(
                "Warning: Reference depth of 0 rejects every struct-typed field".to_string()
            );
        }

        if self.unknown_fields == UnknownFieldPolicy::Ignore && !self.log_unknown_fields {
            warnings.push(
                "Warning: Unknown fields are dropped silently".to_string()
            );
        }

        warnings
    }

    /// Fail if the settings cannot be used for encoding at all
    pub fn ensure_usable(&self) -> Eip712Result<()> {
        if self.max_reference_depth == 0 {
            return Err(Eip712Error::InvalidConfig(
                "max_reference_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl CodecConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self {
            config: RwLock::new(CodecSettings::default()),
        }
    }

    /// Get current settings
    pub fn settings(&self) -> CodecSettings {
        self.config.read()
            .map(|c| c.clone())
            .unwrap_or_else(|_| {
                crate::log_error!("utils::codec_config", "Codec config lock poisoned; using standard settings");
                CodecSettings::standard()
            })
    }

    /// Update a specific setting
    pub fn update<F>(&self, updater: F) -> Vec<String>
    where
        F: FnOnce(&mut CodecSettings),
    {
        let Ok(mut config) = self.config.write() else {
            crate::log_error!("utils::codec_config", "Codec config lock poisoned; update dropped");
            return vec!["Failed to acquire config lock".to_string()];
        };
        config.level = CodecLevel::Custom; // Any manual change makes it custom
        updater(&mut config);

        crate::log_info!(
            "utils::codec_config",
            "Codec settings updated",
            unknown_fields = format!("{:?}", config.unknown_fields),
            max_reference_depth = config.max_reference_depth,
        );

        config.validate()
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Global codec configuration instance
static CODEC_CONFIG: std::sync::OnceLock<CodecConfig> = std::sync::OnceLock::new();

/// Get the global codec configuration
pub fn get_codec_config() -> &'static CodecConfig {
    CODEC_CONFIG.get_or_init(CodecConfig::new)
}

/// Snapshot of the global settings
pub fn current_settings() -> CodecSettings {
    get_codec_config().settings()
}
