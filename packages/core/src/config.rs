/// Configuration for the discussion engine
use crate::models::GroupId;
use crate::tree::DEFAULT_MAX_ANCESTOR_HOPS;
use serde::{Deserialize, Serialize};

/// Languages the presentation layer ships translations for
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "de"];

/// Engine settings
///
/// Deserializable from JSON; missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoberConfig {
    /// Default relative depth shown below the requested brick
    pub max_relative_level: u32,

    /// Parent chains longer than this are reported as cycles
    pub max_ancestor_hops: u32,

    /// Group granted to callers who are not signed in
    pub public_group: GroupId,

    /// Language of type names and vote criteria (`en` or `de`)
    pub language: String,
}

impl Default for SoberConfig {
    fn default() -> Self {
        Self {
            max_relative_level: 8,
            max_ancestor_hops: DEFAULT_MAX_ANCESTOR_HOPS,
            public_group: "public".to_string(),
            language: "en".to_string(),
        }
    }
}

impl SoberConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: SoberConfig = serde_json::from_str(json)?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_ancestor_hops == 0 {
            return Err("max_ancestor_hops must be greater than 0".to_string());
        }

        if self.public_group.is_empty() {
            return Err("public_group cannot be empty".to_string());
        }

        if !SUPPORTED_LANGUAGES.contains(&self.language.as_str()) {
            return Err(format!(
                "language '{}' is not supported (expected one of {:?})",
                self.language, SUPPORTED_LANGUAGES
            ));
        }

        Ok(())
    }
}
