use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Optional colour overrides, as `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Catalog opened when no --catalog is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_catalog: Option<PathBuf>,

    /// Show survey/question instructions under each title
    #[serde(default = "default_true")]
    pub show_instructions: bool,

    /// Show copyright notices in the survey footer
    #[serde(default = "default_true")]
    pub show_copyright: bool,

    /// Registry-wide copyright text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_copyright: Option<String>,

    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_catalog: None,
            show_instructions: true,
            show_copyright: true,
            registry_copyright: None,
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("proms-question");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            // Keep a broken file around for the user to fix
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save() {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        let mut clean_config = self.clone();

        // Blank strings in the file would otherwise read back as overrides
        for value in [
            &mut clean_config.theme.accent,
            &mut clean_config.theme.text,
            &mut clean_config.theme.text_dim,
            &mut clean_config.theme.header,
            &mut clean_config.theme.danger,
            &mut clean_config.registry_copyright,
        ] {
            if value.as_ref().map(|s| s.trim().is_empty()).unwrap_or(false) {
                *value = None;
            }
        }

        let content = toml::to_string_pretty(&clean_config)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            default_catalog: Some(PathBuf::from("/srv/registry/proms.json")),
            show_instructions: false,
            show_copyright: true,
            registry_copyright: Some("© Example Registry".to_string()),
            theme: ThemeConfig {
                accent: Some("#FFC107".to_string()),
                ..Default::default()
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized = AppConfig::parse(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.show_instructions);
        assert!(config.show_copyright);
    }
}
