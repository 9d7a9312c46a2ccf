use std::path::Path;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid display offset '{0}', expected \"+HH:MM\"")]
    InvalidOffset(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub general: General,
    #[serde(default)]
    pub theatres: Vec<TheatreConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct General {
    pub results_per_theatre: usize,
    #[serde(default = "default_display_offset")]
    pub display_offset: String,
}

fn default_display_offset() -> String {
    "+00:00".to_string()
}

impl General {
    /// UTC offset used when rendering timezone-aware datetimes.
    pub fn display_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.display_offset
            .parse()
            .map_err(|_| ConfigError::InvalidOffset(self.display_offset.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheatreConfig {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub program_url: Option<String>,
    /// Whether this site's datetime strings are ISO 8601. Opt-in: when false
    /// the formatter treats them as opaque text.
    #[serde(default)]
    pub time_parseable: bool,
    #[serde(default)]
    pub selectors: Option<Selectors>,
}

impl TheatreConfig {
    pub fn program_url(&self) -> Option<&str> {
        self.program_url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Per-site CSS selectors. All four are required for the site to be
/// scraped; [`Selectors::complete`] gates eligibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub elements: Option<String>,
    pub time: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
}

impl Selectors {
    /// Returns the full selector set, or `None` if any selector is missing.
    pub fn complete(&self) -> Option<SelectorSet<'_>> {
        Some(SelectorSet {
            elements: self.elements.as_deref()?,
            time: self.time.as_deref()?,
            title: self.title.as_deref()?,
            link: self.link.as_deref()?,
        })
    }
}

/// A theatre's selectors with all required fields present.
#[derive(Debug, Clone, Copy)]
pub struct SelectorSet<'a> {
    pub elements: &'a str,
    pub time: &'a str,
    pub title: &'a str,
    pub link: &'a str,
}

/// Load the theatre configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let config = serde_yaml::from_str(&content)?;
    Ok(config)
}
