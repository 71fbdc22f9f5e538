use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Deserializer;
use serde_yaml::Value;

pub const DEFAULT_CONFIG_PATH: &str = ".github/config/rubocop_linter_action.yml";
pub const DEFAULT_GEMFILE: &str = "Gemfile";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("config document must be a mapping")]
    NotAMapping,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckScope {
    #[default]
    All,
    Modified,
}

impl CheckScope {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Modified => "modified",
        }
    }
}

/// One entry of the `versions` list: either a bare gem name or a
/// single-entry `name: version` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionEntry {
    Name(String),
    Pinned { name: String, version: String },
}

/// Linter action settings as read from the YAML config document.
///
/// Every key is optional. Values of the wrong shape are treated as absent
/// instead of failing the whole document; scalar values are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(deserialize_with = "lenient_scope")]
    pub check_scope: CheckScope,
    #[serde(deserialize_with = "lenient_text")]
    pub base_branch: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub rubocop_fail_level: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub rubocop_config_path: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub rubocop_excluded_cops: Vec<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub rubocop_force_exclusion: bool,
    #[serde(deserialize_with = "lenient_text")]
    pub gemfile: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub bundle: bool,
    #[serde(deserialize_with = "lenient_versions")]
    pub versions: Vec<VersionEntry>,
}

impl Config {
    /// Reads the config document at `path`. A missing or empty file is not
    /// an error: it means "no configuration".
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file found");
                return Ok(None);
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Option<Self>, ConfigError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let document: Value = serde_yaml::from_str(text)?;
        match document {
            Value::Null => Ok(None),
            Value::Mapping(_) => Ok(Some(serde_yaml::from_value(document)?)),
            _ => Err(ConfigError::NotAMapping),
        }
    }

    pub fn gemfile(&self) -> &str {
        self.gemfile.as_deref().unwrap_or(DEFAULT_GEMFILE)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value.as_bool(), Some(true)))
}

fn lenient_scope<'de, D>(deserializer: D) -> Result<CheckScope, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match scalar_text(&value).as_deref() {
        Some("modified") => CheckScope::Modified,
        _ => CheckScope::All,
    })
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Sequence(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

fn lenient_versions<'de, D>(deserializer: D) -> Result<Vec<VersionEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Sequence(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items.iter().filter_map(version_entry).collect())
}

fn version_entry(item: &Value) -> Option<VersionEntry> {
    if let Value::Mapping(pins) = item {
        let (name, version) = pins.iter().next()?;
        let name = scalar_text(name)?;
        return Some(match scalar_text(version) {
            Some(version) => VersionEntry::Pinned { name, version },
            None => VersionEntry::Name(name),
        });
    }
    match scalar_text(item) {
        Some(name) => Some(VersionEntry::Name(name)),
        None => {
            tracing::warn!(?item, "ignoring malformed versions entry");
            None
        }
    }
}
