//! Configuration file structure (docket.toml).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{de, Deserialize, Deserializer};
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Deserialize, Default)]
pub struct DocketConfig {
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct SessionsConfig {
    /// Sessions run when `docket run` gets no names
    pub default: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LogConfig {
    /// One of trace, debug, info, warn, error, off
    #[serde(default, deserialize_with = "parse_level")]
    pub level: Option<LevelFilter>,
}

fn parse_level<'de, D>(deserializer: D) -> Result<Option<LevelFilter>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    raw.parse().map(Some).map_err(|_| {
        de::Error::custom(format!(
            "invalid log level `{}`, expected one of trace, debug, info, warn, error, off",
            raw
        ))
    })
}

/// Load configuration from `path` if it exists.
/// Returns an error if the file exists but is malformed.
pub fn load(path: &Path) -> Result<DocketConfig> {
    if !path.exists() {
        return Ok(DocketConfig::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: DocketConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!("Loaded config from {}", path.display());

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().unwrap();
        let config = load(&temp.path().join("docket.toml")).unwrap();

        assert!(config.sessions.default.is_none());
        assert!(config.log.level.is_none());
    }

    #[test]
    fn reads_sections() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("docket.toml");
        fs::write(
            &path,
            "[sessions]\ndefault = [\"serve_docs\"]\n\n[log]\nlevel = \"warn\"\n",
        )
        .unwrap();

        let config = load(&path).unwrap();

        assert_eq!(config.sessions.default, Some(vec!["serve_docs".to_string()]));
        assert_eq!(config.log.level, Some(LevelFilter::WARN));
    }

    #[test]
    fn sections_are_optional() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("docket.toml");
        fs::write(&path, "[log]\nlevel = \"debug\"\n").unwrap();

        let config = load(&path).unwrap();

        assert!(config.sessions.default.is_none());
    }

    #[test]
    fn unknown_log_level_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("docket.toml");
        fs::write(&path, "[log]\nlevel = \"loud\"\n").unwrap();

        let err = load(&path).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Failed to parse"));
        assert!(message.contains("invalid log level `loud`"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("docket.toml");
        fs::write(&path, "[sessions\ndefault = 3").unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
