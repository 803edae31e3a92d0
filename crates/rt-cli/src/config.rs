//! Engine configuration loading

use std::path::Path;

use anyhow::{Context, Result};
use rt_engine::EngineConfig;

/// Load the engine configuration from a TOML file.
///
/// No path, or a path that does not exist, yields the default configuration.
pub fn load(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };

    if path.exists() {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: EngineConfig = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        Ok(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_config() {
        let config = load(Some(Path::new("/nonexistent/path/engine.toml"))).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_no_path() {
        assert_eq!(load(None).unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_weight = 10\ndefault_budget = 5000").unwrap();

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.max_weight, 10);
        assert_eq!(config.default_budget, Some(5000));
        assert_eq!(config.costs, EngineConfig::default().costs);
    }

    #[test]
    fn test_load_invalid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_weight = \"lots\"").unwrap();
        assert!(load(Some(file.path())).is_err());
    }
}
