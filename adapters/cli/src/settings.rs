//! Arena configuration loading.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use astrobots_core::ArenaConfig;

/// Reads an arena configuration from a TOML file.
///
/// Missing keys keep their default values.
pub(crate) fn load(path: &Path) -> Result<ArenaConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read arena config {}", path.display()))?;
    parse(&contents).with_context(|| format!("failed to parse arena config {}", path.display()))
}

fn parse(contents: &str) -> Result<ArenaConfig> {
    let config: ArenaConfig =
        toml::from_str(contents).context("failed to parse arena config toml contents")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = parse("width = 800.0\nmax_turns = 50\n").expect("valid toml");

        assert_eq!(config.width, 800.0);
        assert_eq!(config.max_turns, 50);
        assert_eq!(config.height, ArenaConfig::default().height);
        assert_eq!(config.script_budget, ArenaConfig::default().script_budget);
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(parse("max_turns = \"many\"").is_err());
    }
}
