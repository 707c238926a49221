//! Settings loaded from an optional TOML file and `CLUSTERWATCH_*` environment
//! variables. Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::Thresholds;

/// Prefix for environment overrides, e.g. `CLUSTERWATCH_REFRESH=500ms`.
pub const ENV_PREFIX: &str = "CLUSTERWATCH";

/// Color theme selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    /// Detect from the terminal background.
    #[default]
    Auto,
    Dark,
    Light,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    refresh: String,
    usage_warning: f64,
    usage_critical: f64,
    theme: ThemeChoice,
    #[serde(default)]
    log_file: Option<PathBuf>,
    spinner_fullscreen: bool,
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// How often file and HTTP sources are polled.
    pub refresh: Duration,
    pub thresholds: Thresholds,
    pub theme: ThemeChoice,
    /// Log destination; logging is disabled when unset.
    pub log_file: Option<PathBuf>,
    /// Cover the whole screen with the loading spinner until data arrives.
    pub spinner_fullscreen: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh: Duration::from_secs(1),
            thresholds: Thresholds::default(),
            theme: ThemeChoice::Auto,
            log_file: None,
            spinner_fullscreen: true,
        }
    }
}

impl Settings {
    /// Load settings from `path` (if given) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load settings with an explicit environment source.
    pub fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("refresh", "1s")?
            .set_default("usage_warning", defaults.thresholds.usage_warning)?
            .set_default("usage_critical", defaults.thresholds.usage_critical)?
            .set_default("theme", "auto")?
            .set_default("spinner_fullscreen", defaults.spinner_fullscreen)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let raw: RawSettings = builder
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let refresh = parse_duration(&raw.refresh)?;
        if refresh.is_zero() {
            bail!("Refresh interval must be greater than zero");
        }

        let thresholds = Thresholds {
            usage_warning: raw.usage_warning,
            usage_critical: raw.usage_critical,
        };
        thresholds_are_valid(&thresholds)?;

        Ok(Self {
            refresh,
            thresholds,
            theme: raw.theme,
            log_file: raw.log_file,
            spinner_fullscreen: raw.spinner_fullscreen,
        })
    }
}

/// Warning must not exceed critical, and both must be percentages.
pub fn thresholds_are_valid(thresholds: &Thresholds) -> Result<()> {
    let in_range = |v: f64| (0.0..=100.0).contains(&v);
    if !in_range(thresholds.usage_warning) || !in_range(thresholds.usage_critical) {
        bail!("Usage thresholds must be between 0 and 100");
    }
    if thresholds.usage_warning > thresholds.usage_critical {
        bail!(
            "Usage warning threshold ({}) is above the critical threshold ({})",
            thresholds.usage_warning,
            thresholds.usage_critical
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let mut map = config::Map::new();
        for (k, v) in vars {
            map.insert(k.to_string(), v.to_string());
        }
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_with(None, env(&[])).unwrap();
        assert_eq!(settings.refresh, Duration::from_secs(1));
        assert_eq!(settings.thresholds.usage_warning, 70.0);
        assert_eq!(settings.thresholds.usage_critical, 90.0);
        assert_eq!(settings.theme, ThemeChoice::Auto);
        assert!(settings.log_file.is_none());
        assert!(settings.spinner_fullscreen);
    }

    #[test]
    fn test_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "refresh = \"250ms\"\nusage_warning = 60\ntheme = \"light\"\nlog_file = \"/tmp/cw.log\""
        )
        .unwrap();

        let settings = Settings::load_with(Some(file.path()), env(&[])).unwrap();
        assert_eq!(settings.refresh, Duration::from_millis(250));
        assert_eq!(settings.thresholds.usage_warning, 60.0);
        assert_eq!(settings.thresholds.usage_critical, 90.0);
        assert_eq!(settings.theme, ThemeChoice::Light);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/cw.log")));
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "refresh = \"2s\"").unwrap();

        let settings = Settings::load_with(
            Some(file.path()),
            env(&[("CLUSTERWATCH_REFRESH", "500ms"), ("CLUSTERWATCH_THEME", "dark")]),
        )
        .unwrap();
        assert_eq!(settings.refresh, Duration::from_millis(500));
        assert_eq!(settings.theme, ThemeChoice::Dark);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Settings::load_with(None, env(&[("CLUSTERWATCH_REFRESH", "soon")])).is_err());
        assert!(Settings::load_with(None, env(&[("CLUSTERWATCH_REFRESH", "0s")])).is_err());
        assert!(Settings::load_with(
            None,
            env(&[("CLUSTERWATCH_USAGE_WARNING", "95"), ("CLUSTERWATCH_USAGE_CRITICAL", "80")])
        )
        .is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(Settings::load_with(Some(&path), env(&[])).is_err());
    }
}
