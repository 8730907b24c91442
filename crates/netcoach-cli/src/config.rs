//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use netcoach_core::trend::AnalysisThresholds;

/// Top-level netcoach configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetcoachConfig {
    /// Dataset used when `--data` is not given.
    #[serde(default)]
    pub data: Option<PathBuf>,
    #[serde(default)]
    pub thresholds: AnalysisThresholds,
    /// Max students analyzed concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Where `--save` writes reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// text, json, markdown or html.
    #[serde(default = "default_format")]
    pub default_format: String,
}

fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./netcoach-reports")
}
fn default_format() -> String {
    "text".to_string()
}

impl Default for NetcoachConfig {
    fn default() -> Self {
        Self {
            data: None,
            thresholds: AnalysisThresholds::default(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
            default_format: default_format(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again, so a value that itself
/// contains `${` is kept as is.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

fn env_override<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid {name}={raw}: {e}")),
        Err(_) => Ok(None),
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `netcoach.toml` in the current directory
/// 2. `~/.config/netcoach/config.toml`
///
/// Environment variable overrides: `NETCOACH_WEAK_THRESHOLD`,
/// `NETCOACH_STRONG_THRESHOLD`, `NETCOACH_MIN_SAMPLE`, `NETCOACH_PARALLELISM`.
pub fn load_config_from(path: Option<&Path>) -> Result<NetcoachConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("netcoach.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<NetcoachConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => NetcoachConfig::default(),
    };

    apply_env_overrides(&mut config)?;

    config.data = config.data.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);

    if config.thresholds.weak_below > config.thresholds.strong_at_least {
        anyhow::bail!(
            "weak threshold {} is above strong threshold {}",
            config.thresholds.weak_below,
            config.thresholds.strong_at_least
        );
    }

    Ok(config)
}

fn apply_env_overrides(config: &mut NetcoachConfig) -> Result<()> {
    if let Some(v) = env_override("NETCOACH_WEAK_THRESHOLD")? {
        config.thresholds.weak_below = v;
    }
    if let Some(v) = env_override("NETCOACH_STRONG_THRESHOLD")? {
        config.thresholds.strong_at_least = v;
    }
    if let Some(v) = env_override("NETCOACH_MIN_SAMPLE")? {
        config.thresholds.min_weak_sample = v;
    }
    if let Some(v) = env_override("NETCOACH_PARALLELISM")? {
        config.parallelism = v;
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("netcoach"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_NETCOACH_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_NETCOACH_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_NETCOACH_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_close_${brace"), "no_close_${brace");
        std::env::remove_var("_NETCOACH_TEST_VAR");
    }

    #[test]
    fn resolved_values_are_not_rescanned() {
        std::env::set_var("_NETCOACH_LOOP_VAR", "${_NETCOACH_LOOP_VAR}");
        assert_eq!(
            resolve_env_vars("a/${_NETCOACH_LOOP_VAR}/b"),
            "a/${_NETCOACH_LOOP_VAR}/b"
        );
        std::env::remove_var("_NETCOACH_LOOP_VAR");
    }

    #[test]
    fn default_config() {
        let config = NetcoachConfig::default();
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.default_format, "text");
        assert_eq!(config.thresholds.weak_below, 60.0);
        assert_eq!(config.thresholds.strong_at_least, 80.0);
    }

    #[test]
    fn parse_config_with_partial_thresholds() {
        let toml_str = r#"
data = "students.json"
parallelism = 8

[thresholds]
weak_below = 55.0
"#;
        let config: NetcoachConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.parallelism, 8);
        assert_eq!(config.thresholds.weak_below, 55.0);
        assert_eq!(config.thresholds.strong_at_least, 80.0);
        assert_eq!(config.data, Some(PathBuf::from("students.json")));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        assert!(load_config_from(Some(Path::new("/nonexistent/netcoach.toml"))).is_err());
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netcoach.toml");
        std::fs::write(&path, "default_format = \"json\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_format, "json");
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netcoach.toml");
        std::fs::write(
            &path,
            "[thresholds]\nweak_below = 90.0\nstrong_at_least = 70.0\n",
        )
        .unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }
}
