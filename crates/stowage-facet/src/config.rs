use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FacetError, FacetResult};

/// Source of values for configuration-key facets.
pub trait ConfigProvider: Send + Sync {
    /// The value for `key`, or `None` if the key is missing.
    fn lookup(&self, key: &str) -> Option<String>;
}

/// In-memory configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapConfig {
    values: BTreeMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigProvider for MapConfig {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Engine configuration, usually loaded from a TOML file.
///
/// ```toml
/// env_prefix = "STOWAGE"
///
/// [settings]
/// "orders.root" = "/var/lib/orders"
///
/// [settings.archive]
/// root = "/srv/archive"
/// level = 19
/// ```
///
/// Nested tables flatten into dotted keys (`archive.root`) and scalar
/// values are kept in their TOML text form. Keys missing from `settings`
/// fall back to the environment when `env_prefix` is set: `archive.root`
/// is read from `STOWAGE_ARCHIVE_ROOT`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawConfig")]
pub struct EngineConfig {
    pub settings: BTreeMap<String, String>,
    pub env_prefix: Option<String>,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    settings: toml::Table,
    #[serde(default)]
    env_prefix: Option<String>,
}

impl From<RawConfig> for EngineConfig {
    fn from(raw: RawConfig) -> Self {
        let mut settings = BTreeMap::new();
        flatten("", &raw.settings, &mut settings);
        Self {
            settings,
            env_prefix: raw.env_prefix,
        }
    }
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(nested) => flatten(&key, nested, out),
            toml::Value::String(s) => {
                out.insert(key, s.clone());
            }
            other => {
                out.insert(key, other.to_string());
            }
        }
    }
}

impl EngineConfig {
    /// Configuration read only from environment variables named
    /// `{prefix}_{KEY}`.
    pub fn from_env(prefix: impl Into<String>) -> Self {
        Self {
            settings: BTreeMap::new(),
            env_prefix: Some(prefix.into()),
        }
    }

    pub fn from_toml_str(text: &str) -> FacetResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> FacetResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FacetError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Environment variable consulted for `key`, if an env prefix is set.
    pub fn env_var(&self, key: &str) -> Option<String> {
        let prefix = self.env_prefix.as_deref()?;
        let key: String = key
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        Some(format!("{prefix}_{key}"))
    }
}

impl EngineConfig {
    /// Like [`ConfigProvider::lookup`], reading environment variables
    /// through `env` instead of the process environment.
    pub fn lookup_with(
        &self,
        key: &str,
        env: impl FnOnce(&str) -> Option<String>,
    ) -> Option<String> {
        if let Some(value) = self.settings.get(key) {
            return Some(value.clone());
        }
        let var = self.env_var(key)?;
        env(&var)
    }
}

impl ConfigProvider for EngineConfig {
    fn lookup(&self, key: &str) -> Option<String> {
        self.lookup_with(key, |var| std::env::var(var).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_empty() {
        let c = EngineConfig::default();
        assert!(c.settings.is_empty());
        assert!(c.env_prefix.is_none());
        assert_eq!(c.lookup("anything"), None);
    }

    #[test]
    fn toml_tables_flatten_to_dotted_keys() {
        let c = EngineConfig::from_toml_str(
            r#"
            env_prefix = "STOWAGE"

            [settings]
            "orders.root" = "/var/lib/orders"

            [settings.archive]
            root = "/srv/archive"
            level = 19
            compact = true
            "#,
        )
        .unwrap();
        assert_eq!(c.lookup("orders.root").as_deref(), Some("/var/lib/orders"));
        assert_eq!(c.lookup("archive.root").as_deref(), Some("/srv/archive"));
        assert_eq!(c.lookup("archive.level").as_deref(), Some("19"));
        assert_eq!(c.lookup("archive.compact").as_deref(), Some("true"));
        assert_eq!(c.env_prefix.as_deref(), Some("STOWAGE"));
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("settings = 3"),
            Err(FacetError::ConfigParse(_))
        ));
    }

    #[test]
    fn env_var_names() {
        let c = EngineConfig::from_env("APP");
        assert_eq!(c.env_var("orders.root-dir").as_deref(), Some("APP_ORDERS_ROOT_DIR"));
        assert_eq!(EngineConfig::default().env_var("x"), None);
    }

    #[test]
    fn env_fallback() {
        let env = |var: &str| (var == "APP_ENV_ROOT").then(|| "/from/env".to_string());
        let c = EngineConfig::from_env("APP");
        assert_eq!(c.lookup_with("env.root", env).as_deref(), Some("/from/env"));
        assert_eq!(c.lookup_with("env.other", env), None);
        let c = c.with_setting("env.root", "/from/settings");
        assert_eq!(c.lookup_with("env.root", env).as_deref(), Some("/from/settings"));
        assert_eq!(EngineConfig::default().lookup_with("env.root", env), None);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stowage.toml");
        std::fs::write(&path, "[settings]\nroot = \"/x\"\n").unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap().lookup("root").as_deref(), Some("/x"));
        assert!(matches!(
            EngineConfig::load(dir.path().join("missing.toml")),
            Err(FacetError::ConfigRead { .. })
        ));
    }

    #[test]
    fn map_config_collects_pairs() {
        let c: MapConfig = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(c.lookup("b").as_deref(), Some("2"));
        assert_eq!(MapConfig::new().with("k", "v").lookup("k").as_deref(), Some("v"));
    }
}
