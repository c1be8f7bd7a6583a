//! Loader for fetch configuration with TOML + environment overlays.
//!
//! Precedence is file first, then `ANYFETCH_`-prefixed environment
//! variables; `${VAR}` placeholders in string values are expanded after
//! the sources are merged.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Knobs the fetch facade reads at context construction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchConfig {
    /// Delegate identifiers to try first during selection, in order.
    #[serde(default)]
    pub prefer: Vec<String>,
    /// Enable payload-introspection tracing events.
    #[serde(default)]
    pub verbose: bool,
    /// Directory the cache collaborator is rooted at when a call does
    /// not pass one explicitly.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl FetchConfig {
    /// Platform cache directory used when nothing else is configured,
    /// e.g. `~/.cache/anyfetch` on Linux.
    pub fn default_cache_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join("anyfetch"))
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (TOML file + env overrides).
pub struct FetchConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for FetchConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchConfigLoader {
    /// Start empty; with no files attached, [`load`](Self::load) yields
    /// the `ANYFETCH__`-separated env overrides over the defaults.
    ///
    /// ```
    /// use anyfetch_common::config::FetchConfigLoader;
    ///
    /// let cfg = FetchConfigLoader::new().load().expect("valid config");
    /// assert!(cfg.prefer.is_empty());
    /// assert!(!cfg.verbose);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a config file; missing files are skipped so deployments can
    /// rely purely on environment variables.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline TOML snippet (tests and embedders).
    ///
    /// ```
    /// use anyfetch_common::config::FetchConfigLoader;
    ///
    /// let cfg = FetchConfigLoader::new()
    ///     .with_toml_str("prefer = [\"reqwest\", \"ureq\"]\nverbose = true")
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(cfg.prefer, ["reqwest", "ureq"]);
    /// assert!(cfg.verbose);
    /// ```
    pub fn with_toml_str(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, config::FileFormat::Toml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// `${VAR}` placeholders are expanded (recursively, with a depth cap)
    /// before the strongly typed struct is materialised.
    pub fn load(self) -> Result<FetchConfig, ConfigError> {
        // Environment overrides go in last so they win over every file.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("ANYFETCH")
                    .separator("__")
                    // bools like ANYFETCH__VERBOSE=true must not stay strings
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: FetchConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CLIENT", Some("reqwest")), ("KIND", Some("text"))], || {
            let mut v = json!([
                "use-$CLIENT",
                { "tag": "${CLIENT}-${KIND}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["use-reqwest", { "tag": "reqwest-text" }, 42, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            // Only checking termination under the depth cap.
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }
}
