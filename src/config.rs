// SPDX-FileCopyrightText: (C) 2020 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::client::{Client, ClientBuilder, DEFAULT_URL};
use crate::prelude::*;

pub const ENV_PREFIX: &str = "EVENTMON";

pub const FILENAME: &str = "eventmon.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("{key}: expected a boolean, got {value}")]
    InvalidBool { key: String, value: String },
}

/// The location of the configuration file when none is given on the
/// command line.
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "eventmon").map(|dirs| dirs.config_dir().join(FILENAME))
}

/// Configuration values from the environment and an optional YAML file.
///
/// Keys are dotted paths into the YAML document, `api.url` for example.
/// An environment variable derived from the key, `EVENTMON_API_URL`, takes
/// precedence over the file.
#[derive(Debug, Default)]
pub struct Config {
    config: serde_yaml::Value,
}

impl Config {
    /// Load `filename` if given, otherwise the default file if it exists.
    pub fn load(filename: Option<&Path>) -> Result<Self, ConfigError> {
        match filename {
            Some(filename) => Self::from_file(filename),
            None => match default_path() {
                Some(path) if path.exists() => {
                    debug!("Loading configuration from {}", path.display());
                    Self::from_file(&path)
                }
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(filename: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(filename).map_err(|source| ConfigError::Io {
            path: filename.to_path_buf(),
            source,
        })?;
        let config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: filename.to_path_buf(),
            source,
        })?;
        Ok(Self { config })
    }

    pub fn env_key(key: &str) -> String {
        let xform = key.replace(['.', '-'], "_");
        format!("{}_{}", ENV_PREFIX, xform.to_uppercase())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        if let Ok(val) = std::env::var(Self::env_key(key)) {
            return Some(val);
        }
        match self.find_value(key) {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// A missing key is false.
    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        if let Ok(val) = std::env::var(Self::env_key(key)) {
            return match val.to_lowercase().as_ref() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" | "" => Ok(false),
                _ => Err(ConfigError::InvalidBool {
                    key: key.to_string(),
                    value: val,
                }),
            };
        }
        match self.find_value(key) {
            serde_yaml::Value::Bool(v) => Ok(*v),
            serde_yaml::Value::Null => Ok(false),
            other => Err(ConfigError::InvalidBool {
                key: key.to_string(),
                value: format!("{other:?}"),
            }),
        }
    }

    fn find_value(&self, key: &str) -> &serde_yaml::Value {
        let val = &self.config[key];
        if !val.is_null() {
            return val;
        }
        let mut value = &self.config;
        for part in key.split('.') {
            value = &value[part];
        }
        value
    }

    /// Build the API client. Explicit values, usually from the command
    /// line, win over configured ones.
    pub fn client(&self, url: Option<&str>, api_key: Option<&str>) -> anyhow::Result<Client> {
        let url = url
            .map(str::to_string)
            .or_else(|| self.get_string("api.url"))
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        let api_key = api_key
            .map(str::to_string)
            .or_else(|| self.get_string("api.key"))
            .unwrap_or_default();
        let insecure = self.get_bool("api.no-check-certificate")?;
        debug!("Using API at {}", url);
        let client = ClientBuilder::new(&url)
            .with_api_key(&api_key)
            .disable_certificate_validation(insecure)
            .build()
            .with_context(|| format!("bad api url: {url}"))?;
        Ok(client)
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    fn config(yaml: &str) -> Config {
        Config {
            config: serde_yaml::from_str(yaml).unwrap(),
        }
    }

    #[test]
    fn test_env_key() {
        assert_eq!(Config::env_key("api.url"), "EVENTMON_API_URL");
        assert_eq!(
            Config::env_key("api.no-check-certificate"),
            "EVENTMON_API_NO_CHECK_CERTIFICATE"
        );
    }

    #[test]
    fn test_dotted_lookup() {
        let config = config(
            r#"
api:
  url: https://events.example.com
  port: 8443
  verbose: true
"flat.key": flat
"#,
        );
        assert_eq!(
            config.get_string("api.url").as_deref(),
            Some("https://events.example.com")
        );
        assert_eq!(config.get_string("api.port").as_deref(), Some("8443"));
        assert_eq!(config.get_string("flat.key").as_deref(), Some("flat"));
        assert!(config.get_string("api.missing").is_none());
        assert!(config.get_bool("api.verbose").unwrap());
        assert!(!config.get_bool("api.missing-flag").unwrap());
        assert!(config.get_bool("api.url").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let config = config("test:\n  override: file\n");
        assert_eq!(config.get_string("test.override").as_deref(), Some("file"));
        std::env::set_var("EVENTMON_TEST_OVERRIDE", "env");
        assert_eq!(config.get_string("test.override").as_deref(), Some("env"));
        std::env::remove_var("EVENTMON_TEST_OVERRIDE");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api:\n  url: http://10.16.1.10:8080\n  key: secret").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.get_string("api.key").as_deref(), Some("secret"));

        let client = config.client(None, None).unwrap();
        assert_eq!(client.url(), "http://10.16.1.10:8080");
        let client = config.client(Some("http://localhost:9000/"), None).unwrap();
        assert_eq!(client.url(), "http://localhost:9000");
    }

    #[test]
    fn test_bad_files() {
        let missing = Config::from_file(Path::new("/nonexistent/eventmon.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api: [unclosed").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
