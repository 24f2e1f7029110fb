use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for the issue store.
///
/// Controls where the database document lives and how it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Path of the JSON database document.
    ///
    /// Relative paths are resolved against the directory containing the
    /// configuration file (see [`Config::database_path`]).
    database: PathBuf,

    /// Whether to pretty-print the JSON document.
    ///
    /// Pretty output is easier to diff and inspect by hand, at the cost of a
    /// larger file.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            pretty: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the configured database path, exactly as written.
    #[must_use]
    pub fn database(&self) -> &Path {
        &self.database
    }

    /// Sets the database path.
    pub fn set_database(&mut self, database: PathBuf) {
        self.database = database;
    }

    /// Returns the database path, resolving a relative path against `base`.
    ///
    /// `base` is normally the directory the configuration file was loaded
    /// from.
    #[must_use]
    pub fn database_path(&self, base: &Path) -> PathBuf {
        if self.database.is_absolute() {
            self.database.clone()
        } else {
            base.join(&self.database)
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("issues-db.json")
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_database")]
        database: PathBuf,

        #[serde(default)]
        pretty: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { database, pretty } => Self { database, pretty },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            database: config.database,
            pretty: config.pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ndatabase = \"data/issues.json\"\npretty = true\n")
            .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.database(), Path::new("data/issues.json"));
        assert!(config.pretty);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\npretty = \"yes\"\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("issues.toml");

        let mut config = Config::default();
        config.set_database(PathBuf::from("elsewhere.json"));
        config.pretty = true;
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("_version = \"1\""));
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn relative_database_resolves_against_base() {
        let config = Config::default();
        assert_eq!(
            config.database_path(Path::new("/srv/issues")),
            PathBuf::from("/srv/issues/issues-db.json")
        );
    }

    #[test]
    fn absolute_database_is_kept() {
        let mut config = Config::default();
        let absolute = std::env::temp_dir().join("db.json");
        config.set_database(absolute.clone());
        assert_eq!(config.database_path(Path::new("ignored")), absolute);
    }
}
