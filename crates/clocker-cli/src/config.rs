//! Configuration loading and management.

use std::path::{Path, PathBuf};

use clocker_core::DateDialect;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// File name of the store inside the data directory.
pub const DATABASE_FILE: &str = "clocker.db";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the store and its lock file.
    pub data_dir: PathBuf,

    /// Editor command for `edit`; falls back to `$VISUAL` then `$EDITOR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// How ambiguous dates such as `02/03` are read.
    #[serde(default)]
    pub date_dialect: DateDialect,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            editor: None,
            date_dialect: DateDialect::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // CLOCKER_DATA_DIR, CLOCKER_EDITOR, CLOCKER_DATE_DIALECT
        figment = figment.merge(Env::prefixed("CLOCKER_"));

        figment.extract()
    }

    /// Applies a `--datadir` override.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Editor command to launch for `edit`.
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .filter(|cmd| !cmd.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string())
    }
}

/// Returns the platform-specific config directory for clocker.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("clocker"))
}

/// `~/.clocker`, or `.clocker` when there is no home directory.
fn default_data_dir() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(".clocker"), |home| home.join(".clocker"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn default_data_dir_is_in_home() {
        let config = Config::default();
        assert_eq!(config.data_dir.file_name().unwrap(), ".clocker");
        assert_eq!(config.database_path().file_name().unwrap(), DATABASE_FILE);
        assert_eq!(config.date_dialect, DateDialect::Us);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "data_dir = \"/tmp/clocker-test\"\neditor = \"nano\"\ndate_dialect = \"uk\""
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/clocker-test"));
        assert_eq!(config.editor.as_deref(), Some("nano"));
        assert_eq!(config.editor_command(), "nano");
        assert_eq!(config.date_dialect, DateDialect::Uk);
    }

    #[test]
    fn invalid_dialect_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date_dialect = \"martian\"").unwrap();
        file.flush().unwrap();

        assert!(Config::load_from(Some(file.path())).is_err());
    }

    #[test]
    fn datadir_flag_wins() {
        let config = Config::default().with_data_dir(Some(PathBuf::from("/srv/time")));
        assert_eq!(config.database_path(), PathBuf::from("/srv/time/clocker.db"));

        let unchanged = config.clone().with_data_dir(None);
        assert_eq!(unchanged.data_dir, config.data_dir);
    }
}
