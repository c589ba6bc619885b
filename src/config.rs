//! Runtime configuration.
//!
//! Values come from an optional `~/.demandtrack/config.json`, with
//! `DEMANDTRACK_BIND` and `DEMANDTRACK_DB` environment overrides on top.

use std::env;
use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_BIND: &str = "127.0.0.1:8200";
const DEFAULT_USER: &str = "system@example.com";

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server listens on.
    pub bind: String,
    /// Explicit database path; `None` means the per-user default.
    pub db_path: Option<PathBuf>,
    /// Principal recorded in audit fields when requests carry no user.
    pub default_user: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    bind: Option<String>,
    db_path: Option<PathBuf>,
    default_user: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: DEFAULT_BIND.to_string(),
            db_path: None,
            default_user: DEFAULT_USER.to_string(),
        }
    }
}

impl Config {
    /// Load the config file if present, then apply environment overrides.
    pub fn load() -> Self {
        let file = config_file_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|text| match serde_json::from_str::<ConfigFile>(&text) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring malformed config file");
                    None
                }
            })
            .unwrap_or_default();

        let defaults = Config::default();
        Config {
            bind: env::var("DEMANDTRACK_BIND")
                .ok()
                .or(file.bind)
                .unwrap_or(defaults.bind),
            db_path: env::var("DEMANDTRACK_DB")
                .ok()
                .map(PathBuf::from)
                .or(file.db_path),
            default_user: file.default_user.unwrap_or(defaults.default_user),
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    Some(dirs::home_dir()?.join(".demandtrack").join("config.json"))
}
