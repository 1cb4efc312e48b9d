use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::parser::markdown::DEFAULT_HIDDEN_NAMESPACES;
use crate::parser::rewrite::DEFAULT_MAX_PASSES;

/// Config file looked up in the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "wikiplain";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Link namespaces whose `[[NS:...]]` links are dropped.
    pub hidden_namespaces: Vec<String>,
    /// Cap on rewrite passes per processor.
    pub max_passes: usize,
    /// Default target for per-stage snapshots.
    pub dump_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            hidden_namespaces: DEFAULT_HIDDEN_NAMESPACES.iter().map(|s| s.to_string()).collect(),
            max_passes: DEFAULT_MAX_PASSES,
            dump_dir: None,
        }
    }
}

impl Settings {
    /// Defaults, then the config file, then `WIKI_*` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let settings = Config::builder()
            .set_default("hidden_namespaces", DEFAULT_HIDDEN_NAMESPACES.to_vec())?
            .set_default("max_passes", DEFAULT_MAX_PASSES as i64)?
            .add_source(file)
            .add_source(
                Environment::with_prefix("WIKI")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("hidden_namespaces"),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
