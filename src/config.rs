use crate::error::{Error, Result};
use serde_derive::Deserialize;
use std::path::{Path, PathBuf};

/// Settings read from a `--config` TOML file. Every key is optional and
/// is overridden by the matching command line option.
///
/// ```toml
/// target = "sdm845"
/// android_root = "/home/me/android"
/// docker_android_root = "/work/android"
/// output = "compile_commands.json"
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Build target (product) name.
    pub target: Option<String>,
    /// Build root on this machine.
    pub android_root: Option<PathBuf>,
    /// Build root as seen by the build, if it ran elsewhere.
    pub docker_android_root: Option<PathBuf>,
    /// Where to write the database.
    pub output: Option<PathBuf>,
}

impl Config {
    /// Read the given file into a config.
    pub fn read(path: &Path) -> Result<Config> {
        let data =
            std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&data).map_err(|e| Error::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Fill every unset field from `other`.
    pub fn or(self, other: Config) -> Config {
        Config {
            target: self.target.or(other.target),
            android_root: self.android_root.or(other.android_root),
            docker_android_root: self
                .docker_android_root
                .or(other.docker_android_root),
            output: self.output.or(other.output),
        }
    }
}
