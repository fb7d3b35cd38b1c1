pub mod check;
pub mod init;
pub mod prepare;
pub mod tokens;

use medalign_config::PrepConfig;
use std::path::PathBuf;

pub fn default_config_path() -> PathBuf {
    PrepConfig::config_dir().join("config.toml")
}
