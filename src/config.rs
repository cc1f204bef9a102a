//! `githelp.toml` - where the catalog database and its source document live

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GithelpConfig {
    /// SQLite file holding the catalog
    pub database: Option<String>,
    /// JSON document used by `load` when no file is given
    pub document: Option<String>,
}

impl GithelpConfig {
    /// Database to open: the command line wins, then the config file, then
    /// `.githelp/githelp.db` under the working directory
    pub fn database_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| default_database_path_in(Path::new(".")))
    }

    /// Document `load` reads when no file is given; `None` means the
    /// bundled catalog
    pub fn document_path(&self) -> Option<PathBuf> {
        self.document.as_ref().map(PathBuf::from)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("githelp.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".githelp").join("githelp.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<GithelpConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: GithelpConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &GithelpConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
