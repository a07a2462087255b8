use crate::file_ops::{BLOCK_SIZE, MAX_BLOCK_SIZE};
use crate::models::Algorithm;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings loaded from `<config dir>/hashutil/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Algorithm preselected when the window opens.
    pub default_algorithm: Algorithm,
    /// Bytes read per block while hashing.
    pub block_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_algorithm: Algorithm::Blake2b,
            block_size: BLOCK_SIZE,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("no config directory for this platform")?;
    Ok(dir.join("hashutil").join("config.toml"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AppConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        let default_cfg = AppConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut cfg: AppConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    if cfg.block_size == 0 || cfg.block_size > MAX_BLOCK_SIZE {
        tracing::warn!(
            block_size = cfg.block_size,
            max = MAX_BLOCK_SIZE,
            "configured block size out of range, using default"
        );
        cfg.block_size = BLOCK_SIZE;
    }
    if !Algorithm::SUPPORTED.contains(&cfg.default_algorithm) {
        tracing::warn!(
            algorithm = %cfg.default_algorithm,
            "configured default algorithm cannot be computed"
        );
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.default_algorithm, Algorithm::Blake2b);
        assert_eq!(cfg.block_size, 4096);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            default_algorithm = "sha3_256"
            block_size = 65536
        "#;
        let cfg: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.default_algorithm, Algorithm::Sha3_256);
        assert_eq!(cfg.block_size, 65536);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: AppConfig = toml::from_str(r#"default_algorithm = "shake_128""#).unwrap();
        assert_eq!(cfg.default_algorithm, Algorithm::Shake128);
        assert_eq!(cfg.block_size, BLOCK_SIZE);
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        assert!(toml::from_str::<AppConfig>(r#"default_algorithm = "crc32""#).is_err());
    }

    #[test]
    fn load_or_init_writes_default_then_reads_it_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let created = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        fs::write(&path, "default_algorithm = \"md5\"\n").unwrap();
        let loaded = load_or_init_at(&path).unwrap();
        assert_eq!(created, AppConfig::default());
        assert_eq!(loaded.default_algorithm, Algorithm::Md5);
    }

    #[test]
    fn out_of_range_block_size_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "block_size = 1099511627776\n").unwrap();
        assert_eq!(load_or_init_at(&path).unwrap().block_size, BLOCK_SIZE);

        fs::write(&path, "block_size = 0\n").unwrap();
        assert_eq!(load_or_init_at(&path).unwrap().block_size, BLOCK_SIZE);

        fs::write(&path, "block_size = 1048576\n").unwrap();
        assert_eq!(load_or_init_at(&path).unwrap().block_size, 1 << 20);
    }
}
