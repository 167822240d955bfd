//! Operator configuration stored in `ioutils.toml`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::io::serializer::BUILTIN_TYPES;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "ioutils.toml";

/// Operator configuration (TOML).
///
/// Missing fields default to the full backend catalog and no exec timeout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IoConfig {
    /// Serializer backends to register, in lookup order.
    pub serializers: Vec<String>,

    pub exec: ExecConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecConfig {
    /// Kill exec'd processes that run longer than this. Unset means wait
    /// for the process to exit, however long it takes.
    pub timeout_secs: Option<u64>,
}

impl ExecConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            serializers: BUILTIN_TYPES.iter().map(|s| s.to_string()).collect(),
            exec: ExecConfig::default(),
        }
    }
}

impl IoConfig {
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in &self.serializers {
            if !BUILTIN_TYPES.contains(&name.as_str()) {
                return Err(anyhow!(
                    "serializers: unknown backend {name:?} (known: {})",
                    BUILTIN_TYPES.join(", ")
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(anyhow!("serializers: {name:?} listed more than once"));
            }
        }
        if self.exec.timeout_secs == Some(0) {
            return Err(anyhow!("exec.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `IoConfig::default()`.
pub fn load_config(path: &Path) -> Result<IoConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = IoConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: IoConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    debug!(path = %path.display(), serializers = ?cfg.serializers, timeout_secs = ?cfg.exec.timeout_secs, "config loaded");
    Ok(cfg)
}

/// Write `cfg` to `path`, replacing any existing file.
///
/// The TOML goes to a sibling temp file first and is renamed into place, so
/// readers never see a partial config. A comment header lists the backend
/// names `serializers` accepts.
pub fn write_config(path: &Path, cfg: &IoConfig) -> Result<()> {
    cfg.validate()?;
    let body = toml::to_string_pretty(cfg).context("serialize config toml")?;
    let contents = format!(
        "# Known serializer backends: {}\n{body}",
        BUILTIN_TYPES.join(", ")
    );

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents).with_context(|| format!("write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    debug!(path = %path.display(), "config written");
    Ok(())
}
