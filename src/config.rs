use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    applier::DEFAULT_PREVIEW_SIZE,
    foundation::{
        core::Size,
        error::{BackdropError, BackdropResult},
    },
};

pub const ENV_LEGACY_CONFIG: &str = "BACKDROP_LEGACY_CONFIG";
pub const ENV_LOWER_PRIORITY: &str = "BACKDROP_LOWER_PRIORITY";
pub const ENV_SCREEN: &str = "BACKDROP_SCREEN";
pub const ENV_LOG: &str = "BACKDROP_LOG";

/// Process configuration: defaults, then an optional JSON file, then the environment.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Key file receiving the legacy mirror; `None` disables it.
    pub legacy_config: Option<PathBuf>,
    /// Drop to the lowest scheduling priority before rendering the desktop.
    pub lower_priority: bool,
    /// Screen size of the in-memory display.
    pub screen: Size,
    pub preview_size: Size,
    /// X display name; `None` uses `$DISPLAY`.
    pub display: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            legacy_config: None,
            lower_priority: true,
            screen: Size::new(1280, 1024),
            preview_size: DEFAULT_PREVIEW_SIZE,
            display: None,
        }
    }
}

impl AppConfig {
    pub fn from_json_file(path: &Path) -> BackdropResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| BackdropError::config(format!("parse '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults or `path`, with process environment overrides applied.
    pub fn load(path: Option<&Path>) -> BackdropResult<Self> {
        let mut cfg = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Override fields from `lookup` (normally the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> BackdropResult<()> {
        if let Some(path) = lookup(ENV_LEGACY_CONFIG) {
            self.legacy_config = (!path.is_empty()).then(|| PathBuf::from(path));
        }
        if let Some(v) = lookup(ENV_LOWER_PRIORITY) {
            self.lower_priority = parse_flag(ENV_LOWER_PRIORITY, &v)?;
        }
        if let Some(v) = lookup(ENV_SCREEN) {
            self.screen = v.parse()?;
        }
        self.validate()
    }

    pub fn validate(&self) -> BackdropResult<()> {
        if self.screen.is_empty() {
            return Err(BackdropError::config(format!(
                "screen must be non-empty (got {})",
                self.screen
            )));
        }
        if self.preview_size.is_empty() {
            return Err(BackdropError::config(format!(
                "preview_size must be non-empty (got {})",
                self.preview_size
            )));
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> BackdropResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(BackdropError::config(format!(
            "{key}: expected a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
