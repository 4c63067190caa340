//! Mirror of the background preferences into the legacy `Background` key file.
//!
//! Older desktop components read `/Background/Default/*` keys instead of the settings store,
//! so every primary apply writes a subset of the preferences here.

use std::{
    collections::BTreeMap,
    fmt::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    foundation::error::{BackdropError, BackdropResult},
    prefs::model::{Orientation, Placement, Preferences},
};

pub const LEGACY_SECTION: &str = "Default";

/// Typed value written to a legacy key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LegacyValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl LegacyValue {
    fn render(&self) -> String {
        match self {
            Self::Bool(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Str(v) => v.clone(),
        }
    }
}

/// Key/value sink for the legacy config mirror.
pub trait LegacyConfigStore {
    fn set(&mut self, section: &str, key: &str, value: LegacyValue) -> BackdropResult<()>;

    /// Flush pending writes.
    fn sync(&mut self) -> BackdropResult<()>;
}

/// Legacy picture alignment order: tiled, centered, stretched, scaled.
pub fn legacy_alignment(placement: Placement) -> i64 {
    match placement {
        Placement::Tiled => 0,
        Placement::Centered => 1,
        Placement::ScaledAspect => 3,
        Placement::Stretched => 2,
    }
}

/// Write the legacy subset of `prefs` and sync the store.
#[tracing::instrument(skip_all)]
pub fn mirror_legacy_prefs(
    store: &mut dyn LegacyConfigStore,
    prefs: &Preferences,
) -> BackdropResult<()> {
    let wallpaper = prefs
        .wallpaper_filename
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "none".to_string());
    let gradient = if prefs.orientation == Orientation::Vertical {
        "vertical"
    } else {
        "horizontal"
    };
    let simple = if prefs.gradient_enabled {
        "gradient"
    } else {
        "solid"
    };

    let entries = [
        ("Enabled", LegacyValue::Bool(prefs.enabled)),
        ("wallpaper", LegacyValue::Str(wallpaper)),
        (
            "wallpaperAlign",
            LegacyValue::Int(legacy_alignment(prefs.placement)),
        ),
        ("color1", LegacyValue::Str(prefs.color1.to_hex())),
        ("color2", LegacyValue::Str(prefs.color2.to_hex())),
        ("simple", LegacyValue::Str(simple.to_string())),
        ("gradient", LegacyValue::Str(gradient.to_string())),
        ("adjustOpacity", LegacyValue::Bool(prefs.adjust_opacity)),
        ("opacity", LegacyValue::Int(i64::from(prefs.opacity))),
    ];
    for (key, value) in entries {
        store.set(LEGACY_SECTION, key, value)?;
    }
    store.sync()
}

/// In-process store, used by tests and when no key file is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<(String, String), LegacyValue>,
    syncs: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&LegacyValue> {
        self.values.get(&(section.to_string(), key.to_string()))
    }

    pub fn sync_count(&self) -> usize {
        self.syncs
    }
}

impl LegacyConfigStore for MemoryStore {
    fn set(&mut self, section: &str, key: &str, value: LegacyValue) -> BackdropResult<()> {
        self.values
            .insert((section.to_string(), key.to_string()), value);
        Ok(())
    }

    fn sync(&mut self) -> BackdropResult<()> {
        self.syncs += 1;
        Ok(())
    }
}

/// Ini-style key file (`[Section]` headers, `key=value` lines).
///
/// Unknown sections and keys already present in the file are preserved on sync.
#[derive(Debug)]
pub struct KeyFileStore {
    path: PathBuf,
    sections: BTreeMap<String, BTreeMap<String, String>>,
    dirty: bool,
}

impl KeyFileStore {
    /// Open `path`, loading existing content when the file exists.
    pub fn open(path: impl Into<PathBuf>) -> BackdropResult<Self> {
        let path = path.into();
        let sections = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("read legacy config '{}'", path.display()))?;
            parse_key_file(&text)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            sections,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }
}

impl LegacyConfigStore for KeyFileStore {
    fn set(&mut self, section: &str, key: &str, value: LegacyValue) -> BackdropResult<()> {
        if key.contains(['=', '\n']) || section.contains([']', '\n']) {
            return Err(BackdropError::config(format!(
                "invalid legacy key '{section}/{key}'"
            )));
        }
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.render());
        self.dirty = true;
        Ok(())
    }

    fn sync(&mut self) -> BackdropResult<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create legacy config dir '{}'", parent.display()))?;
        }

        let mut out = String::new();
        for (section, keys) in &self.sections {
            let _ = writeln!(out, "[{section}]");
            for (k, v) in keys {
                let _ = writeln!(out, "{k}={v}");
            }
            out.push('\n');
        }
        std::fs::write(&self.path, out)
            .with_context(|| format!("write legacy config '{}'", self.path.display()))?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), "legacy config synced");
        Ok(())
    }
}

fn parse_key_file(text: &str) -> BackdropResult<BTreeMap<String, BTreeMap<String, String>>> {
    let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            sections.entry(name.to_string()).or_default();
            current = Some(name.to_string());
            continue;
        }
        let (k, v) = line.split_once('=').ok_or_else(|| {
            BackdropError::config(format!("legacy config line {}: expected key=value", lineno + 1))
        })?;
        let section = current.as_ref().ok_or_else(|| {
            BackdropError::config(format!(
                "legacy config line {}: key outside of a section",
                lineno + 1
            ))
        })?;
        sections
            .entry(section.clone())
            .or_default()
            .insert(k.trim().to_string(), v.trim().to_string());
    }
    Ok(sections)
}

#[cfg(test)]
#[path = "../../tests/unit/prefs/legacy.rs"]
mod tests;
