use crate::detail::render::Glyphs;
use crate::detail::DetailStyle;
use crate::storage::project_dirs;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Column budget for entry text; 0 follows the terminal width.
    pub wrap_width: usize,
    /// Show a whole collection when revealing it, if it fits.
    pub reveal_full: bool,
    pub log_filter: String,
    pub glyphs: GlyphOverrides,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GlyphOverrides {
    pub caret: Option<String>,
    pub completed: Option<String>,
    pub struck: Option<String>,
    pub locked: Option<String>,
    pub folded: Option<String>,
    pub locked_suffix: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            wrap_width: 0,
            reveal_full: true,
            log_filter: "info".into(),
            glyphs: GlyphOverrides::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        Self::load_from(&path)
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let config: Config =
            serde_yaml::from_str(&data).with_context(|| format!("parsing {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let glyphs = [
            &self.glyphs.caret,
            &self.glyphs.completed,
            &self.glyphs.struck,
            &self.glyphs.locked,
            &self.glyphs.folded,
        ];
        if glyphs
            .iter()
            .any(|g| g.as_deref().is_some_and(|g| g.trim().is_empty()))
        {
            anyhow::bail!("glyph overrides must not be blank");
        }
        Ok(())
    }

    pub fn detail_style(&self) -> DetailStyle {
        let defaults = Glyphs::default();
        let pick = |value: &Option<String>, fallback: String| value.clone().unwrap_or(fallback);
        DetailStyle {
            glyphs: Glyphs {
                caret: pick(&self.glyphs.caret, defaults.caret),
                completed: pick(&self.glyphs.completed, defaults.completed),
                struck: pick(&self.glyphs.struck, defaults.struck),
                locked: pick(&self.glyphs.locked, defaults.locked),
                folded: pick(&self.glyphs.folded, defaults.folded),
                locked_suffix: pick(&self.glyphs.locked_suffix, defaults.locked_suffix),
            },
            ..DetailStyle::default()
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE))
}
