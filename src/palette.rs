//! Color palette for wireframe rendering
//!
//! Projects may override any of the built-in palette roles; the merged
//! palette is embedded in the IR contract so the renderer never needs to
//! know about defaults. Palettes can also be loaded from TOML files for
//! themed rendering.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing palettes
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Failed to read palette file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse palette TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A palette mapping color roles to concrete hex values
#[derive(Debug, Clone)]
pub struct Palette {
    /// Optional name for the palette
    pub name: Option<String>,
    /// Color mappings: role name -> hex color
    pub colors: BTreeMap<String, String>,
}

/// TOML structure for deserializing palettes
#[derive(Deserialize)]
struct TomlPalette {
    metadata: Option<TomlMetadata>,
    colors: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
}

/// Default wireframe palette - neutral surfaces with a blue accent
const DEFAULT_PALETTE: &str = r##"
[colors]
# Surfaces
surface = "#ffffff"
surface-muted = "#f5f6f8"
surface-inverse = "#1f2430"
border = "#d8dce2"

# Text
text-primary = "#1f2430"
text-muted = "#6b7280"
text-inverse = "#ffffff"

# Accent
accent = "#2563eb"
accent-muted = "#dbeafe"

# Status
success = "#16a34a"
warning = "#d97706"
danger = "#dc2626"
"##;

impl Palette {
    /// Load a palette from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, PaletteError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a palette from a TOML string
    pub fn from_str(content: &str) -> Result<Self, PaletteError> {
        let parsed: TomlPalette = toml::from_str(content)?;

        Ok(Palette {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            colors: parsed.colors,
        })
    }

    /// Resolve a color role to a concrete value
    pub fn resolve(&self, role: &str) -> Option<&str> {
        self.colors.get(role).map(|s| s.as_str())
    }

    /// Merge overrides on top of this palette; overrides win on conflicts
    pub fn merged(&self, overrides: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut colors = self.colors.clone();
        for (role, value) in overrides {
            colors.insert(role.clone(), value.clone());
        }
        colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_str(DEFAULT_PALETTE).expect("Default palette should be valid TOML")
    }
}
