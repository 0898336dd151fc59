//! Spacing tokens, density scaling, and the resolved project style record
//!
//! Everything in this module is a pure lookup: semantic tokens in, pixel
//! values out. Density multiplies density-aware values by a per-level factor
//! and rounds to whole pixels; literal pixel values supplied on components
//! bypass scaling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Semantic spacing scale used for padding and gaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacingToken {
    None,
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

impl SpacingToken {
    /// Base pixel value before density scaling
    pub fn px(self) -> f64 {
        match self {
            SpacingToken::None => 0.0,
            SpacingToken::Xs => 4.0,
            SpacingToken::Sm => 8.0,
            SpacingToken::Md => 16.0,
            SpacingToken::Lg => 24.0,
            SpacingToken::Xl => 32.0,
        }
    }

    /// Parse a token name; unknown names return None so callers can fall back
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(SpacingToken::None),
            "xs" => Some(SpacingToken::Xs),
            "sm" => Some(SpacingToken::Sm),
            "md" => Some(SpacingToken::Md),
            "lg" => Some(SpacingToken::Lg),
            "xl" => Some(SpacingToken::Xl),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpacingToken::None => "none",
            SpacingToken::Xs => "xs",
            SpacingToken::Sm => "sm",
            SpacingToken::Md => "md",
            SpacingToken::Lg => "lg",
            SpacingToken::Xl => "xl",
        }
    }
}

/// Global density level scaling spacing and default control dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Compact,
    Normal,
    Comfortable,
}

impl Density {
    pub fn factor(self) -> f64 {
        match self {
            Density::Compact => 0.8,
            Density::Normal => 1.0,
            Density::Comfortable => 1.25,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "compact" => Some(Density::Compact),
            "normal" => Some(Density::Normal),
            "comfortable" => Some(Density::Comfortable),
            _ => None,
        }
    }

    /// Scale a density-aware base value and round to whole pixels
    pub fn scale(self, base: f64) -> f64 {
        (base * self.factor()).round()
    }
}

/// Stroke weight for borders and outlines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeLevel {
    Thin,
    Normal,
    Thick,
}

impl StrokeLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "thin" => Some(StrokeLevel::Thin),
            "normal" => Some(StrokeLevel::Normal),
            "thick" => Some(StrokeLevel::Thick),
            _ => None,
        }
    }
}

/// Resolve a spacing token string to pixels.
///
/// Unknown or absent tokens use the fallback token. Density scaling applies
/// only when `density_aware` is set: container gap and padding scale with
/// density, literal component-supplied pixel values do not.
pub fn resolve_spacing(
    token: Option<&str>,
    fallback: SpacingToken,
    density: Density,
    density_aware: bool,
) -> f64 {
    let resolved = token
        .and_then(SpacingToken::parse)
        .unwrap_or(fallback);
    if density_aware {
        density.scale(resolved.px())
    } else {
        resolved.px()
    }
}

/// Default height of a generic control row (buttons, inputs, table rows)
pub fn control_height(density: Density) -> f64 {
    density.scale(40.0)
}

/// Body font size in pixels
pub fn font_size(density: Density) -> f64 {
    match density {
        Density::Compact => 13.0,
        Density::Normal => 14.0,
        Density::Comfortable => 16.0,
    }
}

/// Heading font size in pixels
pub fn heading_font_size(density: Density) -> f64 {
    match density {
        Density::Compact => 18.0,
        Density::Normal => 20.0,
        Density::Comfortable => 24.0,
    }
}

/// Line height for wrapped text at a given font size
pub fn line_height(font_px: f64) -> f64 {
    (font_px * 1.45).round()
}

/// Named viewport presets; unknown names fall back to desktop
pub fn device_viewport(device: Option<&str>) -> (f64, f64) {
    match device {
        Some("laptop") => (1024.0, 768.0),
        Some("tablet") => (834.0, 1112.0),
        Some("mobile") => (390.0, 844.0),
        _ => (1280.0, 800.0),
    }
}

/// Project style record with every token resolved to a concrete value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub density: Density,
    pub spacing: SpacingToken,
    pub radius: SpacingToken,
    pub stroke: StrokeLevel,
    pub font: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            density: Density::Normal,
            spacing: SpacingToken::Md,
            radius: SpacingToken::Md,
            stroke: StrokeLevel::Normal,
            font: "base".to_string(),
            background: None,
            theme: None,
            device: None,
        }
    }
}

impl ResolvedStyle {
    /// Apply a project's raw style tokens over the defaults.
    ///
    /// Unrecognized values for the enumerated tokens keep the default rather
    /// than failing; free-form tokens (font, background, theme, device) pass
    /// through as written.
    pub fn from_tokens(tokens: &BTreeMap<String, String>) -> Self {
        let mut style = Self::default();
        for (key, value) in tokens {
            match key.as_str() {
                "density" => {
                    if let Some(d) = Density::parse(value) {
                        style.density = d;
                    }
                }
                "spacing" => {
                    if let Some(t) = SpacingToken::parse(value) {
                        style.spacing = t;
                    }
                }
                "radius" => {
                    if let Some(t) = SpacingToken::parse(value) {
                        style.radius = t;
                    }
                }
                "stroke" => {
                    if let Some(s) = StrokeLevel::parse(value) {
                        style.stroke = s;
                    }
                }
                "font" => style.font = value.clone(),
                "background" => style.background = Some(value.clone()),
                "theme" => style.theme = Some(value.clone()),
                "device" => style.device = Some(value.clone()),
                _ => {}
            }
        }
        style
    }

    /// Viewport dimensions for this style's device preset
    pub fn viewport(&self) -> (f64, f64) {
        device_viewport(self.device.as_deref())
    }
}
