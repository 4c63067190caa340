use std::{fmt, path::PathBuf, str::FromStr};

use crate::foundation::{
    core::Rgb,
    error::{BackdropError, BackdropResult},
};

/// Gradient direction of the background color fill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Flat `color1`, no gradient.
    Solid,
    /// Color varies along the x axis.
    #[serde(rename = "horizontal-gradient")]
    Horizontal,
    /// Color varies along the y axis.
    #[default]
    #[serde(rename = "vertical-gradient")]
    Vertical,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Horizontal => "horizontal-gradient",
            Self::Vertical => "vertical-gradient",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = BackdropError;

    fn from_str(s: &str) -> BackdropResult<Self> {
        match s {
            "solid" => Ok(Self::Solid),
            "horizontal-gradient" => Ok(Self::Horizontal),
            "vertical-gradient" => Ok(Self::Vertical),
            other => Err(BackdropError::validation(format!(
                "unknown color shading type '{other}'"
            ))),
        }
    }
}

/// How the wallpaper picture is positioned relative to the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Placement {
    /// Repeated from the top-left corner.
    #[default]
    #[serde(rename = "wallpaper")]
    Tiled,
    /// Unscaled, centered, cropped when larger than the viewport.
    #[serde(rename = "centered")]
    Centered,
    /// Scaled to fit while keeping the aspect ratio.
    #[serde(rename = "scaled")]
    ScaledAspect,
    /// Scaled to the full target, aspect ignored.
    #[serde(rename = "stretched")]
    Stretched,
}

impl Placement {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tiled => "wallpaper",
            Self::Centered => "centered",
            Self::ScaledAspect => "scaled",
            Self::Stretched => "stretched",
        }
    }

    /// Whether an opaque picture with this placement covers the whole target.
    pub fn always_covers(self) -> bool {
        matches!(self, Self::Tiled | Self::Stretched)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = BackdropError;

    fn from_str(s: &str) -> BackdropResult<Self> {
        match s {
            "wallpaper" | "tiled" => Ok(Self::Tiled),
            "centered" => Ok(Self::Centered),
            "scaled" => Ok(Self::ScaledAspect),
            "stretched" => Ok(Self::Stretched),
            other => Err(BackdropError::validation(format!(
                "unsupported picture placement '{other}'"
            ))),
        }
    }
}

/// Immutable description of how the desktop background should look.
///
/// `orientation == Solid` if and only if `gradient_enabled` is false; the setters keep that
/// invariant and [`Preferences::validate`] rejects snapshots that break it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub enabled: bool,
    pub gradient_enabled: bool,
    pub orientation: Orientation,
    pub color1: Rgb,
    pub color2: Rgb,
    pub wallpaper_enabled: bool,
    pub placement: Placement,
    pub wallpaper_filename: Option<PathBuf>,
    pub adjust_opacity: bool,
    /// Picture opacity on the 0-100 scale; only meaningful with `adjust_opacity`.
    pub opacity: u8,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            enabled: true,
            gradient_enabled: true,
            orientation: Orientation::Vertical,
            color1: Rgb::new(0x39, 0x37, 0x4b),
            color2: Rgb::new(0x42, 0x52, 0x8f),
            wallpaper_enabled: false,
            placement: Placement::Tiled,
            wallpaper_filename: None,
            adjust_opacity: true,
            opacity: 100,
        }
    }
}

impl Preferences {
    pub const MAX_OPACITY: u8 = 100;

    pub fn validate(&self) -> BackdropResult<()> {
        if (self.orientation == Orientation::Solid) == self.gradient_enabled {
            return Err(BackdropError::validation(format!(
                "gradient_enabled={} contradicts orientation '{}'",
                self.gradient_enabled, self.orientation
            )));
        }
        if self.opacity > Self::MAX_OPACITY {
            return Err(BackdropError::validation(format!(
                "opacity {} exceeds {}",
                self.opacity,
                Self::MAX_OPACITY
            )));
        }
        Ok(())
    }

    /// Blend weight for the picture, `clamp(round((2.56 * opacity)^2 / 256), 0, 255)`.
    pub fn alpha(&self) -> u8 {
        let scaled = 2.56 * f64::from(self.opacity);
        (scaled * scaled / 256.0).round().clamp(0.0, 255.0) as u8
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Sets the shading type; `Solid` turns the gradient off.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.gradient_enabled = orientation != Orientation::Solid;
    }

    /// Turns the gradient on (vertical unless a direction was already chosen) or off.
    pub fn set_gradient_enabled(&mut self, enabled: bool) {
        self.gradient_enabled = enabled;
        if !enabled {
            self.orientation = Orientation::Solid;
        } else if self.orientation == Orientation::Solid {
            self.orientation = Orientation::Vertical;
        }
    }

    pub fn set_colors(&mut self, color1: Rgb, color2: Rgb) {
        self.color1 = color1;
        self.color2 = color2;
    }

    pub fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }

    /// Sets the picture; an empty path or `(none)` disables the wallpaper.
    pub fn set_wallpaper(&mut self, filename: Option<PathBuf>) {
        let filename = filename.filter(|p| {
            let s = p.as_os_str();
            !s.is_empty() && s != "(none)" && s != "none"
        });
        self.wallpaper_enabled = filename.is_some();
        self.wallpaper_filename = filename;
    }

    pub fn set_wallpaper_enabled(&mut self, enabled: bool) {
        self.wallpaper_enabled = enabled;
    }

    /// Sets the opacity; values of 100 and above mean "fully opaque, no adjustment".
    pub fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity.min(Self::MAX_OPACITY);
        self.adjust_opacity = opacity < Self::MAX_OPACITY;
    }

    pub fn set_adjust_opacity(&mut self, adjust: bool) {
        self.adjust_opacity = adjust;
    }

    pub fn from_json_str(s: &str) -> BackdropResult<Self> {
        let prefs: Self = serde_json::from_str(s)
            .map_err(|e| BackdropError::validation(format!("parse preferences JSON: {e}")))?;
        prefs.validate()?;
        Ok(prefs)
    }

    pub fn to_json_string(&self) -> BackdropResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BackdropError::config(format!("serialize preferences: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/prefs/model.rs"]
mod tests;
