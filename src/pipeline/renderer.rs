use image::RgbImage;

use crate::{
    foundation::core::{Rect, Rgb, Size},
    prefs::model::{Orientation, Preferences},
    render::{geometry::PlacementGeometry, wallpaper::WallpaperImage},
    surface::{display::SurfaceId, manager::Surface},
};

/// Cross-axis size of the gradient strip used for a wallpaper-less desktop.
pub const STRIP_THICKNESS: u32 = 32;

/// What the shared root currently shows on behalf of a primary renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootMode {
    Surface(SurfaceId),
    Solid(Rgb),
}

/// Per-target render state, reused across applies.
///
/// Buffers are replaced wholesale when recomputed, never edited after being stored, so their
/// identity tells whether an apply reallocated them.
#[derive(Debug)]
pub struct Renderer {
    pub(crate) primary: bool,
    pub(crate) target: Rect,
    pub(crate) viewport: Size,
    pub(crate) current: Option<Preferences>,
    pub(crate) wallpaper: Option<WallpaperImage>,
    pub(crate) gradient: Option<RgbImage>,
    pub(crate) composited: Option<RgbImage>,
    pub(crate) geometry: Option<PlacementGeometry>,
    pub(crate) surface: Option<Surface>,
    pub(crate) root: Option<RootMode>,
}

impl Renderer {
    /// Renderer for the real desktop of a `screen` sized display.
    pub fn primary(screen: Size) -> Self {
        Self::new(true, Rect::from_size(screen), screen, None)
    }

    /// Renderer drawing a `size` preview of a `screen` sized desktop onto a local canvas.
    pub fn preview(size: Size, screen: Size) -> Self {
        Self::new(
            false,
            Rect::from_size(size),
            screen,
            Some(Surface::canvas(size)),
        )
    }

    fn new(primary: bool, target: Rect, viewport: Size, surface: Option<Surface>) -> Self {
        Self {
            primary,
            target,
            viewport,
            current: None,
            wallpaper: None,
            gradient: None,
            composited: None,
            geometry: None,
            surface,
            root: None,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn target(&self) -> Rect {
        self.target
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Preferences of the last apply, as they were actually rendered.
    pub fn current_prefs(&self) -> Option<&Preferences> {
        self.current.as_ref()
    }

    pub fn wallpaper(&self) -> Option<&WallpaperImage> {
        self.wallpaper.as_ref()
    }

    pub fn gradient_buffer(&self) -> Option<&RgbImage> {
        self.gradient.as_ref()
    }

    pub fn composited_buffer(&self) -> Option<&RgbImage> {
        self.composited.as_ref()
    }

    pub fn geometry(&self) -> Option<PlacementGeometry> {
        self.geometry
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Preview pixels; `None` for the primary target, whose pixels live on the display.
    pub fn preview_pixels(&self) -> Option<&RgbImage> {
        self.surface.as_ref().and_then(Surface::pixels)
    }

    pub fn is_published(&self) -> bool {
        matches!(self.root, Some(RootMode::Surface(_)))
    }

    pub fn root_mode(&self) -> Option<RootMode> {
        self.root
    }
}

/// Whether a gradient stays visible under the wallpaper.
///
/// An opaque tiled or stretched picture, or one exactly the size of the target, hides it.
pub fn show_gradient(prefs: &Preferences, image: Option<Size>, target: Size) -> bool {
    prefs.gradient_enabled
        && !(prefs.wallpaper_enabled
            && !prefs.adjust_opacity
            && (prefs.placement.always_covers() || image == Some(target)))
}

/// A pure gradient desktop only needs a strip that the server tiles across the root.
pub fn use_small_surface(prefs: &Preferences) -> bool {
    prefs.gradient_enabled && !prefs.wallpaper_enabled
}

pub(crate) fn gradient_size(prefs: &Preferences, primary: bool, target: Size) -> Size {
    if !primary || prefs.wallpaper_enabled {
        return target;
    }
    match prefs.orientation {
        Orientation::Horizontal => Size::new(target.width, target.height.min(STRIP_THICKNESS)),
        Orientation::Vertical => Size::new(target.width.min(STRIP_THICKNESS), target.height),
        Orientation::Solid => target,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/renderer.rs"]
mod tests;
