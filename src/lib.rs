//! backdrop renders the desktop background and publishes it on a shared display.
//!
//! A background is described by immutable [`Preferences`]. The [`RenderPipeline`] brings a
//! [`Renderer`] from its previous preferences to new ones, recomputing only what changed:
//!
//! - fill the color gradient
//! - place and composite the wallpaper picture
//! - draw into a persistent shared surface and publish it as the root background
//!
//! [`Applier`] wraps the pipeline for a preferences front end that drives a preview and the
//! desktop, loads wallpaper files and mirrors the legacy key file.
#![deny(unsafe_code)]

mod foundation;

pub(crate) mod applier;
pub(crate) mod config;
pub(crate) mod pipeline;
pub(crate) mod prefs;
pub(crate) mod render;
pub(crate) mod sched;
pub(crate) mod surface;

pub use crate::foundation::core::{Rect, Rgb, Size};
pub use crate::foundation::error::{BackdropError, BackdropResult};

pub use crate::applier::{Applier, ApplyOutcome, DEFAULT_PREVIEW_SIZE, Targets};
pub use crate::config::{AppConfig, ENV_LEGACY_CONFIG, ENV_LOG, ENV_LOWER_PRIORITY, ENV_SCREEN};
pub use crate::pipeline::apply::{ApplyReport, RenderPipeline};
pub use crate::pipeline::renderer::{
    Renderer, RootMode, STRIP_THICKNESS, show_gradient, use_small_surface,
};
pub use crate::prefs::legacy::{
    KeyFileStore, LEGACY_SECTION, LegacyConfigStore, LegacyValue, MemoryStore, legacy_alignment,
    mirror_legacy_prefs,
};
pub use crate::prefs::model::{Orientation, Placement, Preferences};
pub use crate::render::composite::{
    PremulRgba8, copy_or_scale, over, scale_blend, scale_over_color, scale_to, tile_blend, tile_opaque,
};
pub use crate::render::geometry::{PlacementGeometry, resolve_geometry, scale_factor};
pub use crate::render::gradient::fill_gradient;
pub use crate::render::target::{Blit, DrawTarget};
pub use crate::render::wallpaper::{WallpaperImage, same_image};
pub use crate::sched::{BACKGROUND_NICENESS, lower_process_priority};
pub use crate::surface::commit::{Commit, commit_root_surface};
pub use crate::surface::display::{
    DisplayContext, DisplayServer, ESETROOT_PMAP_ID, RootBackground, SurfaceId, XROOTPMAP_ID,
};
pub use crate::surface::manager::{SharedSurface, Surface, SurfaceTarget};
pub use crate::surface::memory::MemoryDisplay;
#[cfg(feature = "x11")]
pub use crate::surface::x11::X11Display;
