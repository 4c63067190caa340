//! Front door used by a preferences front end: one [`Applier`] drives the preview and the desktop.

use std::path::{Path, PathBuf};

use crate::{
    foundation::{core::Size, error::BackdropResult},
    pipeline::{
        apply::{ApplyReport, RenderPipeline},
        renderer::Renderer,
    },
    prefs::{
        legacy::{LegacyConfigStore, mirror_legacy_prefs},
        model::Preferences,
    },
    render::wallpaper::WallpaperImage,
    surface::display::{DisplayContext, SurfaceId},
};

/// Size of the monitor preview drawn by the capplet.
pub const DEFAULT_PREVIEW_SIZE: Size = Size::new(157, 111);

/// Which outputs an [`Applier::apply`] call updates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Targets {
    pub preview: bool,
    pub desktop: bool,
}

impl Targets {
    pub const PREVIEW: Self = Self {
        preview: true,
        desktop: false,
    };
    pub const DESKTOP: Self = Self {
        preview: false,
        desktop: true,
    };
    pub const BOTH: Self = Self {
        preview: true,
        desktop: true,
    };
}

/// Result of one [`Applier::apply`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Background disabled: only the preview was blanked.
    pub disabled: bool,
    /// The wallpaper file could not be loaded and was left out.
    pub wallpaper_load_failed: bool,
    /// A desktop shell owns the root; its published surface, if any.
    pub shell_surface: Option<SurfaceId>,
    pub preview: Option<ApplyReport>,
    pub desktop: Option<ApplyReport>,
    /// The legacy key file was written.
    pub legacy_mirrored: bool,
}

#[derive(Debug)]
struct CachedWallpaper {
    path: PathBuf,
    image: Option<WallpaperImage>,
}

/// Owns the render pipeline, one renderer per target and the decoded wallpaper.
pub struct Applier {
    pipeline: RenderPipeline,
    preview_size: Size,
    preview: Option<Renderer>,
    desktop: Option<Renderer>,
    desktop_prefs: Option<Preferences>,
    wallpaper: Option<CachedWallpaper>,
    legacy: Option<Box<dyn LegacyConfigStore>>,
}

impl Applier {
    pub fn new(pipeline: RenderPipeline) -> Self {
        Self {
            pipeline,
            preview_size: DEFAULT_PREVIEW_SIZE,
            preview: None,
            desktop: None,
            desktop_prefs: None,
            wallpaper: None,
            legacy: None,
        }
    }

    pub fn with_preview_size(mut self, size: Size) -> Self {
        self.preview_size = size;
        self.preview = None;
        self
    }

    /// Mirror every desktop apply into `store`.
    pub fn with_legacy_store(mut self, store: Box<dyn LegacyConfigStore>) -> Self {
        self.legacy = Some(store);
        self
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn context_mut(&mut self) -> &mut DisplayContext {
        self.pipeline.context_mut()
    }

    pub fn preview_renderer(&self) -> Option<&Renderer> {
        self.preview.as_ref()
    }

    pub fn desktop_renderer(&self) -> Option<&Renderer> {
        self.desktop.as_ref()
    }

    /// Preferences last applied to the desktop, including applies a desktop shell absorbed.
    pub fn desktop_prefs(&self) -> Option<&Preferences> {
        self.desktop_prefs.as_ref()
    }

    /// Path of the cached wallpaper and whether it decoded.
    pub fn cached_wallpaper(&self) -> Option<(&Path, bool)> {
        self.wallpaper
            .as_ref()
            .map(|c| (c.path.as_path(), c.image.is_some()))
    }

    /// Bring the requested targets in line with `prefs`.
    #[tracing::instrument(skip_all, fields(preview = targets.preview, desktop = targets.desktop))]
    pub fn apply(&mut self, prefs: &Preferences, targets: Targets) -> BackdropResult<ApplyOutcome> {
        prefs.validate()?;
        let mut outcome = ApplyOutcome::default();

        let shell = targets.desktop && self.pipeline.context().desktop_shell_running();
        if shell {
            outcome.shell_surface = self.pipeline.query_root()?;
            tracing::info!(surface = ?outcome.shell_surface, "desktop shell owns the root");
        }

        if !prefs.enabled {
            if targets.preview {
                let size = self.preview_size;
                let renderer = self
                    .preview
                    .get_or_insert_with(|| self.pipeline.preview_renderer(size));
                self.pipeline.draw_disabled(renderer)?;
            }
            outcome.disabled = true;
            return Ok(outcome);
        }

        let mut effective = prefs.clone();
        let image = self.refresh_wallpaper(prefs, &mut outcome);
        if image.is_none() {
            effective.wallpaper_enabled = false;
        }

        if targets.preview {
            let size = self.preview_size;
            let renderer = self
                .preview
                .get_or_insert_with(|| self.pipeline.preview_renderer(size));
            let old = renderer.current_prefs().cloned();
            outcome.preview = Some(self.pipeline.apply(
                renderer,
                old.as_ref(),
                &effective,
                image.as_ref(),
            )?);
        }

        if targets.desktop {
            if !shell {
                let renderer = self
                    .desktop
                    .get_or_insert_with(|| self.pipeline.primary_renderer());
                let old = renderer.current_prefs().cloned();
                outcome.desktop = Some(self.pipeline.apply(
                    renderer,
                    old.as_ref(),
                    &effective,
                    image.as_ref(),
                )?);
            }
            self.desktop_prefs = Some(effective);
            if let Some(store) = self.legacy.as_mut() {
                match mirror_legacy_prefs(store.as_mut(), prefs) {
                    Ok(()) => outcome.legacy_mirrored = true,
                    Err(e) => tracing::warn!(error = %e, "could not update legacy config"),
                }
            }
        }

        Ok(outcome)
    }

    /// Keep the decoded picture in step with `prefs.wallpaper_filename`.
    fn refresh_wallpaper(
        &mut self,
        prefs: &Preferences,
        outcome: &mut ApplyOutcome,
    ) -> Option<WallpaperImage> {
        let wanted = prefs.wallpaper_filename.as_deref();
        if self.wallpaper.as_ref().map(|c| c.path.as_path()) != wanted {
            self.wallpaper = None;
        }

        if self.wallpaper.is_none()
            && prefs.wallpaper_enabled
            && let Some(path) = wanted
        {
            let image = match WallpaperImage::load(path) {
                Ok(image) => {
                    tracing::debug!(path = %path.display(), size = ?image.size(), "wallpaper loaded");
                    Some(image)
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not load wallpaper");
                    outcome.wallpaper_load_failed = true;
                    None
                }
            };
            self.wallpaper = Some(CachedWallpaper {
                path: path.to_path_buf(),
                image,
            });
        }

        self.wallpaper.as_ref().and_then(|c| c.image.clone())
    }
}

impl std::fmt::Debug for Applier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Applier")
            .field("pipeline", &self.pipeline)
            .field("preview_size", &self.preview_size)
            .field("wallpaper", &self.wallpaper)
            .field("legacy", &self.legacy.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../tests/unit/applier.rs"]
mod tests;
