use image::RgbImage;

use crate::{
    foundation::{
        core::{Rgb, Size},
        error::{BackdropError, BackdropResult},
    },
    pipeline::renderer::{
        Renderer, RootMode, gradient_size, show_gradient, use_small_surface,
    },
    prefs::model::{Placement, Preferences},
    render::{
        composite::{scale_blend, scale_over_color, scale_to, tile_blend, tile_opaque},
        geometry::{PlacementGeometry, resolve_geometry},
        gradient::fill_gradient,
        target::{Blit, DrawTarget},
        wallpaper::{WallpaperImage, same_image},
    },
    sched,
    surface::{
        commit::{Commit, commit_root_surface},
        display::{DisplayContext, RootBackground, SurfaceId},
        manager::Surface,
    },
};

/// What a single [`RenderPipeline::apply`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// The gradient buffer was recomputed (or dropped).
    pub background_rendered: bool,
    /// A different wallpaper image replaced the stored one.
    pub wallpaper_changed: bool,
    /// A new persistent surface was allocated.
    pub surface_created: bool,
    /// The wallpaper composite was recomputed.
    pub wallpaper_composited: bool,
    /// The shared root was switched to this renderer's output.
    pub published: bool,
    /// The wallpaper was requested without an image and skipped for this apply.
    pub wallpaper_missing: bool,
    /// Tile cells painted onto the surface by an opaque tiled wallpaper.
    pub tile_cells: usize,
}

impl ApplyReport {
    /// True when any buffer, surface or the published root changed.
    pub fn changed_anything(&self) -> bool {
        self.background_rendered
            || self.wallpaper_changed
            || self.surface_created
            || self.wallpaper_composited
            || self.published
    }
}

/// Orchestrates gradient, placement, compositing and publishing for any number of renderers.
#[derive(Debug)]
pub struct RenderPipeline {
    ctx: DisplayContext,
    lower_priority: bool,
    priority_lowered: bool,
}

impl RenderPipeline {
    pub fn new(ctx: DisplayContext) -> Self {
        Self {
            ctx,
            lower_priority: true,
            priority_lowered: false,
        }
    }

    /// Whether rendering the desktop first drops the process priority (on by default).
    pub fn with_lower_priority(mut self, lower: bool) -> Self {
        self.lower_priority = lower;
        self
    }

    pub fn context(&self) -> &DisplayContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut DisplayContext {
        &mut self.ctx
    }

    pub fn primary_renderer(&self) -> Renderer {
        Renderer::primary(self.ctx.screen())
    }

    pub fn preview_renderer(&self, size: Size) -> Renderer {
        Renderer::preview(size, self.ctx.screen())
    }

    /// Bring `renderer` from `old` to `new`, recomputing only what the change requires.
    ///
    /// `old` is the snapshot the renderer was last brought to (see [`Renderer::current_prefs`]);
    /// `None` forces a full render. A wallpaper requested without an image is skipped for this
    /// call only and flagged in the report.
    #[tracing::instrument(skip_all, fields(primary = renderer.primary))]
    pub fn apply(
        &mut self,
        renderer: &mut Renderer,
        old: Option<&Preferences>,
        new: &Preferences,
        wallpaper: Option<&WallpaperImage>,
    ) -> BackdropResult<ApplyReport> {
        new.validate()?;
        let mut report = ApplyReport::default();

        let mut prefs = new.clone();
        if prefs.wallpaper_enabled && wallpaper.is_none() {
            tracing::warn!("wallpaper enabled without an image; rendering without it");
            prefs.wallpaper_enabled = false;
            report.wallpaper_missing = true;
        }
        let old = old.map(|o| effective(o, renderer.wallpaper.is_some()));

        if renderer.primary {
            self.yield_priority();
        }

        let target = renderer.target.size();
        let image_changed = !same_image(renderer.wallpaper.as_ref(), wallpaper);
        let show_new = show_gradient(&prefs, wallpaper.map(WallpaperImage::size), target);

        // 1. background
        let prefs_changed = match &old {
            None => true,
            Some(old) => {
                let show_old =
                    show_gradient(old, renderer.wallpaper.as_ref().map(WallpaperImage::size), target);
                show_old != show_new
                    || old.gradient_enabled != prefs.gradient_enabled
                    || old.wallpaper_enabled != prefs.wallpaper_enabled
                    || old.orientation != prefs.orientation
                    || old.color1 != prefs.color1
                    || old.color2 != prefs.color2
                    || old.adjust_opacity != prefs.adjust_opacity
                    || old.opacity != prefs.opacity
                    || ((image_changed || old.placement != prefs.placement) && show_new)
            }
        };
        let rerender_background = prefs_changed || (show_new && renderer.gradient.is_none());

        if rerender_background {
            renderer.gradient = if show_new {
                let size = gradient_size(&prefs, renderer.primary, target);
                Some(fill_gradient(
                    size.width,
                    size.height,
                    prefs.color1,
                    prefs.color2,
                    prefs.orientation,
                )?)
            } else {
                None
            };
            report.background_rendered = true;
        }

        // 2. wallpaper image
        if image_changed {
            renderer.wallpaper = wallpaper.cloned();
            report.wallpaper_changed = true;
        }

        // 3. persistent surface
        if renderer.primary {
            report.surface_created = self.ensure_surface(renderer, old.as_ref(), &prefs)?;
        }

        // 4. wallpaper composite
        let placement_changed = old.as_ref().is_some_and(|o| o.placement != prefs.placement);
        let composite_missing = prefs.wallpaper_enabled && renderer.geometry.is_none();
        if rerender_background || image_changed || placement_changed || composite_missing {
            renderer.geometry = None;
            renderer.composited = None;
            if prefs.wallpaper_enabled
                && let Some(image) = renderer.wallpaper.clone()
            {
                let (geometry, composited) = composite_wallpaper(
                    &prefs,
                    &image,
                    renderer.gradient.as_ref(),
                    target,
                    renderer.viewport,
                )?;
                renderer.geometry = Some(geometry);
                renderer.composited = composited;
            }
            report.wallpaper_composited = prefs.wallpaper_enabled;
        }

        // 5. publish
        let drawn = self.draw_to_surface(renderer, &prefs, &mut report);
        let committed = match drawn {
            Ok(mode) if renderer.primary => self.commit_root(renderer, mode, &mut report),
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };

        // 6. remember
        renderer.current = Some(prefs);
        committed?;

        tracing::debug!(?report, "apply finished");
        Ok(report)
    }

    /// Paint the preview as disabled and forget what it showed.
    pub fn draw_disabled(&mut self, renderer: &mut Renderer) -> BackdropResult<()> {
        let target = renderer.target;
        let Some(surface) = renderer.surface.as_mut() else {
            return Ok(());
        };
        surface
            .target(self.ctx.display())
            .fill_rect(target, Rgb::BLACK)?;
        renderer.current = None;
        Ok(())
    }

    /// Re-read the published surface id without replacing anything.
    pub fn query_root(&mut self) -> BackdropResult<Option<SurfaceId>> {
        commit_root_surface(self.ctx.display(), Commit::Query)
    }

    fn yield_priority(&mut self) {
        if !self.lower_priority || self.priority_lowered {
            return;
        }
        match sched::lower_process_priority() {
            Ok(()) => self.priority_lowered = true,
            Err(e) => tracing::warn!(error = %e, "could not lower process priority"),
        }
    }

    fn ensure_surface(
        &mut self,
        renderer: &mut Renderer,
        old: Option<&Preferences>,
        prefs: &Preferences,
    ) -> BackdropResult<bool> {
        let target = renderer.target.size();
        let small = use_small_surface(prefs);
        let size = if small {
            gradient_size(prefs, true, target)
        } else {
            target
        };

        let recreate = match (&renderer.surface, old) {
            (None, _) => true,
            (Some(surface), old) => {
                let flipped = old.is_some_and(|o| {
                    use_small_surface(o) != small || (small && o.orientation != prefs.orientation)
                });
                flipped || surface.size() != size
            }
        };
        if !recreate {
            return Ok(false);
        }

        // A published surface is released by the next publish; anything else would leak.
        if let Some(stale) = renderer.surface.as_ref().and_then(Surface::id)
            && renderer.root != Some(RootMode::Surface(stale))
        {
            tracing::debug!(stale, "releasing unpublished surface");
            self.ctx.display().kill_surface_owner(stale)?;
        }

        let depth = self.ctx.depth();
        renderer.surface = Some(Surface::create_shared(self.ctx.display(), size, depth)?);
        renderer.root = None;
        Ok(true)
    }

    fn draw_to_surface(
        &mut self,
        renderer: &mut Renderer,
        prefs: &Preferences,
        report: &mut ApplyReport,
    ) -> BackdropResult<RootMode> {
        let origin = renderer.target;
        let surface = renderer
            .surface
            .as_mut()
            .ok_or_else(|| BackdropError::render("renderer has no surface to draw on"))?;
        let surface_id = surface.id().unwrap_or_default();
        let mut dst = surface.target(self.ctx.display());

        if let Some(gradient) = renderer.gradient.as_ref() {
            let buffer = renderer.composited.as_ref().unwrap_or(gradient);
            dst.put_image(buffer, Blit::whole(image_size(buffer), origin.x, origin.y))?;
            return Ok(RootMode::Surface(surface_id));
        }

        if prefs.wallpaper_enabled
            && let (Some(picture), Some(geom)) = (renderer.composited.as_ref(), renderer.geometry)
        {
            if prefs.placement == Placement::Tiled {
                report.tile_cells = tile_opaque(picture, &mut dst, origin)?;
            } else {
                if !geom.covers(origin.size()) {
                    dst.fill_rect(origin, prefs.color1)?;
                }
                dst.put_image(
                    picture,
                    Blit {
                        src_x: geom.src_x,
                        src_y: geom.src_y,
                        dst_x: origin.x + geom.x.max(0),
                        dst_y: origin.y + geom.y.max(0),
                        width: origin.width.min(geom.width),
                        height: origin.height.min(geom.height),
                    },
                )?;
            }
            return Ok(RootMode::Surface(surface_id));
        }

        dst.fill_rect(origin, prefs.color1)?;
        Ok(RootMode::Solid(prefs.color1))
    }

    fn commit_root(
        &mut self,
        renderer: &mut Renderer,
        mode: RootMode,
        report: &mut ApplyReport,
    ) -> BackdropResult<()> {
        if renderer.root == Some(mode) {
            // Same surface, new pixels: have the server repaint the root from it.
            return self.ctx.display().clear_root();
        }

        let display = self.ctx.display();
        match mode {
            RootMode::Surface(id) => {
                commit_root_surface(display, Commit::Publish(id))?;
            }
            RootMode::Solid(color) => {
                let retain = renderer.surface.as_ref().and_then(Surface::id);
                commit_root_surface(display, Commit::Clear { retain })?;
                display.set_root_background(RootBackground::Color(color))?;
                display.clear_root()?;
            }
        }
        renderer.root = Some(mode);
        report.published = true;
        Ok(())
    }
}

/// `prefs` as rendered when the wallpaper image may be absent.
fn effective(prefs: &Preferences, has_image: bool) -> Preferences {
    let mut prefs = prefs.clone();
    prefs.wallpaper_enabled &= has_image;
    prefs
}

fn image_size(image: &RgbImage) -> Size {
    Size::new(image.width(), image.height())
}

/// Resolve the placement and build the buffer the surface blit reads.
///
/// Over a visible gradient the result is target sized; otherwise it is the rendered picture
/// (one tile for tiled placement).
fn composite_wallpaper(
    prefs: &Preferences,
    image: &WallpaperImage,
    gradient: Option<&RgbImage>,
    target: Size,
    viewport: Size,
) -> BackdropResult<(PlacementGeometry, Option<RgbImage>)> {
    let geom = resolve_geometry(prefs.placement, image.size(), target, viewport)?;
    if geom.size().is_empty() {
        tracing::debug!(?geom, "wallpaper scaled to nothing");
        return Ok((geom, None));
    }
    let alpha = if prefs.adjust_opacity {
        prefs.alpha()
    } else {
        u8::MAX
    };

    let composited = match gradient {
        Some(gradient) => {
            let mut buffer = gradient.clone();
            if prefs.placement == Placement::Tiled {
                let cells =
                    tile_blend(image, &mut buffer, &geom, target.width, target.height, alpha)?;
                tracing::debug!(cells, "tiled wallpaper over gradient");
            } else {
                scale_blend(image, &mut buffer, &geom, alpha)?;
            }
            buffer
        }
        None if prefs.adjust_opacity => {
            scale_over_color(image, geom.width, geom.height, alpha, prefs.color1)?
        }
        None => scale_to(image, geom.width, geom.height)?,
    };
    Ok((geom, Some(composited)))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/apply.rs"]
mod tests;
