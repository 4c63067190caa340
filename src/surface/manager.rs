use image::RgbImage;

use crate::{
    foundation::{
        core::{Rect, Rgb, Size},
        error::BackdropResult,
    },
    render::target::{Blit, DrawTarget},
    surface::display::{DisplayServer, SurfaceId},
};

/// Surface owned by the display server, addressed by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SharedSurface {
    pub id: SurfaceId,
    pub size: Size,
}

/// Where a renderer's pixels end up.
#[derive(Clone, Debug)]
pub enum Surface {
    /// Local canvas of a preview.
    Canvas(RgbImage),
    /// Persistent server-side surface of the desktop.
    Shared(SharedSurface),
}

impl Surface {
    pub fn canvas(size: Size) -> Self {
        Self::Canvas(RgbImage::new(size.width, size.height))
    }

    /// Allocate a persistent surface that survives this process.
    #[tracing::instrument(skip(display))]
    pub fn create_shared(
        display: &mut dyn DisplayServer,
        size: Size,
        depth: u8,
    ) -> BackdropResult<Self> {
        let id = display.create_persistent_surface(size, depth)?;
        tracing::debug!(id, "created persistent surface");
        Ok(Self::Shared(SharedSurface { id, size }))
    }

    pub fn size(&self) -> Size {
        match self {
            Self::Canvas(img) => Size::new(img.width(), img.height()),
            Self::Shared(s) => s.size,
        }
    }

    pub fn id(&self) -> Option<SurfaceId> {
        match self {
            Self::Canvas(_) => None,
            Self::Shared(s) => Some(s.id),
        }
    }

    pub fn pixels(&self) -> Option<&RgbImage> {
        match self {
            Self::Canvas(img) => Some(img),
            Self::Shared(_) => None,
        }
    }

    /// Drawing view; shared surfaces draw through `display`.
    pub fn target<'a>(&'a mut self, display: &'a mut dyn DisplayServer) -> SurfaceTarget<'a> {
        match self {
            Self::Canvas(img) => SurfaceTarget::Canvas(img),
            Self::Shared(s) => SurfaceTarget::Shared {
                display,
                surface: *s,
            },
        }
    }
}

pub enum SurfaceTarget<'a> {
    Canvas(&'a mut RgbImage),
    Shared {
        display: &'a mut dyn DisplayServer,
        surface: SharedSurface,
    },
}

impl DrawTarget for SurfaceTarget<'_> {
    fn target_size(&self) -> Size {
        match self {
            Self::Canvas(img) => img.target_size(),
            Self::Shared { surface, .. } => surface.size,
        }
    }

    fn put_image(&mut self, image: &RgbImage, blit: Blit) -> BackdropResult<()> {
        match self {
            Self::Canvas(img) => img.put_image(image, blit),
            Self::Shared { display, surface } => {
                let src = Size::new(image.width(), image.height());
                match blit.clip(src, surface.size) {
                    Some(clipped) => display.put_rgb(surface.id, image, clipped),
                    None => Ok(()),
                }
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> BackdropResult<()> {
        match self {
            Self::Canvas(img) => img.fill_rect(rect, color),
            Self::Shared { display, surface } => display.fill_rect(surface.id, rect, color),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/manager.rs"]
mod tests;
