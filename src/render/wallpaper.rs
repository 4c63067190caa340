use std::{fmt, path::Path, sync::Arc};

use anyhow::Context;
use image::{RgbImage, RgbaImage};

use crate::foundation::{
    core::Size,
    error::{BackdropError, BackdropResult},
};

/// Decoded wallpaper picture, premultiplied RGBA8.
///
/// Cloning shares the pixels; two handles are "the same image" only when they share them
/// ([`WallpaperImage::ptr_eq`]), which is what the pipeline uses to skip re-compositing.
#[derive(Clone)]
pub struct WallpaperImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
    opaque: bool,
}

impl WallpaperImage {
    pub fn from_rgba8(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let mut rgba8_premul = image.into_raw();
        let opaque = rgba8_premul.chunks_exact(4).all(|px| px[3] == 255);
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
            opaque,
        }
    }

    pub fn from_rgb8(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let mut rgba8_premul = Vec::with_capacity(width as usize * height as usize * 4);
        for px in image.pixels() {
            rgba8_premul.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
            opaque: true,
        }
    }

    pub fn decode(bytes: &[u8]) -> BackdropResult<Self> {
        let dyn_img = image::load_from_memory(bytes).context("decode wallpaper from memory")?;
        let image = Self::from_rgba8(dyn_img.to_rgba8());
        if image.size().is_empty() {
            return Err(BackdropError::validation("wallpaper has no pixels"));
        }
        Ok(image)
    }

    pub fn load(path: &Path) -> BackdropResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read wallpaper {}", path.display()))?;
        Self::decode(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// True when every pixel has full alpha.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    pub fn premultiplied(&self) -> &[u8] {
        &self.rgba8_premul
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.rgba8_premul, &b.rgba8_premul)
    }

    /// Premultiplied pixel; callers keep `x < width` and `y < height`.
    pub(crate) fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        match self.rgba8_premul.get(idx..idx + 4) {
            Some(px) => [px[0], px[1], px[2], px[3]],
            None => [0; 4],
        }
    }
}

impl fmt::Debug for WallpaperImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WallpaperImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("opaque", &self.opaque)
            .finish_non_exhaustive()
    }
}

/// Identity comparison of optional handles.
pub fn same_image(a: Option<&WallpaperImage>, b: Option<&WallpaperImage>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => WallpaperImage::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/wallpaper.rs"]
mod tests;
