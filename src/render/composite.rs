use image::RgbImage;

use crate::{
    foundation::{
        core::{Rect, Rgb, Size},
        error::{BackdropError, BackdropResult},
    },
    render::{
        geometry::PlacementGeometry,
        target::{Blit, DrawTarget},
        wallpaper::WallpaperImage,
    },
};

pub type PremulRgba8 = [u8; 4];

/// Source-over of a premultiplied pixel onto an opaque RGB pixel, weighted by `alpha`.
pub fn over(dst: [u8; 3], src: PremulRgba8, alpha: u8) -> [u8; 3] {
    if alpha == 0 || src[3] == 0 {
        return dst;
    }

    let op = u16::from(alpha);
    let sa = mul_div255(u16::from(src[3]), op);
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 3];
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Blend `src`, resampled to `geom.width x geom.height`, into `dst` at `(geom.x, geom.y)`.
///
/// The crop origin `(geom.src_x, geom.src_y)` selects which part of the resampled picture lands
/// at the placement offset.
pub fn scale_blend(
    src: &WallpaperImage,
    dst: &mut RgbImage,
    geom: &PlacementGeometry,
    alpha: u8,
) -> BackdropResult<()> {
    if geom.size().is_empty() {
        return Ok(());
    }
    let sampler = Sampler::new(src, geom.size())?;
    let bound = Size::new(dst.width(), dst.height());
    paint(&sampler, dst, placed_origin(geom), geom, bound, Paint::Blend(alpha));
    Ok(())
}

/// Repeat the resampled picture from `(geom.x, geom.y)` across `dest_w x dest_h`, blending each
/// cell. Returns the number of cells painted.
pub fn tile_blend(
    src: &WallpaperImage,
    dst: &mut RgbImage,
    geom: &PlacementGeometry,
    dest_w: u32,
    dest_h: u32,
    alpha: u8,
) -> BackdropResult<usize> {
    if geom.size().is_empty() {
        return Ok(0);
    }
    let tile = Sampler::new(src, geom.size())?.prerender();
    let bound = Size::new(dest_w.min(dst.width()), dest_h.min(dst.height()));

    let mut cells = 0;
    for cy in (i64::from(geom.y)..i64::from(bound.height)).step_by(geom.height as usize) {
        for cx in (i64::from(geom.x)..i64::from(bound.width)).step_by(geom.width as usize) {
            let cell = PlacementGeometry {
                x: cx as i32,
                y: cy as i32,
                width: geom.width,
                height: geom.height,
                src_x: 0,
                src_y: 0,
            };
            paint(&tile, dst, (cx, cy), &cell, bound, Paint::Blend(alpha));
            cells += 1;
        }
    }
    Ok(cells)
}

/// Paint `tile` repeatedly over `area` of `dst` without blending, clipping the last row and
/// column. Returns the number of cells painted.
pub fn tile_opaque(
    tile: &RgbImage,
    dst: &mut dyn DrawTarget,
    area: Rect,
) -> BackdropResult<usize> {
    let (tw, th) = tile.dimensions();
    if tw == 0 || th == 0 || area.size().is_empty() {
        return Ok(0);
    }
    let right = i64::from(area.x) + i64::from(area.width);
    let bottom = i64::from(area.y) + i64::from(area.height);

    let mut cells = 0;
    for cy in (i64::from(area.y)..bottom).step_by(th as usize) {
        for cx in (i64::from(area.x)..right).step_by(tw as usize) {
            dst.put_image(
                tile,
                Blit {
                    src_x: 0,
                    src_y: 0,
                    dst_x: cx as i32,
                    dst_y: cy as i32,
                    width: (right - cx).min(i64::from(tw)) as u32,
                    height: (bottom - cy).min(i64::from(th)) as u32,
                },
            )?;
            cells += 1;
        }
    }
    Ok(cells)
}

/// Replace `dst` pixels with the resampled picture at `geom`, no blending.
pub fn copy_or_scale(
    src: &WallpaperImage,
    dst: &mut RgbImage,
    geom: &PlacementGeometry,
) -> BackdropResult<()> {
    if geom.size().is_empty() {
        return Ok(());
    }
    let sampler = Sampler::new(src, geom.size())?;
    let bound = Size::new(dst.width(), dst.height());
    paint(&sampler, dst, placed_origin(geom), geom, bound, Paint::Copy);
    Ok(())
}

/// Resample `src` to `width x height`.
pub fn scale_to(src: &WallpaperImage, width: u32, height: u32) -> BackdropResult<RgbImage> {
    let size = Size::new(width, height);
    if size.is_empty() {
        return Err(BackdropError::validation(format!(
            "cannot scale wallpaper to {width}x{height}"
        )));
    }
    let mut out = RgbImage::new(width, height);
    copy_or_scale(src, &mut out, &PlacementGeometry::sized(size))?;
    Ok(out)
}

/// Resample `src` to `width x height` and blend it over a flat `color`.
pub fn scale_over_color(
    src: &WallpaperImage,
    width: u32,
    height: u32,
    alpha: u8,
    color: Rgb,
) -> BackdropResult<RgbImage> {
    let size = Size::new(width, height);
    if size.is_empty() {
        return Err(BackdropError::validation(format!(
            "cannot scale wallpaper to {width}x{height}"
        )));
    }
    let mut out = RgbImage::from_pixel(width, height, color.into());
    scale_blend(src, &mut out, &PlacementGeometry::sized(size), alpha)?;
    Ok(out)
}

#[derive(Clone, Copy, Debug)]
enum Paint {
    Copy,
    Blend(u8),
}

fn placed_origin(geom: &PlacementGeometry) -> (i64, i64) {
    (
        i64::from(geom.x) - i64::from(geom.src_x),
        i64::from(geom.y) - i64::from(geom.src_y),
    )
}

/// Paint the picture whose top-left sits at `origin`, starting at the placement offset and
/// clipped to `bound`.
fn paint(
    sampler: &Sampler<'_>,
    dst: &mut RgbImage,
    origin: (i64, i64),
    geom: &PlacementGeometry,
    bound: Size,
    mode: Paint,
) {
    let x0 = i64::from(geom.x).max(0);
    let y0 = i64::from(geom.y).max(0);
    let x1 = (origin.0 + i64::from(sampler.size.width)).min(i64::from(bound.width));
    let y1 = (origin.1 + i64::from(sampler.size.height)).min(i64::from(bound.height));

    for y in y0..y1 {
        let v = (y - origin.1) as u32;
        for x in x0..x1 {
            let u = (x - origin.0) as u32;
            let px = sampler.sample(u, v);
            let d = dst.get_pixel_mut(x as u32, y as u32);
            d.0 = match mode {
                Paint::Copy => [px[0], px[1], px[2]],
                Paint::Blend(alpha) => over(d.0, px, alpha),
            };
        }
    }
}

/// Bilinear view of a wallpaper at a rendered size; exact texel reads at 1:1.
struct Sampler<'a> {
    src: &'a WallpaperImage,
    size: Size,
    fx: f32,
    fy: f32,
    cache: Option<Vec<PremulRgba8>>,
}

impl<'a> Sampler<'a> {
    fn new(src: &'a WallpaperImage, size: Size) -> BackdropResult<Self> {
        if src.size().is_empty() {
            return Err(BackdropError::render("wallpaper has no pixels"));
        }
        Ok(Self {
            src,
            size,
            fx: src.width() as f32 / size.width as f32,
            fy: src.height() as f32 / size.height as f32,
            cache: None,
        })
    }

    /// Resample every pixel once, for pictures painted many times.
    fn prerender(mut self) -> Self {
        let mut cache = Vec::with_capacity(self.size.area() as usize);
        for v in 0..self.size.height {
            for u in 0..self.size.width {
                cache.push(self.sample(u, v));
            }
        }
        self.cache = Some(cache);
        self
    }

    fn sample(&self, u: u32, v: u32) -> PremulRgba8 {
        if let Some(cache) = &self.cache {
            let idx = v as usize * self.size.width as usize + u as usize;
            return cache.get(idx).copied().unwrap_or([0; 4]);
        }
        if self.size == self.src.size() {
            return self.src.texel(u, v);
        }

        let max_x = (self.src.width() - 1) as f32;
        let max_y = (self.src.height() - 1) as f32;
        let sx = ((u as f32 + 0.5) * self.fx - 0.5).clamp(0.0, max_x);
        let sy = ((v as f32 + 0.5) * self.fy - 0.5).clamp(0.0, max_y);
        let x0 = sx.floor() as u32;
        let y0 = sy.floor() as u32;
        let x1 = (x0 + 1).min(self.src.width() - 1);
        let y1 = (y0 + 1).min(self.src.height() - 1);
        let tx = sx - x0 as f32;
        let ty = sy - y0 as f32;

        let p00 = self.src.texel(x0, y0);
        let p10 = self.src.texel(x1, y0);
        let p01 = self.src.texel(x0, y1);
        let p11 = self.src.texel(x1, y1);

        let mut out = [0u8; 4];
        for i in 0..4 {
            let top = f32::from(p00[i]) * (1.0 - tx) + f32::from(p10[i]) * tx;
            let bottom = f32::from(p01[i]) * (1.0 - tx) + f32::from(p11[i]) * tx;
            out[i] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
