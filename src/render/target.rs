use image::RgbImage;

use crate::foundation::{
    core::{Rect, Rgb, Size},
    error::{BackdropError, BackdropResult},
};

/// Source rectangle of an image copied to a destination position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blit {
    pub src_x: u32,
    pub src_y: u32,
    pub dst_x: i32,
    pub dst_y: i32,
    pub width: u32,
    pub height: u32,
}

impl Blit {
    /// Copy the whole of an image of `size` to `(dst_x, dst_y)`.
    pub fn whole(size: Size, dst_x: i32, dst_y: i32) -> Self {
        Self {
            src_x: 0,
            src_y: 0,
            dst_x,
            dst_y,
            width: size.width,
            height: size.height,
        }
    }

    /// Intersect with the source image and the destination bounds.
    ///
    /// The result has non-negative destination coordinates; `None` when nothing is visible.
    pub fn clip(self, src: Size, dst: Size) -> Option<Blit> {
        let (src_x, dst_x, width) = clip_axis(self.src_x, self.dst_x, self.width, src.width, dst.width)?;
        let (src_y, dst_y, height) =
            clip_axis(self.src_y, self.dst_y, self.height, src.height, dst.height)?;
        Some(Blit {
            src_x,
            src_y,
            dst_x: dst_x as i32,
            dst_y: dst_y as i32,
            width,
            height,
        })
    }
}

fn clip_axis(s: u32, d: i32, len: u32, src_len: u32, dst_len: u32) -> Option<(u32, u32, u32)> {
    let mut s = i64::from(s);
    let mut d = i64::from(d);
    let mut len = i64::from(len);
    if d < 0 {
        s -= d;
        len += d;
        d = 0;
    }
    len = len.min(i64::from(src_len) - s).min(i64::from(dst_len) - d);
    (len > 0).then_some((s as u32, d as u32, len as u32))
}

/// Something RGB pixels can be blitted onto: a local preview canvas or a shared surface.
pub trait DrawTarget {
    fn target_size(&self) -> Size;

    /// Copy `blit` from `image`; implementations clip against both sides.
    fn put_image(&mut self, image: &RgbImage, blit: Blit) -> BackdropResult<()>;

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> BackdropResult<()>;
}

impl DrawTarget for RgbImage {
    fn target_size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    fn put_image(&mut self, image: &RgbImage, blit: Blit) -> BackdropResult<()> {
        let src_size = Size::new(image.width(), image.height());
        let Some(b) = blit.clip(src_size, self.target_size()) else {
            return Ok(());
        };

        let src_stride = image.width() as usize * 3;
        let dst_stride = self.width() as usize * 3;
        let row_bytes = b.width as usize * 3;
        let src_raw = image.as_raw();
        let dst_raw: &mut [u8] = self;
        for row in 0..b.height as usize {
            let s = (b.src_y as usize + row) * src_stride + b.src_x as usize * 3;
            let d = (b.dst_y as usize + row) * dst_stride + b.dst_x as usize * 3;
            let src_row = src_raw
                .get(s..s + row_bytes)
                .ok_or_else(|| BackdropError::render("put_image source out of bounds"))?;
            dst_raw
                .get_mut(d..d + row_bytes)
                .ok_or_else(|| BackdropError::render("put_image destination out of bounds"))?
                .copy_from_slice(src_row);
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> BackdropResult<()> {
        let clamp_span = |start: i32, len: u32, max: u32| {
            let a = i64::from(start).clamp(0, i64::from(max));
            let b = (i64::from(start) + i64::from(len)).clamp(0, i64::from(max));
            (a as u32, b as u32)
        };
        let (x0, x1) = clamp_span(rect.x, rect.width, self.width());
        let (y0, y1) = clamp_span(rect.y, rect.height, self.height());
        let px = image::Rgb(color.to_array());
        for y in y0..y1 {
            for x in x0..x1 {
                self.put_pixel(x, y, px);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/target.rs"]
mod tests;
