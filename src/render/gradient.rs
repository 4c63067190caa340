use image::RgbImage;

use crate::{
    foundation::{
        core::Rgb,
        error::{BackdropError, BackdropResult},
    },
    prefs::model::Orientation,
};

/// Fill a `width x height` RGB buffer with a two-color linear gradient.
///
/// `c(i) = c1 + i * (c2 - c1) / max(n - 1, 1)` per channel with truncating division, where `i`
/// runs along x for [`Orientation::Horizontal`] and along y for [`Orientation::Vertical`].
/// `Solid` (or equal colors) yields a flat `c1` buffer.
pub fn fill_gradient(
    width: u32,
    height: u32,
    c1: Rgb,
    c2: Rgb,
    orientation: Orientation,
) -> BackdropResult<RgbImage> {
    if width == 0 || height == 0 {
        return Err(BackdropError::validation(format!(
            "gradient size must be non-zero, got {width}x{height}"
        )));
    }
    let row_len = (width as usize)
        .checked_mul(3)
        .ok_or_else(|| BackdropError::render("gradient row size overflow"))?;
    let total = row_len
        .checked_mul(height as usize)
        .ok_or_else(|| BackdropError::render("gradient buffer size overflow"))?;

    let mut data = Vec::with_capacity(total);
    let flat = orientation == Orientation::Solid || c1 == c2;

    if flat || orientation == Orientation::Horizontal {
        // Every row is identical; build it once.
        let row: Vec<u8> = if flat {
            c1.to_array().repeat(width as usize)
        } else {
            (0..width)
                .flat_map(|i| lerp_rgb(c1, c2, i, width - 1))
                .collect()
        };
        for _ in 0..height {
            data.extend_from_slice(&row);
        }
    } else {
        for j in 0..height {
            let px = lerp_rgb(c1, c2, j, height - 1);
            for _ in 0..width {
                data.extend_from_slice(&px);
            }
        }
    }

    RgbImage::from_raw(width, height, data)
        .ok_or_else(|| BackdropError::render("gradient buffer does not match its dimensions"))
}

fn lerp_rgb(c1: Rgb, c2: Rgb, i: u32, span: u32) -> [u8; 3] {
    [
        lerp_channel(c1.r, c2.r, i, span),
        lerp_channel(c1.g, c2.g, i, span),
        lerp_channel(c1.b, c2.b, i, span),
    ]
}

fn lerp_channel(a: u8, b: u8, i: u32, span: u32) -> u8 {
    let delta = i64::from(b) - i64::from(a);
    let v = i64::from(a) + (i64::from(i) * delta) / i64::from(span.max(1));
    v.clamp(0, 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/gradient.rs"]
mod tests;
