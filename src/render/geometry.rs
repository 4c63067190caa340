use crate::{
    foundation::{
        core::Size,
        error::{BackdropError, BackdropResult},
    },
    prefs::model::Placement,
};

/// Where and how large the wallpaper is rendered inside its destination.
///
/// `x`/`y` and `width`/`height` are in destination pixels; `src_x`/`src_y` is the crop origin
/// inside the rendered (scaled) picture, non-zero only for centered pictures larger than the
/// viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlacementGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub src_x: u32,
    pub src_y: u32,
}

impl PlacementGeometry {
    /// A picture of `size` at the origin, uncropped.
    pub fn sized(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            ..Self::default()
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether the rendered picture fully covers a `dest` sized area at the origin.
    pub fn covers(&self, dest: Size) -> bool {
        self.x <= 0
            && self.y <= 0
            && i64::from(self.x) + i64::from(self.width) >= i64::from(dest.width)
            && i64::from(self.y) + i64::from(self.height) >= i64::from(dest.height)
    }
}

/// Resolve the placement of a `source` picture drawn into `dest`, where `viewport` is the size
/// of the real screen the destination represents (a preview is a scaled-down viewport).
///
/// Float factors, truncating every conversion back to integers.
pub fn resolve_geometry(
    placement: Placement,
    source: Size,
    dest: Size,
    viewport: Size,
) -> BackdropResult<PlacementGeometry> {
    match placement {
        Placement::Tiled => {
            let (width, _) = scaled_axis(source.width, dest.width, viewport.width, false)?;
            let (height, _) = scaled_axis(source.height, dest.height, viewport.height, false)?;
            Ok(PlacementGeometry {
                x: 0,
                y: 0,
                width,
                height,
                src_x: 0,
                src_y: 0,
            })
        }
        Placement::Centered => {
            let (width, src_x) = scaled_axis(source.width, dest.width, viewport.width, true)?;
            let (height, src_y) = scaled_axis(source.height, dest.height, viewport.height, true)?;
            Ok(PlacementGeometry {
                x: centered_offset(dest.width, width).max(0),
                y: centered_offset(dest.height, height).max(0),
                width,
                height,
                src_x,
                src_y,
            })
        }
        Placement::ScaledAspect => scaled_aspect(source, dest, viewport),
        Placement::Stretched => Ok(PlacementGeometry {
            x: 0,
            y: 0,
            width: dest.width,
            height: dest.height,
            src_x: 0,
            src_y: 0,
        }),
    }
}

/// Factor mapping viewport pixels to destination pixels along one axis.
pub fn scale_factor(dest: u32, viewport: u32) -> BackdropResult<f64> {
    if dest == viewport {
        return Ok(1.0);
    }
    if viewport == 0 {
        return Err(BackdropError::validation(
            "placement viewport must be non-zero",
        ));
    }
    Ok(f64::from(dest) / f64::from(viewport))
}

/// Rendered length and crop origin of one axis for tiled/centered pictures.
fn scaled_axis(source: u32, dest: u32, viewport: u32, crop: bool) -> BackdropResult<(u32, u32)> {
    let factor = scale_factor(dest, viewport)?;
    let rendered = (f64::from(source) * factor) as u32;
    let src = if crop && viewport < source {
        (f64::from(source - viewport) * factor / 2.0) as u32
    } else {
        0
    };
    Ok((rendered, src))
}

fn centered_offset(dest: u32, rendered: u32) -> i32 {
    let diff = i64::from(dest) - i64::from(rendered);
    (diff >> 1).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn scaled_aspect(source: Size, dest: Size, viewport: Size) -> BackdropResult<PlacementGeometry> {
    if viewport.is_empty() {
        return Err(BackdropError::validation(
            "scaled placement needs a non-empty viewport",
        ));
    }
    if source.is_empty() {
        return Err(BackdropError::validation(
            "scaled placement needs a non-empty picture",
        ));
    }

    let sw = f64::from(source.width);
    let sh = f64::from(source.height);
    let by_width = sw / f64::from(viewport.width);
    let by_height = sh / f64::from(viewport.height);

    if by_width < by_height {
        let width = (sw / by_height / f64::from(viewport.width) * f64::from(dest.width)) as u32;
        Ok(PlacementGeometry {
            x: centered_offset(dest.width, width),
            y: 0,
            width,
            height: dest.height,
            src_x: 0,
            src_y: 0,
        })
    } else {
        let height = (sh / by_width / f64::from(viewport.height) * f64::from(dest.height)) as u32;
        Ok(PlacementGeometry {
            x: 0,
            y: centered_offset(dest.height, height),
            width: dest.width,
            height,
            src_x: 0,
            src_y: 0,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
