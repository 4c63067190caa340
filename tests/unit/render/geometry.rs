use super::*;

fn geom(x: i32, y: i32, width: u32, height: u32, src_x: u32, src_y: u32) -> PlacementGeometry {
    PlacementGeometry {
        x,
        y,
        width,
        height,
        src_x,
        src_y,
    }
}

#[test]
fn stretched_ignores_source_and_viewport() {
    for (src, view) in [
        (Size::new(1, 1), Size::new(1, 1)),
        (Size::new(4000, 30), Size::new(0, 0)),
        (Size::new(0, 0), Size::new(1280, 1024)),
    ] {
        let g = resolve_geometry(Placement::Stretched, src, Size::new(320, 200), view).unwrap();
        assert_eq!(g, geom(0, 0, 320, 200, 0, 0));
    }
}

#[test]
fn tiled_keeps_natural_size_on_real_screen() {
    let screen = Size::new(320, 200);
    let g = resolve_geometry(Placement::Tiled, Size::new(100, 100), screen, screen).unwrap();
    assert_eq!(g, geom(0, 0, 100, 100, 0, 0));
}

#[test]
fn tiled_scales_down_for_preview() {
    let g = resolve_geometry(
        Placement::Tiled,
        Size::new(100, 64),
        Size::new(157, 111),
        Size::new(1280, 1024),
    )
    .unwrap();
    // 100 * 157/1280 = 12.27, 64 * 111/1024 = 6.94
    assert_eq!(g, geom(0, 0, 12, 6, 0, 0));
}

#[test]
fn centered_small_picture_is_offset_to_middle() {
    let screen = Size::new(320, 200);
    let g = resolve_geometry(Placement::Centered, Size::new(100, 50), screen, screen).unwrap();
    assert_eq!(g, geom(110, 75, 100, 50, 0, 0));
}

#[test]
fn centered_large_picture_is_cropped_symmetrically() {
    let screen = Size::new(1280, 800);
    let g = resolve_geometry(Placement::Centered, Size::new(2000, 1000), screen, screen).unwrap();
    assert_eq!(g, geom(0, 0, 2000, 1000, 360, 100));
    assert!(g.src_x + screen.width <= 2000);
    assert!(g.src_y + screen.height <= 1000);
}

#[test]
fn centered_crop_stays_inside_rendered_picture_when_scaled() {
    let source = Size::new(2000, 1500);
    let view = Size::new(1280, 1024);
    let dest = Size::new(157, 111);
    let g = resolve_geometry(Placement::Centered, source, dest, view).unwrap();
    assert!(g.src_x > 0);
    assert!(g.src_x + dest.width <= g.width);
    assert!(g.src_y + dest.height <= g.height);
}

#[test]
fn scaled_aspect_fits_wide_picture_by_width() {
    let screen = Size::new(100, 100);
    let g = resolve_geometry(Placement::ScaledAspect, Size::new(200, 100), screen, screen).unwrap();
    assert_eq!(g, geom(0, 25, 100, 50, 0, 0));
}

#[test]
fn scaled_aspect_fits_tall_picture_by_height() {
    let screen = Size::new(100, 100);
    let g = resolve_geometry(Placement::ScaledAspect, Size::new(100, 200), screen, screen).unwrap();
    assert_eq!(g, geom(25, 0, 50, 100, 0, 0));
}

#[test]
fn scaled_aspect_maps_viewport_into_preview() {
    let g = resolve_geometry(
        Placement::ScaledAspect,
        Size::new(1024, 512),
        Size::new(128, 128),
        Size::new(1024, 1024),
    )
    .unwrap();
    // asp = 1.0 (width); height = 512 / 1.0 / 1024 * 128 = 64
    assert_eq!(g, geom(0, 32, 128, 64, 0, 0));
}

#[test]
fn zero_viewport_is_a_validation_error() {
    let dest = Size::new(10, 10);
    assert!(
        resolve_geometry(Placement::Tiled, Size::new(4, 4), dest, Size::new(0, 10)).is_err()
    );
    assert!(
        resolve_geometry(Placement::Centered, Size::new(4, 4), dest, Size::new(10, 0)).is_err()
    );
    assert!(
        resolve_geometry(Placement::ScaledAspect, Size::new(4, 4), dest, Size::new(0, 0)).is_err()
    );
    assert!(
        resolve_geometry(Placement::ScaledAspect, Size::new(0, 4), dest, dest).is_err()
    );
}

#[test]
fn covers_detects_full_coverage() {
    let dest = Size::new(100, 50);
    assert!(geom(0, 0, 100, 50, 0, 0).covers(dest));
    assert!(geom(0, 0, 200, 80, 10, 10).covers(dest));
    assert!(!geom(10, 0, 90, 50, 0, 0).covers(dest));
    assert!(!geom(0, 0, 100, 49, 0, 0).covers(dest));
}
