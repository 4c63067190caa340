use super::*;
use crate::prefs::model::Placement;

fn wallpaper_prefs(placement: Placement, adjust_opacity: bool) -> Preferences {
    let mut p = Preferences::default();
    p.set_wallpaper(Some("/tmp/picture.png".into()));
    p.set_placement(placement);
    p.set_adjust_opacity(adjust_opacity);
    p
}

#[test]
fn gradient_hidden_by_opaque_covering_wallpaper() {
    let target = Size::new(100, 80);
    for placement in [Placement::Tiled, Placement::Stretched] {
        let p = wallpaper_prefs(placement, false);
        assert!(!show_gradient(&p, Some(Size::new(3, 3)), target));
    }
    let centered = wallpaper_prefs(Placement::Centered, false);
    assert!(show_gradient(&centered, Some(Size::new(3, 3)), target));
    assert!(!show_gradient(&centered, Some(target), target));
}

#[test]
fn translucent_wallpaper_keeps_gradient() {
    let p = wallpaper_prefs(Placement::Tiled, true);
    assert!(show_gradient(&p, Some(Size::new(3, 3)), Size::new(10, 10)));
}

#[test]
fn solid_never_shows_gradient() {
    let mut p = Preferences::default();
    p.set_orientation(Orientation::Solid);
    assert!(!show_gradient(&p, None, Size::new(10, 10)));
    assert!(!use_small_surface(&p));
}

#[test]
fn strip_is_thin_across_the_gradient_direction() {
    let target = Size::new(64, 48);
    let mut p = Preferences::default();
    p.set_orientation(Orientation::Vertical);
    assert_eq!(gradient_size(&p, true, target), Size::new(32, 48));
    p.set_orientation(Orientation::Horizontal);
    assert_eq!(gradient_size(&p, true, target), Size::new(64, 32));
    assert_eq!(gradient_size(&p, false, target), target);

    let w = wallpaper_prefs(Placement::Centered, true);
    assert_eq!(gradient_size(&w, true, target), target);
}

#[test]
fn strip_never_exceeds_the_target() {
    let mut p = Preferences::default();
    p.set_orientation(Orientation::Vertical);
    assert_eq!(gradient_size(&p, true, Size::new(20, 10)), Size::new(20, 10));
}

#[test]
fn preview_renderer_owns_a_canvas() {
    let r = Renderer::preview(Size::new(64, 48), Size::new(1280, 1024));
    assert!(!r.is_primary());
    assert_eq!(r.preview_pixels().unwrap().dimensions(), (64, 48));
    assert_eq!(r.viewport(), Size::new(1280, 1024));

    let primary = Renderer::primary(Size::new(1280, 1024));
    assert!(primary.surface().is_none());
    assert!(!primary.is_published());
}
