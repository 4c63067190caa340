use super::*;
use crate::surface::memory::MemoryDisplay;

#[test]
fn canvas_surface_draws_locally() {
    let mut display = MemoryDisplay::new(Size::new(8, 8));
    let mut surface = Surface::canvas(Size::new(4, 4));
    assert_eq!(surface.id(), None);

    let mut target = surface.target(&mut display);
    target
        .fill_rect(Rect::new(0, 0, 4, 4), Rgb::new(1, 2, 3))
        .unwrap();
    assert_eq!(target.target_size(), Size::new(4, 4));

    let pixels = surface.pixels().unwrap();
    assert!(pixels.pixels().all(|p| p.0 == [1, 2, 3]));
    assert!(display.live_surfaces().is_empty());
}

#[test]
fn shared_surface_draws_through_display() {
    let server = MemoryDisplay::new(Size::new(8, 8));
    let mut conn = server.connect();
    let mut surface = Surface::create_shared(&mut conn, Size::new(3, 2), 24).unwrap();
    let id = surface.id().unwrap();
    assert!(surface.pixels().is_none());

    let image = RgbImage::from_pixel(5, 5, image::Rgb([7, 7, 7]));
    surface
        .target(&mut conn)
        .put_image(&image, Blit::whole(Size::new(5, 5), -1, 0))
        .unwrap();

    let pixels = server.surface_pixels(id).unwrap();
    assert_eq!(pixels.dimensions(), (3, 2));
    assert!(pixels.pixels().all(|p| p.0 == [7, 7, 7]));
}
