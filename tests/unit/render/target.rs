use super::*;

fn numbered(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 7]))
}

#[test]
fn clip_trims_negative_destination_and_source_overrun() {
    let b = Blit {
        src_x: 0,
        src_y: 0,
        dst_x: -3,
        dst_y: 2,
        width: 10,
        height: 10,
    };
    let c = b.clip(Size::new(8, 8), Size::new(20, 5)).unwrap();
    assert_eq!(
        c,
        Blit {
            src_x: 3,
            src_y: 0,
            dst_x: 0,
            dst_y: 2,
            width: 5,
            height: 3,
        }
    );
}

#[test]
fn clip_returns_none_when_nothing_is_visible() {
    let b = Blit::whole(Size::new(4, 4), 30, 0);
    assert!(b.clip(Size::new(4, 4), Size::new(10, 10)).is_none());
    let b = Blit {
        src_x: 9,
        ..Blit::whole(Size::new(4, 4), 0, 0)
    };
    assert!(b.clip(Size::new(4, 4), Size::new(10, 10)).is_none());
}

#[test]
fn put_image_copies_cropped_region() {
    let src = numbered(6, 6);
    let mut dst = RgbImage::new(4, 4);
    dst.put_image(
        &src,
        Blit {
            src_x: 2,
            src_y: 3,
            dst_x: 1,
            dst_y: 1,
            width: 2,
            height: 2,
        },
    )
    .unwrap();
    assert_eq!(dst.get_pixel(1, 1).0, [2, 3, 7]);
    assert_eq!(dst.get_pixel(2, 2).0, [3, 4, 7]);
    assert_eq!(dst.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(dst.get_pixel(3, 3).0, [0, 0, 0]);
}

#[test]
fn fill_rect_clips_to_canvas() {
    let mut dst = RgbImage::new(3, 3);
    dst.fill_rect(Rect::new(-1, 1, 10, 1), Rgb::WHITE).unwrap();
    for x in 0..3 {
        assert_eq!(dst.get_pixel(x, 1).0, [255, 255, 255]);
        assert_eq!(dst.get_pixel(x, 0).0, [0, 0, 0]);
        assert_eq!(dst.get_pixel(x, 2).0, [0, 0, 0]);
    }
}
