use std::{sync::mpsc, thread, time::Duration};

use super::*;

#[test]
fn surfaces_outlive_their_creating_connection() {
    let server = MemoryDisplay::new(Size::new(8, 8));
    let id = {
        let mut conn = server.connect();
        conn.create_persistent_surface(Size::new(4, 2), 24).unwrap()
    };
    assert!(server.is_alive(id));
    assert_eq!(server.surface_pixels(id).unwrap().dimensions(), (4, 2));
}

#[test]
fn create_rejects_wrong_depth_and_empty_size() {
    let mut server = MemoryDisplay::new(Size::new(8, 8));
    assert!(server.create_persistent_surface(Size::new(4, 4), 32).is_err());
    assert!(server.create_persistent_surface(Size::new(0, 4), 24).is_err());
}

#[test]
fn kill_destroys_only_the_owner_resources() {
    let mut server = MemoryDisplay::new(Size::new(8, 8));
    let a = server.create_persistent_surface(Size::new(1, 1), 24).unwrap();
    let b = server.create_persistent_surface(Size::new(1, 1), 24).unwrap();
    server.kill_surface_owner(a).unwrap();
    server.kill_surface_owner(a).unwrap();
    assert!(!server.is_alive(a));
    assert!(server.is_alive(b));
    assert_eq!(server.destroyed_count(a), 1);
    assert_eq!(server.kill_requests(), 2);
}

#[test]
fn drawing_on_a_destroyed_surface_fails() {
    let mut server = MemoryDisplay::new(Size::new(8, 8));
    let id = server.create_persistent_surface(Size::new(2, 2), 24).unwrap();
    server.kill_surface_owner(id).unwrap();
    let err = server
        .fill_rect(id, Rect::new(0, 0, 1, 1), Rgb::WHITE)
        .unwrap_err();
    assert!(err.is_recoverable());
}

#[test]
fn root_pixel_tiles_the_background_surface() {
    let mut server = MemoryDisplay::new(Size::new(8, 8));
    let id = server.create_persistent_surface(Size::new(2, 1), 24).unwrap();
    server
        .fill_rect(id, Rect::new(1, 0, 1, 1), Rgb::new(9, 9, 9))
        .unwrap();
    server
        .set_root_background(RootBackground::Surface(id))
        .unwrap();
    assert_eq!(server.root_pixel(0, 5), Some(Rgb::BLACK));
    assert_eq!(server.root_pixel(3, 5), Some(Rgb::new(9, 9, 9)));

    server
        .set_root_background(RootBackground::Color(Rgb::WHITE))
        .unwrap();
    assert_eq!(server.root_pixel(7, 7), Some(Rgb::WHITE));
}

#[test]
fn grab_blocks_other_connections_until_released() {
    let server = MemoryDisplay::new(Size::new(8, 8));
    let mut holder = server.connect();
    holder.grab().unwrap();

    let mut other = server.connect();
    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        other.set_root_property("P", 7).unwrap();
        tx.send(()).unwrap();
    });

    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    assert_eq!(server.property("P"), None);

    holder.ungrab().unwrap();
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    worker.join().unwrap();
    assert_eq!(server.property("P"), Some(7));
}

#[test]
fn dropping_a_connection_releases_its_grab() {
    let server = MemoryDisplay::new(Size::new(8, 8));
    {
        let mut conn = server.connect();
        conn.grab().unwrap();
        assert!(server.is_grabbed());
    }
    assert!(!server.is_grabbed());
}

#[test]
fn property_write_failures_can_be_injected() {
    let mut server = MemoryDisplay::new(Size::new(8, 8));
    server.set_fail_property_writes(true);
    assert!(server.set_root_property("P", 1).is_err());
    server.set_fail_property_writes(false);
    server.set_root_property("P", 1).unwrap();
    assert_eq!(server.root_property("P").unwrap(), Some(1));
}
