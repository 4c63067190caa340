use super::*;
use crate::{foundation::core::Size, surface::memory::MemoryDisplay};

fn server() -> MemoryDisplay {
    MemoryDisplay::new(Size::new(16, 16))
}

#[test]
fn publish_sets_both_properties_and_background() {
    let server = server();
    let mut conn = server.connect();
    let id = conn.create_persistent_surface(Size::new(4, 4), 24).unwrap();

    let published = commit_root_surface(&mut conn, Commit::Publish(id)).unwrap();
    assert_eq!(published, Some(id));
    assert_eq!(server.property(ESETROOT_PMAP_ID), Some(id));
    assert_eq!(server.property(XROOTPMAP_ID), Some(id));
    assert_eq!(server.background(), RootBackground::Surface(id));
    assert_eq!(server.root_clears(), 1);
    assert!(!server.is_grabbed());
}

#[test]
fn publish_kills_previous_surface_once() {
    let server = server();
    let mut conn = server.connect();
    let old = conn.create_persistent_surface(Size::new(4, 4), 24).unwrap();
    let new = conn.create_persistent_surface(Size::new(4, 4), 24).unwrap();

    commit_root_surface(&mut conn, Commit::Publish(old)).unwrap();
    commit_root_surface(&mut conn, Commit::Publish(new)).unwrap();

    assert!(!server.is_alive(old));
    assert_eq!(server.destroyed_count(old), 1);
    assert_eq!(server.kill_requests(), 1);
    assert!(server.is_alive(new));
}

#[test]
fn republishing_the_same_surface_kills_nothing() {
    let server = server();
    let mut conn = server.connect();
    let id = conn.create_persistent_surface(Size::new(4, 4), 24).unwrap();
    commit_root_surface(&mut conn, Commit::Publish(id)).unwrap();
    commit_root_surface(&mut conn, Commit::Publish(id)).unwrap();
    assert_eq!(server.kill_requests(), 0);
    assert!(server.is_alive(id));
}

#[test]
fn diverging_properties_release_both_surfaces() {
    let server = server();
    let mut conn = server.connect();
    let a = conn.create_persistent_surface(Size::new(1, 1), 24).unwrap();
    let b = conn.create_persistent_surface(Size::new(1, 1), 24).unwrap();
    let new = conn.create_persistent_surface(Size::new(1, 1), 24).unwrap();
    conn.set_root_property(ESETROOT_PMAP_ID, a).unwrap();
    conn.set_root_property(XROOTPMAP_ID, b).unwrap();

    commit_root_surface(&mut conn, Commit::Publish(new)).unwrap();
    assert!(!server.is_alive(a));
    assert!(!server.is_alive(b));
    assert_eq!(server.kill_requests(), 2);
}

#[test]
fn query_reads_without_replacing() {
    let server = server();
    let mut conn = server.connect();
    assert_eq!(commit_root_surface(&mut conn, Commit::Query).unwrap(), None);

    let id = conn.create_persistent_surface(Size::new(4, 4), 24).unwrap();
    commit_root_surface(&mut conn, Commit::Publish(id)).unwrap();
    let clears = server.root_clears();

    let mut other = server.connect();
    assert_eq!(commit_root_surface(&mut other, Commit::Query).unwrap(), Some(id));
    assert!(server.is_alive(id));
    assert_eq!(server.root_clears(), clears);
}

#[test]
fn clear_deletes_properties_and_background() {
    let server = server();
    let mut conn = server.connect();
    let id = conn.create_persistent_surface(Size::new(4, 4), 24).unwrap();
    commit_root_surface(&mut conn, Commit::Publish(id)).unwrap();

    let cleared = commit_root_surface(&mut conn, Commit::Clear { retain: None }).unwrap();
    assert_eq!(cleared, None);
    assert_eq!(server.property(ESETROOT_PMAP_ID), None);
    assert_eq!(server.property(XROOTPMAP_ID), None);
    assert_eq!(server.background(), RootBackground::None);
    assert!(!server.is_alive(id));
    assert_eq!(server.destroyed_count(id), 1);
    assert!(server.live_surfaces().is_empty());
}

#[test]
fn clear_spares_the_retained_surface() {
    let server = server();
    let mut conn = server.connect();
    let a = conn.create_persistent_surface(Size::new(1, 1), 24).unwrap();
    let b = conn.create_persistent_surface(Size::new(1, 1), 24).unwrap();
    conn.set_root_property(ESETROOT_PMAP_ID, a).unwrap();
    conn.set_root_property(XROOTPMAP_ID, b).unwrap();

    commit_root_surface(&mut conn, Commit::Clear { retain: Some(b) }).unwrap();
    assert_eq!(server.destroyed_count(a), 1);
    assert!(server.is_alive(b));
    assert_eq!(server.kill_requests(), 1);
    assert_eq!(server.property(XROOTPMAP_ID), None);
}

#[test]
fn failed_publish_releases_the_grab() {
    let server = server();
    let mut conn = server.connect();
    let id = conn.create_persistent_surface(Size::new(4, 4), 24).unwrap();
    server.set_fail_property_writes(true);

    let err = commit_root_surface(&mut conn, Commit::Publish(id)).unwrap_err();
    assert!(err.is_recoverable());
    assert!(!server.is_grabbed());
    assert_eq!(server.property(ESETROOT_PMAP_ID), None);
}

#[test]
fn failed_publish_keeps_the_previous_surface_published() {
    let server = server();
    let mut conn = server.connect();
    let old = conn.create_persistent_surface(Size::new(4, 4), 24).unwrap();
    let new = conn.create_persistent_surface(Size::new(4, 4), 24).unwrap();
    commit_root_surface(&mut conn, Commit::Publish(old)).unwrap();

    server.set_fail_property_writes(true);
    assert!(commit_root_surface(&mut conn, Commit::Publish(new)).is_err());
    assert!(!server.is_grabbed());
    assert_eq!(server.property(ESETROOT_PMAP_ID), Some(old));
    assert_eq!(server.property(XROOTPMAP_ID), Some(old));
    assert!(server.is_alive(old));
    assert_eq!(server.destroyed_count(old), 0);
    assert_eq!(server.background(), RootBackground::Surface(old));

    server.set_fail_property_writes(false);
    commit_root_surface(&mut conn, Commit::Publish(new)).unwrap();
    assert_eq!(server.destroyed_count(old), 1);
    assert_eq!(server.live_surfaces(), vec![new]);
}
