use super::*;

#[test]
fn defaults_are_a_valid_vertical_gradient() {
    let p = Preferences::default();
    p.validate().unwrap();
    assert!(p.enabled);
    assert!(p.gradient_enabled);
    assert_eq!(p.orientation, Orientation::Vertical);
    assert_eq!(p.color1.to_hex(), "#39374b");
    assert_eq!(p.color2.to_hex(), "#42528f");
    assert!(!p.wallpaper_enabled);
}

#[test]
fn orientation_setter_keeps_gradient_flag_in_sync() {
    let mut p = Preferences::default();
    p.set_orientation(Orientation::Solid);
    assert!(!p.gradient_enabled);
    p.validate().unwrap();

    p.set_gradient_enabled(true);
    assert_eq!(p.orientation, Orientation::Vertical);
    p.set_orientation(Orientation::Horizontal);
    p.set_gradient_enabled(true);
    assert_eq!(p.orientation, Orientation::Horizontal);
    p.validate().unwrap();
}

#[test]
fn validate_rejects_contradicting_snapshots() {
    let p = Preferences {
        gradient_enabled: false,
        orientation: Orientation::Vertical,
        ..Preferences::default()
    };
    assert!(p.validate().is_err());

    let p = Preferences {
        opacity: 101,
        ..Preferences::default()
    };
    assert!(p.validate().is_err());
}

#[test]
fn alpha_follows_perceptual_curve() {
    let mut p = Preferences::default();
    p.opacity = 0;
    assert_eq!(p.alpha(), 0);
    p.opacity = 50;
    assert_eq!(p.alpha(), 64);
    p.opacity = 100;
    assert_eq!(p.alpha(), 255);
    p.opacity = 33;
    // (2.56 * 33)^2 / 256 = 27.8784
    assert_eq!(p.alpha(), 28);
}

#[test]
fn opacity_setter_disables_adjustment_at_full_opacity() {
    let mut p = Preferences::default();
    p.set_opacity(40);
    assert!(p.adjust_opacity);
    assert_eq!(p.opacity, 40);
    p.set_opacity(150);
    assert!(!p.adjust_opacity);
    assert_eq!(p.opacity, 100);
}

#[test]
fn wallpaper_setter_treats_none_markers_as_disabled() {
    let mut p = Preferences::default();
    p.set_wallpaper(Some("/usr/share/backgrounds/a.png".into()));
    assert!(p.wallpaper_enabled);
    p.set_wallpaper(Some("(none)".into()));
    assert!(!p.wallpaper_enabled);
    assert!(p.wallpaper_filename.is_none());
    p.set_wallpaper(Some("".into()));
    assert!(!p.wallpaper_enabled);
}

#[test]
fn enum_strings_round_trip_and_reject_legacy_types() {
    for o in [
        Orientation::Solid,
        Orientation::Horizontal,
        Orientation::Vertical,
    ] {
        assert_eq!(o.as_str().parse::<Orientation>().unwrap(), o);
    }
    for pl in [
        Placement::Tiled,
        Placement::Centered,
        Placement::ScaledAspect,
        Placement::Stretched,
    ] {
        assert_eq!(pl.as_str().parse::<Placement>().unwrap(), pl);
    }
    assert!("embossed".parse::<Placement>().is_err());
    assert!("none".parse::<Placement>().is_err());
    assert!("diagonal".parse::<Orientation>().is_err());
}

#[test]
fn json_document_uses_legacy_enum_spellings() {
    let json = r##"{
        "orientation": "horizontal-gradient",
        "placement": "scaled",
        "color1": "#000000",
        "color2": "#ffffff",
        "wallpaper_enabled": true,
        "wallpaper_filename": "/tmp/w.png"
    }"##;
    let p = Preferences::from_json_str(json).unwrap();
    assert_eq!(p.orientation, Orientation::Horizontal);
    assert_eq!(p.placement, Placement::ScaledAspect);
    assert_eq!(p.color2, Rgb::WHITE);
    assert!(p.gradient_enabled);

    let back = Preferences::from_json_str(&p.to_json_string().unwrap()).unwrap();
    assert_eq!(back, p);
}

#[test]
fn json_document_with_broken_invariant_is_rejected() {
    let json = r#"{ "orientation": "solid", "gradient_enabled": true }"#;
    assert!(Preferences::from_json_str(json).is_err());
}
