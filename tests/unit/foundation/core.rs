use super::*;

#[test]
fn rgb_parses_all_hex_widths() {
    assert_eq!("#39374b".parse::<Rgb>().unwrap(), Rgb::new(0x39, 0x37, 0x4b));
    assert_eq!("#fff".parse::<Rgb>().unwrap(), Rgb::WHITE);
    assert_eq!(
        "#ffff80800000".parse::<Rgb>().unwrap(),
        Rgb::new(0xff, 0x80, 0x00)
    );
}

#[test]
fn rgb_rejects_malformed_strings() {
    assert!("39374b".parse::<Rgb>().is_err());
    assert!("#12345".parse::<Rgb>().is_err());
    assert!("#zzzzzz".parse::<Rgb>().is_err());
}

#[test]
fn rgb_hex_formatting_is_lowercase_and_padded() {
    assert_eq!(Rgb::new(1, 0xab, 0).to_hex(), "#01ab00");
    assert_eq!(Rgb::new(1, 0xab, 0).to_string(), "#01ab00");
}

#[test]
fn rgb_serializes_as_hex_string() {
    let json = serde_json::to_string(&Rgb::new(0x42, 0x52, 0x8f)).unwrap();
    assert_eq!(json, "\"#42528f\"");
    let back: Rgb = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Rgb::new(0x42, 0x52, 0x8f));
}

#[test]
fn size_emptiness_and_rect_round_trip() {
    assert!(Size::new(0, 10).is_empty());
    assert!(!Size::new(1, 1).is_empty());
    let r = Rect::from_size(Size::new(320, 200));
    assert_eq!(r.size(), Size::new(320, 200));
    assert_eq!((r.x, r.y), (0, 0));
}

#[test]
fn size_parses_width_by_height() {
    assert_eq!("1920x1080".parse::<Size>().unwrap(), Size::new(1920, 1080));
    assert_eq!(" 64 X 48 ".parse::<Size>().unwrap(), Size::new(64, 48));
    assert_eq!(Size::new(157, 111).to_string(), "157x111");
    assert!("1920".parse::<Size>().is_err());
    assert!("axb".parse::<Size>().is_err());
}
