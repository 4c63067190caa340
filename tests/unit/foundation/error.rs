use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BackdropError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        BackdropError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        BackdropError::display("x")
            .to_string()
            .contains("display error:")
    );
    assert!(
        BackdropError::config("x")
            .to_string()
            .contains("config error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BackdropError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_display_errors_are_recoverable() {
    assert!(BackdropError::display("grab failed").is_recoverable());
    assert!(!BackdropError::validation("bad").is_recoverable());
    assert!(!BackdropError::render("bad").is_recoverable());
}
