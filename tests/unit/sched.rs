use super::*;

#[test]
fn lowering_priority_is_repeatable() {
    lower_process_priority().unwrap();
    lower_process_priority().unwrap();
}
