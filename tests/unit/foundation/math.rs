use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(255, 0), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(1, 127), 0);
    assert_eq!(mul_div255_u16(1, 128), 1);
}

#[test]
fn over_opaque_source_replaces_destination() {
    let mut dst = [10u8, 20, 30, 255];
    over_premul(&mut dst, &[200, 100, 50, 255]);
    assert_eq!(dst, [200, 100, 50, 255]);
}

#[test]
fn over_transparent_source_keeps_destination() {
    let mut dst = [10u8, 20, 30, 255];
    over_premul(&mut dst, &[0, 0, 0, 0]);
    assert_eq!(dst, [10, 20, 30, 255]);
}
