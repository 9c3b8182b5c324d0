use fram_provision::crypto::padding::{
    add_padding, padded_len, probe_unpadded_len, remove_padding, DEFAULT_BLOCK_SIZE,
};
use fram_provision::error::ProvisionError;

#[test]
fn aligned_data_gets_a_full_block() {
    let mut buf = [0u8; 64];
    buf[..16].copy_from_slice(&[b'x'; 16]);
    let total = add_padding(&mut buf, 16, DEFAULT_BLOCK_SIZE).unwrap();
    assert_eq!(total, 32);
    assert!(buf[16..32].iter().all(|b| *b == 16));
    assert_eq!(remove_padding(&buf, total, DEFAULT_BLOCK_SIZE), Some(16));
}

#[test]
fn short_data_gets_partial_padding() {
    let mut buf = [0u8; 16];
    buf[..9].copy_from_slice(b"MyNetwork");
    assert_eq!(add_padding(&mut buf, 9, 16), Ok(16));
    assert_eq!(&buf[9..], &[7u8; 7]);
    assert_eq!(padded_len(9, 16), 16);
}

#[test]
fn overflow_when_padding_does_not_fit() {
    let mut buf = [0u8; 16];
    assert_eq!(add_padding(&mut buf, 16, 16), Err(ProvisionError::FieldOverflow));
}

#[test]
fn invalid_padding_is_rejected() {
    assert_eq!(remove_padding(&[1, 2, 3, 0], 4, 16), None);
    assert_eq!(remove_padding(&[1, 2, 3, 17], 4, 16), None);
    assert_eq!(remove_padding(&[1, 3, 2, 3], 4, 16), None);
    assert_eq!(remove_padding(&[1, 2], 3, 16), None);
    assert_eq!(remove_padding(&[], 0, 16), None);
    assert_eq!(remove_padding(&[9, 2, 2], 3, 16), Some(1));
}

#[test]
fn probe_skips_zero_tail() {
    let mut window = [0u8; 64];
    window[..9].copy_from_slice(b"MyNetwork");
    add_padding(&mut window, 9, 16).unwrap();
    assert_eq!(probe_unpadded_len(&window, 16), Some(9));
}

#[test]
fn probe_finds_later_boundary() {
    let mut window = [0u8; 96];
    window[..64].copy_from_slice(&[b'f'; 64]);
    add_padding(&mut window, 64, 16).unwrap();
    assert_eq!(probe_unpadded_len(&window, 16), Some(64));
}

#[test]
fn probe_takes_first_valid_boundary() {
    let mut window = [0u8; 48];
    window[..15].copy_from_slice(&[b'A'; 15]);
    window[15] = 0x01;
    window[16..20].copy_from_slice(b"BBBB");
    add_padding(&mut window, 20, 16).unwrap();
    assert_eq!(probe_unpadded_len(&window, 16), Some(15));
}

#[test]
fn probe_fails_without_padding() {
    assert_eq!(probe_unpadded_len(&[0x41; 64], 16), None);
    assert_eq!(probe_unpadded_len(&[0u8; 64], 16), None);
    assert_eq!(probe_unpadded_len(&[16u8; 16], 16), None);
}
