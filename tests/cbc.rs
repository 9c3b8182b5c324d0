use fram_provision::crypto::cbc::{widen_iv, CbcContext};
use fram_provision::error::{ErrorKind, ProvisionError};

fn nist_context() -> CbcContext {
    let mut key = [0u8; 32];
    hex::decode_to_slice(
        "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4",
        &mut key,
    )
    .unwrap();
    CbcContext::new(&key, core::array::from_fn(|i| i as u8))
}

#[test]
fn sp800_38a_cbc_aes256_vector() {
    let ctx = nist_context();
    let mut data = [0u8; 32];
    hex::decode_to_slice(
        "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51",
        &mut data,
    )
    .unwrap();
    ctx.encrypt_in_place(&mut data).unwrap();
    assert_eq!(
        hex::encode(data),
        "f58c4c04d6e5f1ba779eabfb5f7bfbd69cfc4e967edb808d679f777bc6702c7d"
    );

    ctx.decrypt_in_place(&mut data).unwrap();
    assert_eq!(
        hex::encode(data),
        "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51"
    );
}

#[test]
fn unaligned_input_is_rejected() {
    let ctx = CbcContext::new(&[0u8; 32], [0u8; 16]);
    let mut data = [0u8; 17];
    let err = ctx.encrypt_in_place(&mut data).unwrap_err();
    assert_eq!(err, ProvisionError::UnalignedInput);
    assert_eq!(err.kind(), ErrorKind::Crypto);
    assert_eq!(ctx.decrypt_in_place(&mut data[..15]), Err(ProvisionError::UnalignedInput));
}

#[test]
fn chaining_hides_repeated_blocks() {
    let ctx = CbcContext::new(&[7u8; 32], widen_iv(&[1, 2, 3, 4, 5, 6, 7, 8]));
    let mut data = [0x41u8; 48];
    ctx.encrypt_in_place(&mut data).unwrap();
    assert_ne!(data[..16], data[16..32]);
    assert_ne!(data[16..32], data[32..48]);
}

#[test]
fn separate_buffers_match_in_place() {
    let ctx = CbcContext::new(&[3u8; 32], [9u8; 16]);
    let input = [0x5Au8; 64];
    let mut output = [0u8; 64];
    ctx.encrypt(&input, &mut output).unwrap();

    let mut in_place = input;
    ctx.encrypt_in_place(&mut in_place).unwrap();
    assert_eq!(output, in_place);

    let mut restored = [0u8; 64];
    ctx.decrypt(&output, &mut restored).unwrap();
    assert_eq!(restored, input);
}

#[test]
fn stored_iv_is_repeated_to_block_width() {
    let iv = widen_iv(&[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(iv, [1, 2, 3, 4, 5, 6, 7, 8, 1, 2, 3, 4, 5, 6, 7, 8]);
}
