use fram_provision::crypto::aes::{gf_mul, Aes256, BLOCK_SIZE};

fn sequential_key() -> [u8; 32] {
    core::array::from_fn(|i| i as u8)
}

#[test]
fn fips197_aes256_known_answer() {
    let cipher = Aes256::new(&sequential_key());
    let mut block: [u8; BLOCK_SIZE] = hex_block("00112233445566778899aabbccddeeff");
    cipher.encrypt_block(&mut block);
    assert_eq!(block, hex_block("8ea2b7ca516745bfeafc49904b496089"));

    cipher.decrypt_block(&mut block);
    assert_eq!(block, hex_block("00112233445566778899aabbccddeeff"));
}

#[test]
fn set_key_replaces_schedule() {
    let mut cipher = Aes256::new(&[0xAA; 32]);
    cipher.set_key(&sequential_key());
    let mut block = hex_block("00112233445566778899aabbccddeeff");
    cipher.encrypt_block(&mut block);
    assert_eq!(block, hex_block("8ea2b7ca516745bfeafc49904b496089"));
}

#[test]
fn field_multiplication_matches_fips197_examples() {
    assert_eq!(gf_mul(0x57, 0x83), 0xc1);
    assert_eq!(gf_mul(0x57, 0x13), 0xfe);
    assert_eq!(gf_mul(0x57, 0x02), 0xae);
    assert_eq!(gf_mul(0x01, 0xff), 0xff);
    assert_eq!(gf_mul(0x00, 0x9d), 0x00);
}

#[test]
fn distinct_keys_give_distinct_ciphertexts() {
    let mut a = [0u8; BLOCK_SIZE];
    let mut b = [0u8; BLOCK_SIZE];
    Aes256::new(&[0u8; 32]).encrypt_block(&mut a);
    Aes256::new(&[1u8; 32]).encrypt_block(&mut b);
    assert_ne!(a, b);
}

fn hex_block(text: &str) -> [u8; BLOCK_SIZE] {
    let mut out = [0u8; BLOCK_SIZE];
    hex::decode_to_slice(text, &mut out).unwrap();
    out
}

#[test]
fn decrypt_inverts_encrypt_under_any_key() {
    for key_byte in [0x00u8, 0x07, 0x5A, 0xFF] {
        let cipher = Aes256::new(&[key_byte; 32]);
        let plain = [0x42u8; BLOCK_SIZE];
        let mut block = plain;
        cipher.encrypt_block(&mut block);
        assert_ne!(block, plain);
        cipher.decrypt_block(&mut block);
        assert_eq!(block, plain, "key byte {key_byte:#04x}");
    }
}

#[test]
fn fips197_aes256_decrypts_known_ciphertext() {
    let cipher = Aes256::new(&sequential_key());
    let mut block = hex_block("8ea2b7ca516745bfeafc49904b496089");
    cipher.decrypt_block(&mut block);
    assert_eq!(block, hex_block("00112233445566778899aabbccddeeff"));
}
