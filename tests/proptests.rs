use proptest::collection::vec;
use proptest::prelude::*;
use fram_provision::crypto::aes::Aes256;
use fram_provision::crypto::cbc::{widen_iv, CbcContext};
use fram_provision::crypto::padding::{add_padding, padded_len, probe_unpadded_len, remove_padding};
use fram_provision::crypto::sha256::Sha256;
use fram_provision::record::layout::CHECKSUM_COVERAGE;
use fram_provision::record::{decode, encode_with_iv, PlainCredentials, RecordImage};
use sha2::Digest;

proptest! {
    #[test]
    fn aes_block_roundtrip(key in any::<[u8; 32]>(), block in any::<[u8; 16]>()) {
        let cipher = Aes256::new(&key);
        let mut buf = block;
        cipher.encrypt_block(&mut buf);
        prop_assert_ne!(buf, block);
        cipher.decrypt_block(&mut buf);
        prop_assert_eq!(buf, block);
    }
}

proptest! {
    #[test]
    fn sha256_streaming_matches_oracle(data in vec(any::<u8>(), 0..600), split in any::<prop::sample::Index>()) {
        let cut = split.index(data.len() + 1);
        let mut hasher = Sha256::new();
        hasher.update(&data[..cut]);
        hasher.update(&data[cut..]);
        let expected: [u8; 32] = sha2::Sha256::digest(&data).into();
        prop_assert_eq!(hasher.finalize(), expected);
        prop_assert_eq!(Sha256::digest(&data), expected);
    }
}

proptest! {
    #[test]
    fn padding_is_reversible(data_len in 0usize..200, block in 1usize..=32) {
        let total = padded_len(data_len, block);
        prop_assert!(total > data_len && total - data_len <= block);
        prop_assert_eq!(total % block, 0);

        let mut buf = vec![0x41u8; total];
        prop_assert_eq!(add_padding(&mut buf, data_len, block), Ok(total));
        prop_assert_eq!(remove_padding(&buf, total, block), Some(data_len));
        prop_assert!(add_padding(&mut buf[..total - 1], data_len, block).is_err());
    }
}

proptest! {
    #[test]
    fn probe_finds_printable_payload(text in "[ -~]{1,100}", trailing_blocks in 0usize..4) {
        let total = padded_len(text.len(), 16);
        let mut buf = vec![0u8; total + trailing_blocks * 16];
        buf[..text.len()].copy_from_slice(text.as_bytes());
        add_padding(&mut buf, text.len(), 16).unwrap();
        prop_assert_eq!(probe_unpadded_len(&buf, 16), Some(text.len()));
    }
}

proptest! {
    #[test]
    fn cbc_roundtrip(key in any::<[u8; 32]>(), iv in any::<[u8; 8]>(), blocks in 0usize..8, seed in any::<u8>()) {
        let ctx = CbcContext::new(&key, widen_iv(&iv));
        let plain: Vec<u8> = (0..blocks * 16).map(|i| seed.wrapping_add(i as u8)).collect();
        let mut buf = plain.clone();
        ctx.encrypt_in_place(&mut buf).unwrap();
        if blocks > 0 {
            prop_assert_ne!(&buf, &plain);
        }
        ctx.decrypt_in_place(&mut buf).unwrap();
        prop_assert_eq!(buf, plain);
    }
}

proptest! {
    #[test]
    fn record_roundtrip(
        name in "[A-Za-z0-9_]{1,31}",
        ssid in "[ -~]{1,63}",
        password in "[ -~]{1,127}",
        admin in "[ -~]{1,127}",
        token in "[ -~]{1,159}",
        iv in any::<[u8; 8]>(),
    ) {
        let plain = PlainCredentials::new(&name, &ssid, &password, &admin, &token).unwrap();
        let mut image = RecordImage::zeroed();
        encode_with_iv(&plain, &iv, &mut image).unwrap();
        prop_assert!(image.validate().is_ok());

        let decoded = decode(&image).unwrap();
        prop_assert!(decoded.status.all_ok());
        prop_assert_eq!(decoded.device_name.as_str(), Some(name.as_str()));
        prop_assert_eq!(decoded.wifi_ssid.as_str(), Some(ssid.as_str()));
        prop_assert_eq!(decoded.wifi_password.as_str(), Some(password.as_str()));
        prop_assert_eq!(decoded.vps_token.as_str(), Some(token.as_str()));

        let admin_hex: String = sha2::Sha256::digest(admin.as_bytes())
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect();
        prop_assert_eq!(decoded.admin_hash.as_str(), Some(admin_hex.as_str()));
    }
}

proptest! {
    #[test]
    fn single_byte_change_is_detected(offset in CHECKSUM_COVERAGE, delta in 1u8..=255) {
        let plain = PlainCredentials::new("DOLEWKA_001", "MyNetwork", "MyPassword1", "admin123", "sha256:abc123").unwrap();
        let mut image = RecordImage::zeroed();
        encode_with_iv(&plain, &[1, 2, 3, 4, 5, 6, 7, 8], &mut image).unwrap();

        let bytes = image.as_bytes_mut();
        bytes[offset] = bytes[offset].wrapping_add(delta);
        prop_assert!(image.validate().is_err());
    }
}
