use fram_provision::crypto::cbc::{widen_iv, CbcContext};
use fram_provision::crypto::entropy::{MockEntropy, PseudoEntropy};
use fram_provision::crypto::kdf::derive_record_key;
use fram_provision::error::{ErrorKind, ProvisionError};
use fram_provision::record::codec::{decode, encode, encode_with_iv};
use fram_provision::record::credentials::{validate_field, FieldKind, PlainCredentials};
use fram_provision::record::layout::{
    RecordImage, CHECKSUM, DEVICE_NAME, ENC_ADMIN_HASH, ENC_PASSWORD, ENC_SSID, ENC_TOKEN,
    EXPANSION, IV, RECORD_MAGIC, RECORD_SIZE,
};

const IV_BYTES: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
const ADMIN_DIGEST: &str = "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9";

fn reference_credentials() -> PlainCredentials {
    PlainCredentials::new(
        "DOLEWKA_001",
        "MyNetwork",
        "MyPassword1",
        "admin123",
        "sha256:abc123",
    )
    .unwrap()
}

fn encoded(plain: &PlainCredentials) -> RecordImage {
    let mut image = RecordImage::zeroed();
    encode_with_iv(plain, &IV_BYTES, &mut image).unwrap();
    image
}

#[test]
fn reference_round_trip() {
    let image = encoded(&reference_credentials());
    let decoded = decode(&image).unwrap();

    assert!(decoded.status.all_ok());
    assert_eq!(decoded.device_name.as_str(), Some("DOLEWKA_001"));
    assert_eq!(decoded.wifi_ssid.as_str(), Some("MyNetwork"));
    assert_eq!(decoded.wifi_password.as_str(), Some("MyPassword1"));
    assert_eq!(decoded.admin_hash.as_str(), Some(ADMIN_DIGEST));
    assert_eq!(decoded.vps_token.as_str(), Some("sha256:abc123"));
}

#[test]
fn reference_record_is_bit_exact() {
    let image = encoded(&reference_credentials());
    let bytes = image.as_bytes();

    assert_eq!(&bytes[0..4], &RECORD_MAGIC.to_le_bytes());
    assert_eq!(&bytes[4..6], &[0x01, 0x00]);
    assert_eq!(&bytes[DEVICE_NAME.offset..DEVICE_NAME.offset + 12], b"DOLEWKA_001\0");
    assert_eq!(&bytes[IV.offset..IV.offset + 8], &IV_BYTES);
    assert_eq!(
        hex::encode(&bytes[ENC_SSID.offset..ENC_SSID.offset + 16]),
        "962213a41ea78623ef56bea3023c90f4"
    );
    assert_eq!(
        hex::encode(&bytes[ENC_TOKEN.offset..ENC_TOKEN.offset + 16]),
        "50f71dd7c6fbda99d01640c9b352c2ab"
    );
    assert_eq!(image.stored_checksum(), 0xE3F8);
    assert_eq!(&bytes[CHECKSUM.offset..CHECKSUM.offset + 2], &[0xF8, 0xE3]);
    assert!(bytes[CHECKSUM.end()..].iter().all(|b| *b == 0));
    assert_eq!(EXPANSION.end(), RECORD_SIZE);
}

#[test]
fn secrets_do_not_appear_in_clear() {
    let image = encoded(&reference_credentials());
    let bytes = image.as_bytes();
    let secrets: [&[u8]; 4] = [b"MyNetwork", b"MyPassword1", b"admin123", b"sha256:abc123"];
    for secret in secrets {
        assert!(
            !bytes.windows(secret.len()).any(|w| w == secret),
            "plaintext leaked"
        );
    }
}

#[test]
fn fresh_iv_comes_from_entropy() {
    let plain = reference_credentials();
    let mut entropy = MockEntropy::from_slice(&[0xA5, 0x5A]);
    let mut image = RecordImage::zeroed();
    encode(&plain, &mut entropy, &mut image).unwrap();
    assert_eq!(image.iv(), [0xA5, 0x5A, 0xA5, 0x5A, 0xA5, 0x5A, 0xA5, 0x5A]);
    assert!(decode(&image).unwrap().status.all_ok());

    let mut other = RecordImage::zeroed();
    encode(&plain, &mut PseudoEntropy::new([3u8; 32]), &mut other).unwrap();
    assert_ne!(image.field(&ENC_SSID), other.field(&ENC_SSID));
}

#[test]
fn entropy_failure_aborts_encode() {
    let mut image = RecordImage::zeroed();
    let err = encode(
        &reference_credentials(),
        &mut MockEntropy::unavailable(),
        &mut image,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Entropy);
}

#[test]
fn capacity_boundaries_round_trip() {
    let ssid_63 = "S".repeat(63);
    let ssid_48 = "s".repeat(48);
    let password_127 = "P".repeat(127);
    let password_112 = "p".repeat(112);
    let token_159 = "T".repeat(159);
    let token_144 = "t".repeat(144);

    for (ssid, password, token) in [
        (&ssid_63, &password_127, &token_159),
        (&ssid_48, &password_112, &token_144),
    ] {
        let plain = PlainCredentials::new("EDGE_1", ssid, password, "x", token).unwrap();
        let decoded = decode(&encoded(&plain)).unwrap();
        assert!(decoded.status.all_ok());
        assert_eq!(decoded.wifi_ssid.as_str(), Some(ssid.as_str()));
        assert_eq!(decoded.wifi_password.as_str(), Some(password.as_str()));
        assert_eq!(decoded.vps_token.as_str(), Some(token.as_str()));
    }
}

#[test]
fn token_longer_than_window_overflows() {
    let token = "T".repeat(160);
    let plain = PlainCredentials::new("EDGE_2", "net", "password", "admin", &token).unwrap();
    assert!(validate_field(FieldKind::VpsToken, &token));

    let mut image = RecordImage::zeroed();
    let err = encode_with_iv(&plain, &IV_BYTES, &mut image).unwrap_err();
    assert_eq!(err, ProvisionError::FieldOverflow);
    assert_eq!(image, RecordImage::zeroed());
}

#[test]
fn bad_magic_and_version_are_format_errors() {
    let mut image = encoded(&reference_credentials());
    image.set_version(2);
    let err = decode(&image).unwrap_err();
    assert_eq!(err, ProvisionError::VersionMismatch);
    assert_eq!(err.kind(), ErrorKind::Format);

    image.set_magic(0xDEAD_BEEF);
    assert_eq!(decode(&image).unwrap_err(), ProvisionError::BadMagic);
}

#[test]
fn corrupted_token_does_not_block_other_fields() {
    let mut image = encoded(&reference_credentials());
    let key = derive_record_key(b"DOLEWKA_001");
    let ctx = CbcContext::new(key.as_bytes(), widen_iv(&IV_BYTES));
    let mut garbage = [0xAAu8; ENC_TOKEN.size];
    ctx.encrypt_in_place(&mut garbage).unwrap();
    image.field_mut(&ENC_TOKEN).copy_from_slice(&garbage);

    let decoded = decode(&image).unwrap();
    assert!(!decoded.status.vps_token);
    assert!(decoded.vps_token.is_empty());
    assert!(decoded.status.wifi_ssid && decoded.status.wifi_password && decoded.status.admin_hash);
    assert_eq!(decoded.wifi_password.as_str(), Some("MyPassword1"));
    assert_eq!(decoded.status.failed_count(), 1);
}

#[test]
fn field_windows_match_layout() {
    assert_eq!((ENC_SSID.offset, ENC_SSID.size), (48, 64));
    assert_eq!((ENC_PASSWORD.offset, ENC_PASSWORD.size), (112, 128));
    assert_eq!((ENC_ADMIN_HASH.offset, ENC_ADMIN_HASH.size), (240, 96));
    assert_eq!((ENC_TOKEN.offset, ENC_TOKEN.size), (336, 160));
    assert_eq!(CHECKSUM.offset, 496);
}

#[test]
fn field_rules() {
    assert!(validate_field(FieldKind::DeviceName, "DOLEWKA_001"));
    assert!(!validate_field(FieldKind::DeviceName, ""));
    assert!(!validate_field(FieldKind::DeviceName, "bad-name"));
    assert!(!validate_field(FieldKind::DeviceName, &"N".repeat(32)));
    assert!(validate_field(FieldKind::WifiSsid, &"S".repeat(63)));
    assert!(!validate_field(FieldKind::WifiSsid, &"S".repeat(64)));
    assert!(validate_field(FieldKind::WifiPassword, "p"));
    assert!(!validate_field(FieldKind::WifiPassword, &"P".repeat(128)));
    assert!(!validate_field(FieldKind::AdminPassword, ""));
    assert!(validate_field(FieldKind::VpsToken, &"T".repeat(255)));
    assert!(!validate_field(FieldKind::VpsToken, &"T".repeat(256)));
}

#[test]
fn oversized_input_names_its_field() {
    let long_ssid = "S".repeat(64);
    let err = PlainCredentials::new("DEV", &long_ssid, "pw", "admin", "tok").unwrap_err();
    assert_eq!(err, ProvisionError::InvalidField(FieldKind::WifiSsid));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let plain = PlainCredentials::new("bad name", "net", "pw", "admin", "tok").unwrap();
    assert_eq!(
        plain.validate(),
        Err(ProvisionError::InvalidField(FieldKind::DeviceName))
    );
}
