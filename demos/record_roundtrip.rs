//! Сборка записи с фиксированным IV, разбор обратно и дамп заголовка.
use fram_provision::console::dump::write_hex_dump;
use fram_provision::record::layout::{IV, RECORD_SCHEMA};
use fram_provision::record::{decode, encode_with_iv, PlainCredentials, RecordImage};

fn main() {
    let plain = PlainCredentials::new(
        "DOLEWKA_001",
        "MyNetwork",
        "MyPassword1",
        "admin123",
        "sha256:abc123",
    )
    .expect("credentials rejected");

    let mut image = RecordImage::zeroed();
    encode_with_iv(&plain, &[1, 2, 3, 4, 5, 6, 7, 8], &mut image).expect("encode failed");
    image.validate().expect("fresh record must validate");

    for field in RECORD_SCHEMA {
        println!("{:>16} @ {:4} ({} bytes)", field.name, field.offset, field.size);
    }
    println!("checksum: 0x{:04X}", image.stored_checksum());

    let mut dump = String::new();
    write_hex_dump(&mut dump, 0, &image.as_bytes()[..IV.offset + IV.size]).expect("dump");
    print!("{}", dump.replace("\r\n", "\n"));

    let decoded = decode(&image).expect("decode failed");
    println!("ssid: {:?}", decoded.wifi_ssid.as_str());
    println!("admin hash: {:?}", decoded.admin_hash.as_str());
    println!("token: {:?}", decoded.vps_token.as_str());
    assert!(decoded.status.all_ok());
}
