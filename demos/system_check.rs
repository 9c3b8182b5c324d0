//! Полный цикл на эмулированной FRAM: self-test → program → verify → backup → restore.
use fram_provision::crypto::entropy::{FallbackEntropy, PseudoEntropy, TimerNoiseEntropy};
use fram_provision::platform::hal::{ScriptedAnalog, SoftwareTimer};
use fram_provision::store::{CredentialStore, MemoryFram};
use fram_provision::PlainCredentials;

type Fram = MemoryFram<{ 32 * 1024 }>;

fn main() {
    println!("⏳ self-test…");
    let mut store = CredentialStore::new(Fram::new());
    assert!(store.detect(), "FRAM not detected");
    let report = store.self_test().expect("self-test aborted");
    assert!(report.passed(), "self-test failed: {:?}", report);
    println!("✅ self-test: {:?}", report);

    println!("⏳ program + verify…");
    let plain = PlainCredentials::new(
        "DOLEWKA_042",
        "FieldNet",
        "correct horse",
        "s3cret-admin",
        "sha256:0f1e2d3c",
    )
    .expect("credentials rejected");
    let noise = TimerNoiseEntropy::new(
        SoftwareTimer::starting_at(0x5eed),
        ScriptedAnalog::new(&[0x7A1, 0x7A4, 0x79E]),
    );
    let mut entropy = FallbackEntropy::new(noise, PseudoEntropy::new([0x42; 32]));
    let summary = store.program(&plain, &mut entropy).expect("program failed");
    println!(
        "✅ record for {:?}, iv {:02x?}, checksum 0x{:04X}",
        summary.device_name.as_str(),
        summary.iv,
        summary.stored_checksum
    );

    println!("⏳ backup → restore на чистое устройство…");
    let mut image = Vec::new();
    let size = store
        .backup(|_, chunk| image.extend_from_slice(chunk))
        .expect("backup failed");
    let mut replica = CredentialStore::new(Fram::filled(0xFF));
    for (index, chunk) in image.chunks(64).enumerate() {
        replica.restore(index * 64, chunk).expect("restore failed");
    }
    let decoded = replica.decode().expect("decode on replica failed");
    assert!(decoded.status.all_ok());
    println!(
        "✅ {} bytes restored, ssid {:?}",
        size,
        decoded.wifi_ssid.as_str()
    );
}
