use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::aes::KEY_SIZE;
use crate::crypto::sha256::Sha256;

/// Fixed salt shared with the device firmware that consumes the record.
pub const KEY_SALT: &[u8] = b"ESP32_WATER_SYSTEM_2024_SECURE_SALT_V1";
/// Fixed seed shared with the device firmware that consumes the record.
pub const KEY_SEED: &[u8] = b"WATER_DOLEWKA_FIXED_SEED_12345";

/// Symmetric record key. Reconstructible from the cleartext device name, so it
/// obfuscates rather than protects.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RecordKey([u8; KEY_SIZE]);

impl RecordKey {
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecordKey(..)")
    }
}

/// `SHA-256(device_name || KEY_SALT || KEY_SEED)`.
pub fn derive_record_key(device_name: &[u8]) -> RecordKey {
    let mut hasher = Sha256::new();
    hasher.update(device_name);
    hasher.update(KEY_SALT);
    hasher.update(KEY_SEED);
    RecordKey(hasher.finalize())
}
