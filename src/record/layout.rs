//! Бинарная раскладка записи учётных данных (1024 байта, little-endian).
//!
//! | offset | size | поле            |
//! |--------|------|-----------------|
//! | 0      | 4    | magic           |
//! | 4      | 2    | version         |
//! | 6      | 2    | reserved        |
//! | 8      | 32   | device_name     |
//! | 40     | 8    | iv              |
//! | 48     | 64   | enc_ssid        |
//! | 112    | 128  | enc_password    |
//! | 240    | 96   | enc_admin_hash  |
//! | 336    | 160  | enc_token       |
//! | 496    | 2    | checksum        |
//! | 498    | 14   | reserved        |
//! | 512    | 512  | expansion       |
use core::fmt;
use core::ops::Range;

use crate::error::ProvisionError;

pub const RECORD_SIZE: usize = 1024;
/// `"CRED"` как число; в памяти little-endian это байты `"DERC"`.
pub const RECORD_MAGIC: u32 = 0x4352_4544;
pub const RECORD_VERSION: u16 = 0x0001;
/// Максимальная длина имени устройства без завершающего нуля.
pub const DEVICE_NAME_MAX: usize = DEVICE_NAME.size - 1;

/// Именованный диапазон байтов внутри записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
}

impl FieldSpec {
    pub const fn end(&self) -> usize {
        self.offset + self.size
    }

    pub const fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

const fn field(name: &'static str, offset: usize, size: usize) -> FieldSpec {
    FieldSpec { name, offset, size }
}

pub const MAGIC: FieldSpec = field("magic", 0, 4);
pub const VERSION: FieldSpec = field("version", 4, 2);
pub const RESERVED_HEADER: FieldSpec = field("reserved", 6, 2);
pub const DEVICE_NAME: FieldSpec = field("device_name", 8, 32);
pub const IV: FieldSpec = field("iv", 40, 8);
pub const ENC_SSID: FieldSpec = field("enc_ssid", 48, 64);
pub const ENC_PASSWORD: FieldSpec = field("enc_password", 112, 128);
pub const ENC_ADMIN_HASH: FieldSpec = field("enc_admin_hash", 240, 96);
pub const ENC_TOKEN: FieldSpec = field("enc_token", 336, 160);
pub const CHECKSUM: FieldSpec = field("checksum", 496, 2);
pub const RESERVED_TAIL: FieldSpec = field("reserved", 498, 14);
pub const EXPANSION: FieldSpec = field("expansion", 512, 512);

/// Все поля записи в порядке возрастания смещения.
pub const RECORD_SCHEMA: [FieldSpec; 12] = [
    MAGIC,
    VERSION,
    RESERVED_HEADER,
    DEVICE_NAME,
    IV,
    ENC_SSID,
    ENC_PASSWORD,
    ENC_ADMIN_HASH,
    ENC_TOKEN,
    CHECKSUM,
    RESERVED_TAIL,
    EXPANSION,
];

/// Контрольная сумма покрывает все байты до самого поля checksum.
pub const CHECKSUM_COVERAGE: Range<usize> = 0..CHECKSUM.offset;

const _: () = assert!(EXPANSION.end() == RECORD_SIZE);
const _: () = assert!(ENC_TOKEN.end() == CHECKSUM.offset);

/// Поля идут встык, без пересечений и дыр, и покрывают ровно `RECORD_SIZE`.
pub fn schema_is_contiguous() -> bool {
    let mut cursor = 0usize;
    for spec in RECORD_SCHEMA.iter() {
        if spec.offset != cursor || spec.size == 0 {
            return false;
        }
        cursor = spec.end();
    }
    cursor == RECORD_SIZE
}

/// 16-битная сумма байтов с переполнением.
pub fn additive_checksum(data: &[u8]) -> u16 {
    data.iter()
        .fold(0u16, |acc, byte| acc.wrapping_add(u16::from(*byte)))
}

/// Образ записи ровно в `RECORD_SIZE` байт.
#[derive(Clone, PartialEq, Eq)]
pub struct RecordImage {
    bytes: [u8; RECORD_SIZE],
}

impl RecordImage {
    pub const fn zeroed() -> Self {
        Self {
            bytes: [0u8; RECORD_SIZE],
        }
    }

    pub const fn from_bytes(bytes: [u8; RECORD_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(data: &[u8]) -> Result<Self, ProvisionError> {
        let bytes: [u8; RECORD_SIZE] = data.try_into().map_err(|_| ProvisionError::OutOfBounds)?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; RECORD_SIZE] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; RECORD_SIZE] {
        &mut self.bytes
    }

    pub fn field(&self, spec: &FieldSpec) -> &[u8] {
        &self.bytes[spec.range()]
    }

    pub fn field_mut(&mut self, spec: &FieldSpec) -> &mut [u8] {
        &mut self.bytes[spec.range()]
    }

    pub fn magic(&self) -> u32 {
        let b = self.field(&MAGIC);
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    pub fn set_magic(&mut self, magic: u32) {
        self.field_mut(&MAGIC).copy_from_slice(&magic.to_le_bytes());
    }

    pub fn version(&self) -> u16 {
        let b = self.field(&VERSION);
        u16::from_le_bytes([b[0], b[1]])
    }

    pub fn set_version(&mut self, version: u16) {
        self.field_mut(&VERSION).copy_from_slice(&version.to_le_bytes());
    }

    /// Имя устройства до первого нулевого байта.
    pub fn device_name(&self) -> &[u8] {
        let raw = self.field(&DEVICE_NAME);
        let end = raw.iter().position(|b| *b == 0).unwrap_or(DEVICE_NAME_MAX);
        &raw[..end.min(DEVICE_NAME_MAX)]
    }

    /// Записывает имя, обрезая до `DEVICE_NAME_MAX` и дополняя нулями.
    pub fn set_device_name(&mut self, name: &[u8]) {
        let len = name.len().min(DEVICE_NAME_MAX);
        let slot = self.field_mut(&DEVICE_NAME);
        slot.fill(0);
        slot[..len].copy_from_slice(&name[..len]);
    }

    pub fn iv(&self) -> [u8; 8] {
        let mut iv = [0u8; 8];
        iv.copy_from_slice(self.field(&IV));
        iv
    }

    pub fn set_iv(&mut self, iv: &[u8; 8]) {
        self.field_mut(&IV).copy_from_slice(iv);
    }

    pub fn stored_checksum(&self) -> u16 {
        let b = self.field(&CHECKSUM);
        u16::from_le_bytes([b[0], b[1]])
    }

    pub fn compute_checksum(&self) -> u16 {
        additive_checksum(&self.bytes[CHECKSUM_COVERAGE])
    }

    /// Пересчитывает и сохраняет checksum; вызывается последним при сборке записи.
    pub fn seal_checksum(&mut self) -> u16 {
        let checksum = self.compute_checksum();
        self.field_mut(&CHECKSUM)
            .copy_from_slice(&checksum.to_le_bytes());
        checksum
    }

    pub fn has_magic(&self) -> bool {
        self.magic() == RECORD_MAGIC
    }

    /// Проверка формата и целостности в порядке magic, version, checksum.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.magic() != RECORD_MAGIC {
            return Err(ProvisionError::BadMagic);
        }
        if self.version() != RECORD_VERSION {
            return Err(ProvisionError::VersionMismatch);
        }
        let stored = self.stored_checksum();
        let computed = self.compute_checksum();
        if stored != computed {
            return Err(ProvisionError::ChecksumMismatch { stored, computed });
        }
        Ok(())
    }

    /// Обнуляет запись целиком.
    pub fn wipe(&mut self) {
        self.bytes.fill(0);
    }
}

impl Default for RecordImage {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for RecordImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordImage")
            .field("magic", &format_args!("0x{:08X}", self.magic()))
            .field("version", &self.version())
            .field("checksum", &format_args!("0x{:04X}", self.stored_checksum()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_no_gaps() {
        assert!(schema_is_contiguous());
        assert_eq!(CHECKSUM_COVERAGE.end, 496);
    }

    #[test]
    fn magic_is_little_endian_cred() {
        let mut image = RecordImage::zeroed();
        image.set_magic(RECORD_MAGIC);
        assert_eq!(image.field(&MAGIC), b"DERC");
    }

    #[test]
    fn device_name_is_truncated_and_terminated() {
        let mut image = RecordImage::zeroed();
        image.set_device_name(&[b'A'; 40]);
        assert_eq!(image.device_name().len(), DEVICE_NAME_MAX);
        assert_eq!(image.field(&DEVICE_NAME)[DEVICE_NAME_MAX], 0);
    }
}
