//! Операции оператора над записью: программирование, проверка, резервная копия.
//!
//! `program` никогда не оставляет на устройстве частично записанную запись:
//! перед записью снимается снимок прежнего содержимого, после записи образ
//! перечитывается и при расхождении снимок возвращается на место.
use crate::crypto::cbc::{widen_iv, CbcContext};
use crate::crypto::entropy::EntropySource;
use crate::error::ProvisionError;
use crate::record::codec::{self, open_field, seal_field, DecodedCredentials};
use crate::record::credentials::{FieldText, PlainCredentials, DEVICE_NAME_MAX};
use crate::record::layout::{
    self, additive_checksum, RecordImage, CHECKSUM, RECORD_MAGIC, RECORD_SIZE,
};
use crate::store::storage::{check_bounds, ByteStorage};
use crate::store::StoreConfig;

const SCRATCH_PATTERN: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
];
const CHECKSUM_SAMPLE: [u8; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
const CHECKSUM_SAMPLE_SUM: u16 = 55;
const CIPHER_SAMPLE: &[u8] = b"Hello, FRAM!";
const CIPHER_SAMPLE_IV: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
const CIPHER_SAMPLE_WINDOW: usize = 64;
const MAX_CHUNK: usize = 64;

/// Сводка заголовка записи без расшифровки.
#[derive(Debug, Clone)]
pub struct RecordSummary {
    /// Magic совпал, запись считается присутствующей.
    pub present: bool,
    pub magic: u32,
    pub version: u16,
    pub device_name: FieldText<DEVICE_NAME_MAX>,
    pub iv: [u8; 8],
    pub stored_checksum: u16,
    pub computed_checksum: u16,
}

impl RecordSummary {
    pub fn from_image(image: &RecordImage) -> Self {
        Self {
            present: image.has_magic(),
            magic: image.magic(),
            version: image.version(),
            device_name: FieldText::from_bytes(image.device_name()).unwrap_or_default(),
            iv: image.iv(),
            stored_checksum: image.stored_checksum(),
            computed_checksum: image.compute_checksum(),
        }
    }

    pub fn checksum_ok(&self) -> bool {
        self.stored_checksum == self.computed_checksum
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelfTestReport {
    pub layout: bool,
    pub read_write: bool,
    pub checksum: bool,
    pub cipher: bool,
}

impl SelfTestReport {
    pub fn passed(&self) -> bool {
        self.layout && self.read_write && self.checksum && self.cipher
    }
}

/// Запись учётных данных поверх произвольного [`ByteStorage`].
pub struct CredentialStore<S> {
    storage: S,
    config: StoreConfig,
}

impl<S: ByteStorage> CredentialStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, StoreConfig::default())
    }

    pub fn with_config(storage: S, config: StoreConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    pub fn detect(&mut self) -> bool {
        self.storage.detect()
    }

    fn ensure_present(&mut self) -> Result<(), ProvisionError> {
        if self.storage.detect() {
            Ok(())
        } else {
            Err(ProvisionError::StorageUnavailable)
        }
    }

    pub fn read_record(&mut self) -> Result<RecordImage, ProvisionError> {
        self.ensure_present()?;
        let mut image = RecordImage::zeroed();
        self.storage
            .read(self.config.credentials_addr, image.as_bytes_mut())?;
        Ok(image)
    }

    /// Проверяет, шифрует и записывает учётные данные, затем выполняет `verify`.
    ///
    /// Ошибка валидации возвращается до любого обращения к памяти. При
    /// расхождении перечитанного образа прежнее содержимое восстанавливается
    /// и возвращается `ReadbackMismatch`.
    pub fn program<E>(
        &mut self,
        plain: &PlainCredentials,
        entropy: &mut E,
    ) -> Result<RecordSummary, ProvisionError>
    where
        E: EntropySource + ?Sized,
    {
        plain.validate()?;
        let snapshot = self.read_record()?;

        let mut image = RecordImage::zeroed();
        codec::encode(plain, entropy, &mut image)?;

        let address = self.config.credentials_addr;
        let written = self
            .storage
            .write(address, image.as_bytes())
            .and_then(|_| self.read_record());
        let matches = matches!(&written, Ok(readback) if *readback == image);
        if !matches {
            fram_log_warn!("record readback mismatch at 0x{:04X}, restoring snapshot", address);
            if self.storage.write(address, snapshot.as_bytes()).is_err() {
                fram_log_warn!("snapshot restore failed at 0x{:04X}", address);
            }
            return Err(match written {
                Err(ProvisionError::StorageUnavailable) => ProvisionError::StorageUnavailable,
                _ => ProvisionError::ReadbackMismatch,
            });
        }

        fram_log_info!(
            "record programmed at 0x{:04X}, checksum 0x{:04X}",
            address,
            image.stored_checksum()
        );
        self.verify()
    }

    /// Проверяет magic, version и checksum записи на устройстве.
    pub fn verify(&mut self) -> Result<RecordSummary, ProvisionError> {
        let image = self.read_record()?;
        image.validate()?;
        Ok(RecordSummary::from_image(&image))
    }

    pub fn decode(&mut self) -> Result<DecodedCredentials, ProvisionError> {
        let image = self.read_record()?;
        codec::decode(&image)
    }

    pub fn info(&mut self) -> Result<RecordSummary, ProvisionError> {
        let image = self.read_record()?;
        Ok(RecordSummary::from_image(&image))
    }

    /// Читает всё устройство блоками `backup_chunk` и отдаёт их в `sink`.
    /// Возвращает число прочитанных байт.
    pub fn backup<F>(&mut self, mut sink: F) -> Result<usize, ProvisionError>
    where
        F: FnMut(usize, &[u8]),
    {
        self.ensure_present()?;
        let capacity = self.storage.capacity();
        let chunk_len = self.config.backup_chunk.clamp(1, MAX_CHUNK);
        let mut chunk = [0u8; MAX_CHUNK];

        let mut address = 0usize;
        while address < capacity {
            let len = chunk_len.min(capacity - address);
            self.storage.read(address, &mut chunk[..len])?;
            sink(address, &chunk[..len]);
            address += len;
        }
        Ok(capacity)
    }

    /// Пишет образ блоками `restore_chunk`, проверяя каждый блок чтением.
    pub fn restore(&mut self, address: usize, image: &[u8]) -> Result<(), ProvisionError> {
        self.ensure_present()?;
        check_bounds(self.storage.capacity(), address, image.len())?;

        let chunk_len = self.config.restore_chunk.clamp(1, MAX_CHUNK);
        let mut readback = [0u8; MAX_CHUNK];
        for (index, chunk) in image.chunks(chunk_len).enumerate() {
            let at = address + index * chunk_len;
            self.storage.write(at, chunk)?;
            self.storage.read(at, &mut readback[..chunk.len()])?;
            if readback[..chunk.len()] != *chunk {
                fram_log_warn!("restore verify failed at 0x{:04X}", at);
                return Err(ProvisionError::ReadbackMismatch);
            }
        }
        fram_log_debug!("restored {} bytes at 0x{:04X}", image.len(), address);
        Ok(())
    }

    /// Проверки раскладки, обмена с памятью, checksum и шифра.
    ///
    /// Содержимое scratch-области восстанавливается после проверки.
    pub fn self_test(&mut self) -> Result<SelfTestReport, ProvisionError> {
        self.ensure_present()?;
        Ok(SelfTestReport {
            layout: layout_consistent(),
            read_write: self.scratch_round_trip(),
            checksum: additive_checksum(&CHECKSUM_SAMPLE) == CHECKSUM_SAMPLE_SUM,
            cipher: cipher_round_trip(),
        })
    }

    fn scratch_round_trip(&mut self) -> bool {
        let address = self.config.scratch_addr;
        let mut saved = [0u8; SCRATCH_PATTERN.len()];
        if self.storage.read(address, &mut saved).is_err() {
            return false;
        }

        let mut readback = [0u8; SCRATCH_PATTERN.len()];
        let matched = self.storage.write(address, &SCRATCH_PATTERN).is_ok()
            && self.storage.read(address, &mut readback).is_ok()
            && readback == SCRATCH_PATTERN;

        // Прежнее содержимое возвращается при любом исходе проверки.
        let restored = self.storage.write(address, &saved).is_ok();
        if !restored {
            fram_log_warn!("scratch restore failed at 0x{:04X}", address);
        }
        matched && restored
    }
}

fn layout_consistent() -> bool {
    layout::schema_is_contiguous()
        && RECORD_SIZE == 1024
        && CHECKSUM.offset == 496
        && RECORD_MAGIC.to_le_bytes() == *b"DERC"
}

fn cipher_round_trip() -> bool {
    let ctx = CbcContext::new(&[0u8; 32], widen_iv(&CIPHER_SAMPLE_IV));
    let mut window = [0u8; CIPHER_SAMPLE_WINDOW];
    let mut scratch = [0u8; CIPHER_SAMPLE_WINDOW];
    if seal_field(&ctx, &mut window, CIPHER_SAMPLE).is_err() {
        return false;
    }
    if window[..CIPHER_SAMPLE.len()] == *CIPHER_SAMPLE {
        return false;
    }
    match open_field(&ctx, &window, &mut scratch) {
        Ok(len) => &scratch[..len] == CIPHER_SAMPLE,
        Err(_) => false,
    }
}
