//! Запись на устройстве: адреса, доступ к памяти и операции оператора.
pub mod storage;
pub mod workflow;

include!(concat!(env!("OUT_DIR"), "/fram_layout.rs"));

/// Адрес 16-байтовой области, которую затрагивает самопроверка.
pub const DEFAULT_SCRATCH_ADDR: usize = 0x7000;
pub const DEFAULT_BACKUP_CHUNK: usize = 64;
pub const DEFAULT_RESTORE_CHUNK: usize = 32;

/// Размещение записи и параметры обмена с памятью.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub credentials_addr: usize,
    pub scratch_addr: usize,
    pub backup_chunk: usize,
    pub restore_chunk: usize,
}

impl StoreConfig {
    pub const fn new(credentials_addr: usize) -> Self {
        Self {
            credentials_addr,
            scratch_addr: DEFAULT_SCRATCH_ADDR,
            backup_chunk: DEFAULT_BACKUP_CHUNK,
            restore_chunk: DEFAULT_RESTORE_CHUNK,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(FRAM_CREDENTIALS_ADDR_CFG)
    }
}

pub use storage::{ByteStorage, MemoryFram};
pub use workflow::{CredentialStore, RecordSummary, SelfTestReport};

/// FRAM с размером по умолчанию из конфигурации сборки.
pub type DefaultMemoryFram = MemoryFram<FRAM_TOTAL_SIZE_CFG>;
