//! Криптопримитивы записи: AES-256, CBC, паддинг, SHA-256, вывод ключа и энтропия.
pub mod aes;
pub mod cbc;
pub mod entropy;
pub mod kdf;
pub mod padding;
pub mod sha256;

pub use aes::Aes256;
pub use cbc::{widen_iv, CbcContext};
pub use entropy::EntropySource;
pub use kdf::{derive_record_key, RecordKey};
pub use sha256::Sha256;
