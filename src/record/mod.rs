//! Запись учётных данных: раскладка, открытые поля и кодек.
pub mod codec;
pub mod credentials;
pub mod layout;

pub use codec::{decode, encode, encode_with_iv, DecodedCredentials, FieldStatus};
pub use credentials::{validate_field, FieldKind, FieldText, PlainCredentials};
pub use layout::{RecordImage, RECORD_SIZE};
