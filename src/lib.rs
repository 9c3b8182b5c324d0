#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod logging;

pub mod console;
pub mod crypto;
pub mod error;
pub mod platform;
pub mod record;
pub mod store;

pub use error::{ErrorKind, ProvisionError};
pub use record::{DecodedCredentials, FieldKind, PlainCredentials, RecordImage};
pub use store::{ByteStorage, CredentialStore, StoreConfig};
